//! REST and object storage client for the hosted backend.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use tracing::{debug, warn};

use super::dto::{ErrorResponse, UploadResponse};
use crate::domain::entities::SiteSettings;
use crate::domain::errors::{FetchError, StorageError};
use crate::domain::ports::{ObjectStoragePort, SettingsStorePort};
use crate::infrastructure::config::BackendConfig;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const UPLOAD_CACHE_CONTROL: &str = "max-age=3600";
const USER_AGENT: &str = concat!("atelier/", env!("CARGO_PKG_VERSION"));

/// Client for the hosted backend's table and storage endpoints.
pub struct BackendClient {
    client: Client,
    base_url: String,
    anon_key: String,
    settings_table: String,
    settings_id: i64,
    bucket: String,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("settings_table", &self.settings_table)
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Creates a client from backend configuration.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(config: &BackendConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::network(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim().trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            settings_table: config.settings_table.clone(),
            settings_id: config.settings_id,
            bucket: config.bucket.clone(),
        })
    }

    /// URL of the settings table endpoint.
    #[must_use]
    pub fn settings_endpoint(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.settings_table)
    }

    /// URL an object is uploaded to.
    #[must_use]
    pub fn upload_endpoint(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, filename
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn error_message(status: StatusCode, response: reqwest::Response) -> String {
        response
            .json::<ErrorResponse>()
            .await
            .ok()
            .and_then(ErrorResponse::describe)
            .unwrap_or_else(|| format!("HTTP {status}"))
    }
}

fn validate_object_name(filename: &str) -> Result<(), StorageError> {
    let invalid = filename.is_empty()
        || filename.starts_with('/')
        || filename.split('/').any(|segment| segment == ".." || segment.is_empty());

    if invalid {
        Err(StorageError::InvalidName {
            name: filename.to_string(),
        })
    } else {
        Ok(())
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        "failed to connect to backend".to_string()
    } else {
        e.to_string()
    }
}

#[async_trait]
impl SettingsStorePort for BackendClient {
    async fn fetch_settings(&self) -> Result<SiteSettings, FetchError> {
        debug!(table = %self.settings_table, id = self.settings_id, "Fetching settings row");

        let response = self
            .authorized(self.client.get(self.settings_endpoint()))
            .query(&[
                ("id", format!("eq.{}", self.settings_id)),
                ("select", "*".to_string()),
            ])
            .header(header::ACCEPT, SINGLE_OBJECT)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to reach configuration store");
                FetchError::network(describe_transport_error(&e))
            })?;

        let status = response.status();

        // A single-object request with zero matching rows is answered with 406.
        if status == StatusCode::NOT_FOUND || status == StatusCode::NOT_ACCEPTABLE {
            return Err(FetchError::NotFound);
        }

        if !status.is_success() {
            let message = Self::error_message(status, response).await;
            return Err(FetchError::rejected(status.as_u16(), message));
        }

        response.json::<SiteSettings>().await.map_err(|e| {
            warn!(error = %e, "Failed to parse settings row");
            FetchError::malformed(e.to_string())
        })
    }
}

#[async_trait]
impl ObjectStoragePort for BackendClient {
    async fn upload(
        &self,
        bytes: Bytes,
        filename: &str,
        mime_type: &str,
    ) -> Result<String, StorageError> {
        validate_object_name(filename)?;

        let size = bytes.len();
        debug!(bucket = %self.bucket, filename, mime_type, size, "Uploading object");

        let response = self
            .authorized(self.client.post(self.upload_endpoint(filename)))
            .header(header::CONTENT_TYPE, mime_type)
            .header(header::CACHE_CONTROL, UPLOAD_CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to reach object storage");
                StorageError::network(describe_transport_error(&e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(status, response).await;
            return Err(StorageError::rejected(status.as_u16(), message));
        }

        if let Ok(UploadResponse { key: Some(key) }) = response.json::<UploadResponse>().await {
            debug!(key = %key, "Object stored");
        }

        Ok(self.public_url(filename))
    }

    fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, filename
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serves one canned response and yields the raw request it received.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });

        (url, handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    fn client_for(url: &str) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: url.to_string(),
            anon_key: "anon".to_string(),
            timeout_secs: 5,
            ..BackendConfig::default()
        })
        .unwrap()
    }

    fn config() -> BackendConfig {
        BackendConfig {
            url: "https://abc.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
            ..BackendConfig::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let client = BackendClient::new(&config());
        assert!(client.is_ok());
    }

    #[test]
    fn test_endpoints() {
        let client = BackendClient::new(&config()).unwrap();

        assert_eq!(
            client.settings_endpoint(),
            "https://abc.supabase.co/rest/v1/settings"
        );
        assert_eq!(
            client.upload_endpoint("1-abc.webp"),
            "https://abc.supabase.co/storage/v1/object/images/1-abc.webp"
        );
        assert_eq!(
            client.public_url("1-abc.webp"),
            "https://abc.supabase.co/storage/v1/object/public/images/1-abc.webp"
        );
    }

    #[test]
    fn test_object_name_validation() {
        assert!(validate_object_name("1700000000000-k3j9a2b.webp").is_ok());
        assert!(validate_object_name("covers/hero.webp").is_ok());
        assert!(validate_object_name("").is_err());
        assert!(validate_object_name("/abs.webp").is_err());
        assert!(validate_object_name("../escape.webp").is_err());
        assert!(validate_object_name("a//b.webp").is_err());
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_name_without_request() {
        let client = BackendClient::new(&config()).unwrap();

        let result = client
            .upload(Bytes::from_static(b"data"), "../x.webp", "image/webp")
            .await;

        assert!(matches!(result, Err(StorageError::InvalidName { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_network_error() {
        let client = BackendClient::new(&BackendConfig {
            url: "http://127.0.0.1:9".to_string(),
            anon_key: "anon".to_string(),
            timeout_secs: 2,
            ..BackendConfig::default()
        })
        .unwrap();

        let result = client.fetch_settings().await;

        assert!(matches!(result, Err(FetchError::Network { .. })));
    }

    #[tokio::test]
    async fn test_fetch_settings_request_and_parse() {
        let (url, request) = serve_once("200 OK", r#"{"id":1,"site_title":"Lumen Studio"}"#).await;

        let settings = client_for(&url).fetch_settings().await.unwrap();
        let request = request.await.unwrap().to_ascii_lowercase();

        assert_eq!(settings.title_or("Studio"), "Lumen Studio");
        assert!(request.starts_with("get /rest/v1/settings?id=eq.1&select=* http/1.1"));
        assert!(request.contains("apikey: anon"));
        assert!(request.contains("authorization: bearer anon"));
        assert!(request.contains("accept: application/vnd.pgrst.object+json"));
    }

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        for status in ["404 Not Found", "406 Not Acceptable"] {
            let (url, request) = serve_once(status, r#"{"message":"0 rows"}"#).await;

            let result = client_for(&url).fetch_settings().await;
            request.await.unwrap();

            assert_eq!(result, Err(FetchError::NotFound), "status {status}");
        }
    }

    #[tokio::test]
    async fn test_error_status_is_rejected_with_body_message() {
        let (url, request) = serve_once(
            "500 Internal Server Error",
            r#"{"message":"permission denied for table settings"}"#,
        )
        .await;

        let result = client_for(&url).fetch_settings().await;
        request.await.unwrap();

        assert_eq!(
            result,
            Err(FetchError::rejected(500, "permission denied for table settings"))
        );
    }

    #[tokio::test]
    async fn test_error_status_without_body_uses_status_text() {
        let (url, request) = serve_once("401 Unauthorized", "").await;

        let result = client_for(&url).fetch_settings().await;
        request.await.unwrap();

        assert_eq!(
            result,
            Err(FetchError::rejected(401, "HTTP 401 Unauthorized"))
        );
    }

    #[tokio::test]
    async fn test_unparsable_row_is_malformed() {
        let (url, request) = serve_once("200 OK", "not json").await;

        let result = client_for(&url).fetch_settings().await;
        request.await.unwrap();

        assert!(matches!(result, Err(FetchError::Malformed { .. })));
    }

    #[tokio::test]
    async fn test_upload_request_and_public_url() {
        let (url, request) = serve_once("200 OK", r#"{"Key":"images/1-abc.webp"}"#).await;
        let client = client_for(&url);

        let public = client
            .upload(Bytes::from_static(b"RIFFpayload"), "1-abc.webp", "image/webp")
            .await
            .unwrap();
        let request = request.await.unwrap();
        let lowered = request.to_ascii_lowercase();

        assert_eq!(public, format!("{url}/storage/v1/object/public/images/1-abc.webp"));
        assert!(lowered.starts_with("post /storage/v1/object/images/1-abc.webp http/1.1"));
        assert!(lowered.contains("content-type: image/webp"));
        assert!(lowered.contains("x-upsert: false"));
        assert!(lowered.contains("cache-control: max-age=3600"));
        assert!(lowered.contains("authorization: bearer anon"));
        assert!(request.ends_with("RIFFpayload"));
    }

    #[tokio::test]
    async fn test_upload_rejection_keeps_status_and_message() {
        let (url, request) = serve_once(
            "400 Bad Request",
            r#"{"statusCode":"409","error":"Duplicate","message":"The resource already exists"}"#,
        )
        .await;

        let result = client_for(&url)
            .upload(Bytes::from_static(b"data"), "1-abc.webp", "image/webp")
            .await;
        request.await.unwrap();

        assert_eq!(
            result,
            Err(StorageError::rejected(400, "The resource already exists"))
        );
    }
}
