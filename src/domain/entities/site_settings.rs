//! Global site configuration record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Primary key of the single settings row.
pub const SETTINGS_SINGLETON_ID: i64 = 1;

/// Global site configuration stored as a single backend row.
///
/// Every field is optional: the row is edited from the admin panel and any
/// column may still be empty. Columns this struct does not name are kept in
/// [`SiteSettings::extra`] so the record round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct SiteSettings {
    /// Row id, always [`SETTINGS_SINGLETON_ID`] for the live record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_address_street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_address_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_address_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_address_zip: Option<String>,
    /// Social network name to profile URL. Networks cleared in the admin
    /// panel are stored as `null`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_links: Option<BTreeMap<String, Option<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Columns not modelled above.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SiteSettings {
    /// Returns the site title, falling back to the given default.
    #[must_use]
    pub fn title_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.site_title.as_deref().unwrap_or(default)
    }

    /// Returns the social link for a network, if configured.
    #[must_use]
    pub fn social_link(&self, network: &str) -> Option<&str> {
        self.social_links
            .as_ref()
            .and_then(|links| links.get(network))
            .and_then(Option::as_deref)
            .filter(|link| !link.trim().is_empty())
    }

    /// Returns the postal address as one line, skipping empty parts.
    #[must_use]
    pub fn contact_address(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.contact_address_street,
            &self.contact_address_city,
            &self.contact_address_state,
            &self.contact_address_zip,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
