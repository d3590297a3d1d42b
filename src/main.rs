use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, bail, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use atelier::application::{
    SettingsCache, UploadImageUseCase, format_file_size, is_valid_image_file,
};
use atelier::domain::entities::{ImageFile, OptimizeOptions};
use atelier::infrastructure::config::OptimizeArgs;
use atelier::infrastructure::{
    AppConfig, BackendClient, CliArgs, Command, ImageOptimizer, StorageManager, thumbnail_url,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

fn backend_client(config: &AppConfig) -> Result<BackendClient> {
    if !config.backend.is_configured() {
        bail!(
            "backend is not configured; set [backend] url and anon_key in the config file \
             or ATELIER_BACKEND_URL and ATELIER_ANON_KEY"
        );
    }
    Ok(BackendClient::new(&config.backend)?)
}

fn optimize_options(config: &AppConfig, args: &OptimizeArgs) -> OptimizeOptions {
    args.apply(config.optimizer.options(args.preset))
}

async fn read_image(path: &Path) -> Result<ImageFile> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| eyre!("invalid file name: {}", path.display()))?;
    let bytes = tokio::fs::read(path).await?;

    let file = ImageFile::from_name(name, bytes);
    if !is_valid_image_file(&file) {
        bail!("unsupported file type: {}", file.mime_type());
    }
    Ok(file)
}

async fn run_settings(config: &AppConfig) -> Result<()> {
    let cache = SettingsCache::new(Arc::new(backend_client(config)?));
    let settings = cache.get().await?;

    println!("{}", serde_json::to_string_pretty(settings.as_ref())?);
    Ok(())
}

async fn run_optimize(
    config: &AppConfig,
    input: &Path,
    output: Option<PathBuf>,
    args: &OptimizeArgs,
) -> Result<()> {
    let file = read_image(input).await?;
    let options = optimize_options(config, args);

    let optimized = ImageOptimizer::new()
        .optimize_detailed(&file, &options)
        .await?;

    let dir = output
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let target = dir.join(optimized.file.name());
    if target == input {
        bail!("refusing to overwrite source image {}", input.display());
    }

    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(&target, optimized.file.bytes()).await?;

    println!(
        "{} ({} -> {}, {} -> {})",
        target.display(),
        optimized.source,
        optimized.output,
        format_file_size(file.len()),
        format_file_size(optimized.file.len()),
    );
    Ok(())
}

async fn run_upload(config: &AppConfig, input: &Path, args: &OptimizeArgs) -> Result<()> {
    let file = read_image(input).await?;
    let options = optimize_options(config, args);

    let use_case = UploadImageUseCase::new(
        Arc::new(backend_client(config)?),
        ImageOptimizer::new(),
    );
    let uploaded = use_case.execute(&file, &options).await?;

    println!("{}", uploaded.url);
    println!(
        "thumbnail: {}",
        thumbnail_url(&config.backend.url, &uploaded.url)
    );
    println!(
        "{} ({} -> {})",
        uploaded.dimensions,
        format_file_size(uploaded.original_size),
        format_file_size(uploaded.optimized_size),
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = atelier::VERSION, "Starting {}", atelier::NAME);

    match args.command {
        Command::Settings => run_settings(&config).await,
        Command::Optimize {
            input,
            output,
            options,
        } => run_optimize(&config, &input, output, &options).await,
        Command::Upload { input, options } => run_upload(&config, &input, &options).await,
    }
}
