//! Application configuration.

pub mod app_config;
pub mod args;
pub mod storage;

pub use app_config::{AppConfig, BackendConfig, LogLevel, OptimizerConfig};
pub use args::{CliArgs, Command, OptimizeArgs};
pub use storage::{ConfigError, StorageManager};
