//! # pulse-common
//!
//! Shared utilities including configuration, error handling, token inspection, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{inspect_token, Claims};
pub use config::{
    ApiConfig, AppConfig, AppSettings, ConfigError, Environment, RealtimeConfig, TimingConfig,
    UploadConfig,
};
pub use error::{AppError, AppResult};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
