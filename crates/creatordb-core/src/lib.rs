use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod platform;
pub mod profile;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use platform::{
    outranks, priority, Platform, PlatformParseError, ALL_PLATFORMS, CATEGORY_PRIORITY,
    COUNTRY_PRIORITY,
};
pub use profile::{PlatformSnapshot, SourceProfile, UnifiedIdentity};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("validation error: {0}")]
    Validation(String),
}
