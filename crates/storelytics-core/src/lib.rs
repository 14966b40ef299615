//! Shared domain records, input validation, and environment configuration
//! for the storelytics workspace.

mod app_config;
mod apps;
mod config;
mod reviews;
mod validate;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use apps::AppDetails;
pub use config::{load_app_config, load_app_config_from_env};
pub use reviews::{CleanReview, CollectionMeta, RawReview};
pub use validate::{clean_app_id, validate_country_code};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Rejected caller input. Always raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("validation error: {0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
