//! Service wiring errors

use thiserror::Error;

use domain_rating::ConfigurationError;

/// Errors raised while assembling the quotation service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The configuration could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A configuration value is present but unusable
    #[error("Invalid setting {key}: {message}")]
    InvalidSetting {
        key: &'static str,
        message: String,
    },

    /// The rate table catalog failed its integrity checks
    #[error("Rate table catalog error: {0}")]
    Catalog(#[from] ConfigurationError),
}

impl ServiceError {
    pub fn invalid_setting(key: &'static str, message: impl Into<String>) -> Self {
        ServiceError::InvalidSetting {
            key,
            message: message.into(),
        }
    }
}
