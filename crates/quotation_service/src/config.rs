//! Quotation service configuration
//!
//! Read from `QUOTE_*` environment variables, e.g. `QUOTE_TIMEZONE`,
//! `QUOTE_MAX_UPLOAD_BYTES` or `QUOTE_LOG_JSON`. Anything unset falls back to
//! the defaults below.

use serde::Deserialize;

use core_kernel::{Currency, Timezone};
use domain_documents::{DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_RECENT_MONTHS};
use domain_quotation::WorkflowSettings;

use crate::error::ServiceError;

const ENV_PREFIX: &str = "QUOTE";

/// Quotation service configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuotationConfig {
    /// IANA zone deciding what "today" is
    pub timezone: String,
    /// ISO code every rate table must be priced in
    pub currency: String,
    /// Largest accepted document file
    pub max_upload_bytes: u64,
    /// How old a valuation report may be
    pub recent_document_months: u32,
    /// Fill empty declared fields from validated documents
    pub autofill_declared_fields: bool,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for QuotationConfig {
    fn default() -> Self {
        Self {
            timezone: "Africa/Nairobi".to_string(),
            currency: "KES".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            recent_document_months: DEFAULT_RECENT_MONTHS,
            autofill_declared_fields: true,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl QuotationConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Loads configuration from the given variables instead of the process
    /// environment
    ///
    /// # Arguments
    ///
    /// * `vars` - Variable names with the `QUOTE_` prefix, and their values
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ServiceError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(
            config::Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .source(Some(source)),
        )
    }

    fn load(environment: config::Environment) -> Result<Self, ServiceError> {
        let config: QuotationConfig = config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value that the types alone do not
    pub fn validate(&self) -> Result<(), ServiceError> {
        self.timezone()?;
        self.currency()?;
        if self.max_upload_bytes == 0 {
            return Err(ServiceError::invalid_setting("max_upload_bytes", "must be greater than zero"));
        }
        if self.recent_document_months == 0 {
            return Err(ServiceError::invalid_setting(
                "recent_document_months",
                "must be at least one month",
            ));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Timezone, ServiceError> {
        Timezone::parse(&self.timezone).map_err(|e| ServiceError::invalid_setting("timezone", e.to_string()))
    }

    pub fn currency(&self) -> Result<Currency, ServiceError> {
        Currency::from_code(&self.currency).map_err(|e| ServiceError::invalid_setting("currency", e.to_string()))
    }

    /// The settings handed to the workflow core
    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            max_upload_bytes: self.max_upload_bytes,
            recent_document_months: self.recent_document_months,
            autofill_declared_fields: self.autofill_declared_fields,
        }
    }
}
