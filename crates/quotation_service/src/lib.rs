//! Quotation Service
//!
//! Process wiring for the motor quotation core. Loads configuration, builds
//! the frozen rate table registry once and hands out workflows that share it.
//!
//! # Example
//!
//! ```rust,ignore
//! use quotation_service::{config::QuotationConfig, QuotationService};
//!
//! let service = QuotationService::from_config(QuotationConfig::from_env()?)?;
//! let mut workflow = service.start_quotation();
//! workflow.set_field("ownerName", "Wanjiku Kamau")?;
//! ```

pub mod config;
pub mod error;
pub mod telemetry;

use std::sync::Arc;

use core_kernel::{Clock, SystemClock};
use domain_rating::catalog::motor_catalog;
use domain_rating::{RateTableRegistry, RatingService};
use domain_quotation::{QuotationWorkflow, WorkflowContext};

use crate::config::QuotationConfig;
pub use crate::error::ServiceError;

/// Factory for quotation workflows sharing one registry and clock
#[derive(Clone)]
pub struct QuotationService {
    context: WorkflowContext,
    config: QuotationConfig,
}

impl QuotationService {
    /// Builds the service over the embedded motor catalog and the system clock
    pub fn from_config(config: QuotationConfig) -> Result<Self, ServiceError> {
        let clock = Arc::new(SystemClock::new(config.timezone()?));
        Self::with_registry(config, motor_catalog()?, clock)
    }

    /// Builds the service over a given registry and clock
    ///
    /// # Errors
    ///
    /// `InvalidSetting` if the configuration is unusable or a table is priced
    /// in a currency other than the configured one.
    pub fn with_registry(
        config: QuotationConfig,
        registry: RateTableRegistry,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let currency = config.currency()?;
        if let Some(table) = registry.iter().find(|t| t.currency() != currency) {
            return Err(ServiceError::invalid_setting(
                "currency",
                format!(
                    "{} {} table is priced in {}, expected {}",
                    table.underwriter(),
                    table.product(),
                    table.currency().code(),
                    currency.code()
                ),
            ));
        }

        let rating = RatingService::new(Arc::new(registry));
        let context = WorkflowContext::new(rating, clock, config.workflow_settings());
        tracing::info!(
            tables = context.rating.registry().len(),
            timezone = %config.timezone,
            currency = currency.code(),
            "Quotation service ready"
        );

        Ok(Self { context, config })
    }

    /// Starts a new quotation on step 1
    pub fn start_quotation(&self) -> QuotationWorkflow {
        QuotationWorkflow::start(self.context.clone())
    }

    pub fn rating(&self) -> &RatingService {
        &self.context.rating
    }

    pub fn context(&self) -> &WorkflowContext {
        &self.context
    }

    pub fn config(&self) -> &QuotationConfig {
        &self.config
    }
}
