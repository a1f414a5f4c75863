//! Rating domain services
//!
//! [`RatingService`] joins the registry to the pure engine: it resolves the
//! table version in effect on the cover start date and prices the request.

use serde::Serialize;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::breakdown::PremiumBreakdown;
use crate::coverage::{ProductCode, UnderwriterId};
use crate::engine::compute_premium;
use crate::error::{ConfigurationError, RatingError};
use crate::registry::{RateTableRegistry, UnderwriterSummary};
use crate::request::RatingRequest;

/// The outcome of rating one candidate underwriter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnderwriterQuote {
    pub underwriter_id: UnderwriterId,
    #[serde(serialize_with = "serialize_result")]
    pub result: Result<PremiumBreakdown, RatingError>,
}

fn serialize_result<S>(result: &Result<PremiumBreakdown, RatingError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;

    let mut map = serializer.serialize_map(Some(1))?;
    match result {
        Ok(breakdown) => map.serialize_entry("breakdown", breakdown)?,
        Err(error) => map.serialize_entry("error", &error.to_string())?,
    }
    map.end()
}

/// Service for quoting premiums against the registry
///
/// Cloning is cheap: the registry is shared, never copied.
#[derive(Debug, Clone)]
pub struct RatingService {
    registry: Arc<RateTableRegistry>,
}

impl RatingService {
    /// Creates a rating service over a frozen registry
    pub fn new(registry: Arc<RateTableRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &RateTableRegistry {
        &self.registry
    }

    /// Prices `request` with the underwriter it selects
    ///
    /// The table version in effect on the cover start date is used.
    ///
    /// # Errors
    ///
    /// `Configuration` if no table exists for the pair, or `InvalidRequest`
    /// for bad inputs.
    pub fn quote(&self, request: &RatingRequest) -> Result<PremiumBreakdown, RatingError> {
        let coverage = &request.coverage;
        let table = self.registry.get_rate_table_as_of(
            &coverage.underwriter,
            coverage.product,
            coverage.start_date,
        )?;

        let breakdown = compute_premium(request, &table)?;
        tracing::debug!(
            underwriter = %coverage.underwriter,
            product = %coverage.product,
            adjustments = ?breakdown.adjustments(),
            "Applied rating factors"
        );
        tracing::info!(
            underwriter = %coverage.underwriter,
            product = %coverage.product,
            total_premium = %breakdown.total_premium(),
            minimum_applied = breakdown.minimum_premium_applied(),
            "Premium computed"
        );
        Ok(breakdown)
    }

    /// Rates the same request once per candidate underwriter
    ///
    /// Results are returned in the order the candidates were supplied, each
    /// tagged with its underwriter. No ranking is performed. Configuration
    /// errors are logged here so the caller can simply withhold the candidate.
    pub fn compare_underwriters(
        &self,
        request: &RatingRequest,
        candidates: &[UnderwriterId],
    ) -> Vec<UnderwriterQuote> {
        candidates
            .iter()
            .map(|underwriter| {
                let candidate = RatingRequest {
                    coverage: request.coverage.with_underwriter(underwriter.clone()),
                    ..request.clone()
                };
                let result = self.quote(&candidate);
                if let Err(RatingError::Configuration(error)) = &result {
                    tracing::error!(underwriter = %underwriter, error = %error, "Underwriter cannot be rated");
                }
                UnderwriterQuote {
                    underwriter_id: underwriter.clone(),
                    result,
                }
            })
            .collect()
    }

    /// Underwriters that can be offered for `product` on `date`
    pub fn available_underwriters(&self, product: ProductCode, date: NaiveDate) -> Vec<UnderwriterSummary> {
        self.registry.underwriters_for(product, date)
    }

    /// Checks that `underwriter` can be offered for `product` on `date`
    pub fn ensure_offered(
        &self,
        underwriter: &UnderwriterId,
        product: ProductCode,
        date: NaiveDate,
    ) -> Result<(), ConfigurationError> {
        self.registry
            .get_rate_table_as_of(underwriter, product, date)
            .map(|_| ())
    }
}
