//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the values they care about.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_documents::Extraction;
use domain_rating::{
    CoverageSelection, DriverProfile, ProductCode, RatingHistory, RatingRequest, UnderwriterId,
    UsageType, VehicleCategory, VehicleProfile,
};

use crate::fixtures::TemporalFixtures;

/// Builder for rating requests
///
/// Defaults to a 2018 private car worth 1,200,000 on Sanlam total-own-risk
/// cover for twelve months, rated and starting on the fixture date.
pub struct RatingRequestBuilder {
    request: RatingRequest,
}

impl Default for RatingRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RatingRequestBuilder {
    pub fn new() -> Self {
        let today = TemporalFixtures::today();
        Self {
            request: RatingRequest {
                vehicle: VehicleProfile {
                    registration: "KDA 123A".to_string(),
                    make: "Toyota".to_string(),
                    model: "Fielder".to_string(),
                    year_of_manufacture: 2018,
                    engine_capacity_cc: Some(1500),
                    declared_value: dec!(1200000),
                    usage: UsageType::Private,
                    category: VehicleCategory::PrivateCar,
                },
                driver: None,
                coverage: CoverageSelection {
                    product: ProductCode::TotalOwnRisk,
                    underwriter: UnderwriterId::new("sanlam"),
                    duration_months: 12,
                    start_date: today,
                },
                history: None,
                rated_on: today,
            },
        }
    }

    pub fn underwriter(mut self, id: &str) -> Self {
        self.request.coverage.underwriter = UnderwriterId::new(id);
        self
    }

    pub fn product(mut self, product: ProductCode) -> Self {
        self.request.coverage.product = product;
        self
    }

    pub fn declared_value(mut self, value: Decimal) -> Self {
        self.request.vehicle.declared_value = value;
        self
    }

    pub fn year_of_manufacture(mut self, year: i32) -> Self {
        self.request.vehicle.year_of_manufacture = year;
        self
    }

    pub fn engine_capacity(mut self, cc: Option<u32>) -> Self {
        self.request.vehicle.engine_capacity_cc = cc;
        self
    }

    pub fn usage(mut self, usage: UsageType) -> Self {
        self.request.vehicle.usage = usage;
        self
    }

    pub fn category(mut self, category: VehicleCategory) -> Self {
        self.request.vehicle.category = category;
        self
    }

    pub fn driver_age(mut self, age: u32) -> Self {
        self.request.driver = Some(DriverProfile::new(age));
        self
    }

    pub fn history(mut self, prior_claims: bool, modified: bool) -> Self {
        self.request.history = Some(RatingHistory { prior_claims, modified });
        self
    }

    pub fn duration_months(mut self, months: u32) -> Self {
        self.request.coverage.duration_months = months;
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.request.coverage.start_date = date;
        self
    }

    pub fn build(self) -> RatingRequest {
        self.request
    }
}

/// Builder for document extractions
pub struct ExtractionBuilder {
    fields: BTreeMap<String, String>,
    confidence: f64,
}

impl Default for ExtractionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionBuilder {
    /// An empty extraction read with 0.97 confidence
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
            confidence: 0.97,
        }
    }

    pub fn field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn build(self) -> Extraction {
        Extraction::new(self.fields, self.confidence)
    }
}
