//! Property-Based Test Generators
//!
//! Provides proptest strategies for rating requests that the embedded motor
//! catalog accepts.

use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_rating::{ProductCode, RatingRequest, UsageType, VehicleCategory};

use crate::builders::RatingRequestBuilder;

/// Underwriters with a total-own-risk table in the catalog
pub const TOR_UNDERWRITERS: [&str; 5] = ["sanlam", "madison", "kal", "pacis", "ga"];

/// Underwriters with a comprehensive table in the catalog
pub const COMPREHENSIVE_UNDERWRITERS: [&str; 4] = ["kal", "pacis", "madison", "sanlam"];

pub fn usage_strategy() -> impl Strategy<Value = UsageType> {
    prop_oneof![
        Just(UsageType::Private),
        Just(UsageType::Business),
        Just(UsageType::RideHailing),
    ]
}

pub fn category_strategy() -> impl Strategy<Value = VehicleCategory> {
    prop_oneof![
        Just(VehicleCategory::PrivateCar),
        Just(VehicleCategory::Commercial),
        Just(VehicleCategory::Psv),
    ]
}

/// Whole-shilling declared values from 100,000 to 20,000,000
pub fn declared_value_strategy() -> impl Strategy<Value = Decimal> {
    (100_000i64..20_000_000i64).prop_map(Decimal::from)
}

/// Total-own-risk requests within every catalog acceptance limit
pub fn tor_request_strategy() -> impl Strategy<Value = RatingRequest> {
    (
        prop::sample::select(TOR_UNDERWRITERS.to_vec()),
        declared_value_strategy(),
        2011i32..=2025,
        prop::option::of(800u32..4000),
        usage_strategy(),
        category_strategy(),
        18u32..80,
        1u32..=12,
    )
        .prop_map(|(underwriter, value, year, cc, usage, category, age, months)| {
            RatingRequestBuilder::new()
                .underwriter(underwriter)
                .product(ProductCode::TotalOwnRisk)
                .declared_value(value)
                .year_of_manufacture(year)
                .engine_capacity(cc)
                .usage(usage)
                .category(category)
                .driver_age(age)
                .duration_months(months)
                .build()
        })
}

/// Comprehensive requests valued at or above every minimum sum insured
pub fn comprehensive_request_strategy() -> impl Strategy<Value = RatingRequest> {
    (
        prop::sample::select(COMPREHENSIVE_UNDERWRITERS.to_vec()),
        500_000i64..15_000_000,
        2011i32..=2025,
        usage_strategy(),
        any::<(bool, bool)>(),
    )
        .prop_map(|(underwriter, value, year, usage, (claims, modified))| {
            RatingRequestBuilder::new()
                .underwriter(underwriter)
                .product(ProductCode::Comprehensive)
                .declared_value(Decimal::from(value))
                .year_of_manufacture(year)
                .usage(usage)
                .history(claims, modified)
                .build()
        })
}
