//! Rate table audit
//!
//! Builds the embedded motor catalog, which runs every bracket integrity
//! check, then prints each underwriter/product table and a sample comparison
//! per product.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin rate-audit
//!
//! # Rate the sample vehicle at a different value
//! cargo run --bin rate-audit -- 2500000
//! ```
//!
//! # Environment Variables
//!
//! * `QUOTE_TIMEZONE` - Jurisdiction timezone (default: Africa/Nairobi)
//! * `QUOTE_CURRENCY` - Expected tariff currency (default: KES)
//! * `QUOTE_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `QUOTE_LOG_JSON` - Emit JSON logs (default: false)

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_rating::{
    BaseRate, CoverageSelection, DriverProfile, ProductCode, RateTable, RatingRequest, UsageType,
    VehicleCategory, VehicleProfile,
};
use quotation_service::config::QuotationConfig;
use quotation_service::telemetry::init_tracing;
use quotation_service::QuotationService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = QuotationConfig::from_env().context("loading QUOTE_* configuration")?;
    init_tracing(&config.log_level, config.log_json);

    let declared_value = match std::env::args().nth(1) {
        Some(arg) => arg
            .replace(',', "")
            .parse::<Decimal>()
            .with_context(|| format!("'{}' is not a vehicle value", arg))?,
        None => dec!(1500000),
    };

    let service = QuotationService::from_config(config).context("building the rate table registry")?;
    let registry = service.rating().registry();

    println!("Rate tables ({})", registry.len());
    println!("{:<10} {:<24} {:<12} {:<28} {:>12}", "id", "product", "effective", "base rate", "minimum");
    for table in registry.iter() {
        println!(
            "{:<10} {:<24} {:<12} {:<28} {:>12}",
            table.underwriter().as_str(),
            table.product().key(),
            table.effective_from(),
            describe_base_rate(table),
            table.minimum_premium()
        );
    }

    let today = service.context().clock.today();
    for product in ProductCode::ALL {
        let offered = service.rating().available_underwriters(product, today);
        println!();
        if offered.is_empty() {
            println!("{}: no underwriter offers this cover", product);
            continue;
        }
        println!("{} for a {} vehicle", product, declared_value);

        let candidates: Vec<_> = offered.iter().map(|summary| summary.id.clone()).collect();
        let request = sample_request(product, candidates[0].clone(), declared_value, today);
        for quote in service.rating().compare_underwriters(&request, &candidates) {
            match quote.result {
                Ok(breakdown) => println!(
                    "  {:<10} {:>14}{}",
                    quote.underwriter_id.as_str(),
                    breakdown.total_premium().to_string(),
                    if breakdown.minimum_premium_applied() { "  (minimum)" } else { "" }
                ),
                Err(error) => println!("  {:<10} {}", quote.underwriter_id.as_str(), error),
            }
        }
    }

    Ok(())
}

fn describe_base_rate(table: &RateTable) -> String {
    match table.base_rate() {
        BaseRate::PercentOfValue { rate } => format!("{}% of value", rate.as_percentage()),
        BaseRate::PercentOfValueByAge { rates } => {
            let (min, max) = rates.covered_range();
            format!("by age, {} bands ({}-{} yrs)", rates.brackets().len(), min, max)
        }
        BaseRate::Flat { amount } => format!("flat {}", amount),
    }
}

fn sample_request(
    product: ProductCode,
    underwriter: domain_rating::UnderwriterId,
    declared_value: Decimal,
    today: chrono::NaiveDate,
) -> RatingRequest {
    RatingRequest {
        vehicle: VehicleProfile {
            registration: "KDH 204C".to_string(),
            make: "Toyota".to_string(),
            model: "Axio".to_string(),
            year_of_manufacture: 2020,
            engine_capacity_cc: Some(1500),
            declared_value,
            usage: UsageType::Private,
            category: VehicleCategory::PrivateCar,
        },
        driver: Some(DriverProfile::new(35).with_years_licensed(10)),
        coverage: CoverageSelection {
            product,
            underwriter,
            duration_months: 12,
            start_date: today,
        },
        history: None,
        rated_on: today,
    }
}
