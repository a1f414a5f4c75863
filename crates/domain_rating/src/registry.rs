//! Rate Table Registry
//!
//! The registry is assembled once at process start from a fixed set of
//! tables and is read-only afterwards. Each underwriter/product pair holds
//! its versions ordered by effective date. A missing pair is always a
//! [`ConfigurationError`]; the registry never substitutes another table.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::coverage::{ProductCode, UnderwriterId};
use crate::error::ConfigurationError;
use crate::rate_table::RateTable;

/// An underwriter that can be offered for a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnderwriterSummary {
    pub id: UnderwriterId,
    pub name: String,
}

/// Frozen, shareable set of versioned rate tables
#[derive(Debug, Default)]
pub struct RateTableRegistry {
    tables: HashMap<UnderwriterId, HashMap<ProductCode, Vec<Arc<RateTable>>>>,
}

impl RateTableRegistry {
    pub fn builder() -> RateTableRegistryBuilder {
        RateTableRegistryBuilder::default()
    }

    /// Returns the most recent version of the table for `underwriter` and `product`
    pub fn get_rate_table(
        &self,
        underwriter: &UnderwriterId,
        product: ProductCode,
    ) -> Result<Arc<RateTable>, ConfigurationError> {
        self.versions(underwriter, product)?
            .last()
            .cloned()
            .ok_or_else(|| not_found(underwriter, product))
    }

    /// Returns the version in effect on `date`: the latest version whose
    /// effective date is on or before it
    pub fn get_rate_table_as_of(
        &self,
        underwriter: &UnderwriterId,
        product: ProductCode,
        date: NaiveDate,
    ) -> Result<Arc<RateTable>, ConfigurationError> {
        self.versions(underwriter, product)?
            .iter()
            .rev()
            .find(|t| t.effective_from() <= date)
            .cloned()
            .ok_or_else(|| ConfigurationError::NoVersionInEffect {
                underwriter: underwriter.clone(),
                product,
                date,
            })
    }

    /// All versions of one table, oldest first
    pub fn versions(
        &self,
        underwriter: &UnderwriterId,
        product: ProductCode,
    ) -> Result<&[Arc<RateTable>], ConfigurationError> {
        self.tables
            .get(underwriter.as_str())
            .and_then(|products| products.get(&product))
            .map(Vec::as_slice)
            .ok_or_else(|| not_found(underwriter, product))
    }

    /// Returns true if any version exists for the pair
    pub fn contains(&self, underwriter: &UnderwriterId, product: ProductCode) -> bool {
        self.versions(underwriter, product).is_ok()
    }

    /// Underwriters with a table in effect for `product` on `date`, ordered by id
    pub fn underwriters_for(&self, product: ProductCode, date: NaiveDate) -> Vec<UnderwriterSummary> {
        let mut summaries: Vec<UnderwriterSummary> = self
            .tables
            .iter()
            .filter_map(|(id, products)| {
                products
                    .get(&product)?
                    .iter()
                    .rev()
                    .find(|t| t.effective_from() <= date)
                    .map(|t| UnderwriterSummary {
                        id: id.clone(),
                        name: t.underwriter_name().to_string(),
                    })
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Iterates over every table version
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RateTable>> {
        self.tables
            .values()
            .flat_map(|products| products.values())
            .flatten()
    }

    /// Number of table versions held
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

fn not_found(underwriter: &UnderwriterId, product: ProductCode) -> ConfigurationError {
    ConfigurationError::RateTableNotFound {
        underwriter: underwriter.clone(),
        product,
    }
}

/// Collects tables and freezes them into a [`RateTableRegistry`]
#[derive(Debug, Default)]
pub struct RateTableRegistryBuilder {
    tables: Vec<RateTable>,
}

impl RateTableRegistryBuilder {
    pub fn with_table(mut self, table: RateTable) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_tables(mut self, tables: impl IntoIterator<Item = RateTable>) -> Self {
        self.tables.extend(tables);
        self
    }

    /// Freezes the registry
    ///
    /// # Errors
    ///
    /// Returns `DuplicateVersion` if two tables share underwriter, product and
    /// effective date.
    pub fn build(self) -> Result<RateTableRegistry, ConfigurationError> {
        let mut tables: HashMap<UnderwriterId, HashMap<ProductCode, Vec<Arc<RateTable>>>> =
            HashMap::new();

        for table in self.tables {
            let versions = tables
                .entry(table.underwriter().clone())
                .or_default()
                .entry(table.product())
                .or_default();

            if versions.iter().any(|v| v.effective_from() == table.effective_from()) {
                return Err(ConfigurationError::DuplicateVersion {
                    underwriter: table.underwriter().clone(),
                    product: table.product(),
                    effective_from: table.effective_from(),
                });
            }
            versions.push(Arc::new(table));
        }

        for versions in tables.values_mut().flat_map(|products| products.values_mut()) {
            versions.sort_by_key(|t| t.effective_from());
        }

        let registry = RateTableRegistry { tables };
        tracing::info!(tables = registry.len(), "Rate table registry built");
        Ok(registry)
    }
}
