//! Data models for plan observations and the published dataset.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized subscription tier, independent of per-market marketing names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanCategory {
    Individual,
    Duo,
    Family,
    Student,
    /// Plan names that match no known tier. Retained, not an error.
    Unknown,
}

impl PlanCategory {
    /// Returns all categories.
    pub fn all() -> &'static [PlanCategory] {
        &[
            PlanCategory::Individual,
            PlanCategory::Duo,
            PlanCategory::Family,
            PlanCategory::Student,
            PlanCategory::Unknown,
        ]
    }

    /// Returns the dataset name of this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanCategory::Individual => "Individual",
            PlanCategory::Duo => "Duo",
            PlanCategory::Family => "Family",
            PlanCategory::Student => "Student",
            PlanCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plan name and price text as read from one plan card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObservation {
    /// Storefront locale tag (lowercase, e.g. "us")
    pub country_code: String,
    pub plan_name_raw: String,
    pub price_text_raw: String,
}

/// A normalized observation with its reference-currency price.
///
/// `local_price` or `reference_price` being `None` marks the observation
/// as unusable; the aggregator drops it.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedObservation {
    /// Uppercase country code (e.g. "US")
    pub country_code: String,
    pub plan_category: PlanCategory,
    pub local_price: Option<f64>,
    pub local_currency: String,
    pub reference_price: Option<f64>,
}

/// Cheapest observation for one (country, plan) pair.
///
/// Field names on the wire are fixed by downstream consumers, including
/// `price_cny` for the reference price regardless of the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub country_code: String,
    #[serde(rename = "plan_name")]
    pub plan_category: PlanCategory,
    pub local_price: f64,
    pub local_currency: String,
    #[serde(rename = "price_cny")]
    pub reference_price: f64,
}
