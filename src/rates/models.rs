//! Exchange-rate table and the upstream response shape.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Units of each currency per one unit of the base currency.
///
/// Immutable once fetched. A missing code means the rate is unknown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateTable {
    /// Base (reference) currency code
    pub base: String,
    rates: HashMap<String, f64>,
}

impl ExchangeRateTable {
    /// Creates a table from any iterable of (code, rate) pairs.
    pub fn new<I, K>(base: impl Into<String>, rates: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            base: base.into(),
            rates: rates.into_iter().map(|(code, rate)| (code.into(), rate)).collect(),
        }
    }

    /// Returns the rate for a currency code.
    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }

    /// Returns true if the table has a rate for this currency.
    pub fn contains(&self, currency: &str) -> bool {
        self.rates.contains_key(currency)
    }

    /// Returns number of currencies.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Returns true if no rates are known.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Body of the `latest/{base}` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct LatestRatesResponse {
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default, rename = "error-type")]
    pub error_type: Option<String>,
    #[serde(default)]
    pub base_code: Option<String>,
    #[serde(default)]
    pub time_last_update_utc: Option<String>,
    #[serde(default)]
    pub conversion_rates: Option<HashMap<String, f64>>,
}
