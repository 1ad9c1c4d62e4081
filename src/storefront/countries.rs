//! Storefront countries and their local currencies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A storefront locale and the currency its prices are quoted in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Country {
    /// Lowercase storefront locale tag (e.g. "us", "gb")
    pub code: String,
    /// Uppercase ISO-4217 currency code (e.g. "USD")
    pub currency: String,
}

impl Country {
    /// Creates a new country entry.
    pub fn new(code: impl Into<String>, currency: impl Into<String>) -> Self {
        Self { code: code.into(), currency: currency.into() }
    }

    /// Returns the storefront URL: `<site_root>/<code>/<product_path>`.
    pub fn storefront_url(&self, site_root: &str, product_path: &str) -> String {
        format!(
            "{}/{}/{}",
            site_root.trim_end_matches('/'),
            self.code,
            product_path.trim_start_matches('/')
        )
    }

    /// Returns the uppercase code used in the published dataset.
    pub fn dataset_code(&self) -> String {
        self.code.to_uppercase()
    }

    /// Returns true if the code is a plausible lowercase locale tag.
    pub fn has_valid_code(&self) -> bool {
        !self.code.is_empty() && self.code.chars().all(|c| c.is_ascii_lowercase())
    }

    /// Returns true if the currency is three uppercase ASCII letters.
    pub fn has_valid_currency(&self) -> bool {
        is_currency_code(&self.currency)
    }
}

/// Returns true if `code` looks like an ISO-4217 code ("USD").
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.currency)
    }
}

/// Returns the default storefront table, in scrape order.
pub fn default_countries() -> Vec<Country> {
    [
        ("ng", "NGN"),
        ("sg", "SGD"),
        ("in", "INR"),
        ("us", "USD"),
        ("gb", "GBP"),
        ("de", "EUR"),
        ("jp", "JPY"),
        ("br", "BRL"),
        ("au", "AUD"),
        ("ca", "CAD"),
        ("za", "ZAR"),
        ("tr", "TRY"),
        ("pk", "PKR"),
        ("kr", "KRW"),
    ]
    .into_iter()
    .map(|(code, currency)| Country::new(code, currency))
    .collect()
}
