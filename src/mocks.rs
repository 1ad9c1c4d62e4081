//! Test doubles shared by the pipeline and command tests.

use crate::config::Config;
use crate::error::PriceError;
use crate::publish::{PublishOutcome, Publisher};
use crate::rates::{ExchangeRateTable, RateProvider};
use crate::storefront::{Country, Storefront};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Builds a page with one plan card per (name, price) pair.
pub fn card_page(cards: &[(&str, &str)]) -> String {
    let cards: String = cards
        .iter()
        .map(|(name, price)| {
            format!(
                r#"<div data-testid="plan-card"><h3 data-testid="plan-title">{}</h3><p data-testid="plan-price">{}</p></div>"#,
                name, price
            )
        })
        .collect();
    format!("<html><body>{}</body></html>", cards)
}

/// Storefront serving canned pages per country code.
///
/// Pages added for the same code are served in order; later loads reuse
/// the last one.
pub struct MockStorefront {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockStorefront {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failing: HashSet::new(),
            hanging: HashSet::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn page(mut self, code: &str, html: String) -> Self {
        self.pages.entry(code.to_string()).or_default().push(html);
        self
    }

    pub fn failing(mut self, code: &str) -> Self {
        self.failing.insert(code.to_string());
        self
    }

    /// Loads for `code` never complete.
    pub fn hanging(mut self, code: &str) -> Self {
        self.hanging.insert(code.to_string());
        self
    }

    /// Country codes in load order.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }

    pub fn calls_for(&self, code: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == code).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Storefront for MockStorefront {
    async fn load(&self, country: &Country) -> Result<String> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(country.code.clone());
            calls.iter().filter(|c| **c == country.code).count()
        };

        if self.hanging.contains(&country.code) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(&country.code) {
            anyhow::bail!("Request failed with status: 500 Internal Server Error");
        }

        let pages = self.pages.get(&country.code);
        Ok(pages
            .and_then(|p| p.get(attempt - 1).or(p.last()))
            .cloned()
            .unwrap_or_else(|| card_page(&[])))
    }
}

/// Rate provider returning a fixed table, or failing.
pub struct MockRates {
    table: Option<ExchangeRateTable>,
}

impl MockRates {
    pub fn new(rates: &[(&str, f64)]) -> Self {
        Self { table: Some(ExchangeRateTable::new("CNY", rates.iter().copied())) }
    }

    pub fn failing() -> Self {
        Self { table: None }
    }
}

#[async_trait]
impl RateProvider for MockRates {
    async fn fetch_rates(&self, base: &str) -> Result<ExchangeRateTable, PriceError> {
        self.table.clone().ok_or_else(|| PriceError::RateFetchFailed {
            base: base.to_string(),
            reason: "Rate endpoint returned status: 503 Service Unavailable".to_string(),
        })
    }
}

/// Publisher that records what it was given.
pub struct MockPublisher {
    pub published: Mutex<Vec<Vec<u8>>>,
    pub outcome: Result<PublishOutcome, String>,
}

impl MockPublisher {
    pub fn returning(outcome: PublishOutcome) -> Self {
        Self { published: Mutex::new(Vec::new()), outcome: Ok(outcome) }
    }

    pub fn failing(message: &str) -> Self {
        Self { published: Mutex::new(Vec::new()), outcome: Err(message.to_string()) }
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, content: &[u8]) -> Result<PublishOutcome> {
        self.published.lock().unwrap().push(content.to_vec());
        self.outcome.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

/// Config with short waits for pages without cards.
pub fn fast_config(countries: &[(&str, &str)]) -> Config {
    Config {
        countries: countries.iter().map(|(code, cur)| Country::new(*code, *cur)).collect(),
        navigation_timeout_ms: 500,
        selector_timeout_ms: 30,
        selector_poll_ms: 10,
        delay_ms: 0,
        delay_jitter_ms: 0,
        ..Config::default()
    }
}
