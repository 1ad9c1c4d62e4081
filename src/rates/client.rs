//! HTTP client for the exchange-rate endpoint.

use super::models::{ExchangeRateTable, LatestRatesResponse};
use crate::config::Config;
use crate::error::PriceError;
use crate::publish::redact;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

/// Trait for fetching exchange rates - enables mocking for tests.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetches the conversion table for `base`. Never returns partial data.
    async fn fetch_rates(&self, base: &str) -> Result<ExchangeRateTable, PriceError>;
}

/// exchangerate-api v6 client.
pub struct ExchangeRateClient {
    client: Client,
    url_template: String,
    api_key: Option<String>,
}

impl ExchangeRateClient {
    /// Creates a client from the rate settings in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.rates_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            url_template: config.rates_url.clone(),
            api_key: config.rates_api_key.as_ref().map(|k| k.expose().to_string()),
        })
    }

    /// Builds the request URL for a base currency.
    fn url(&self, key: &str, base: &str) -> String {
        self.url_template
            .replace("{key}", &urlencoding::encode(key))
            .replace("{base}", &urlencoding::encode(base))
    }

    /// Internal method to fetch the response body.
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            anyhow::bail!("Rate endpoint returned status: {}", response.status());
        }

        response.text().await.context("Failed to read response body")
    }
}

/// Validates an endpoint body and turns it into a rate table.
fn parse_rates(body: &str, base: &str) -> Result<ExchangeRateTable> {
    let parsed: LatestRatesResponse =
        serde_json::from_str(body).context("Malformed rate response body")?;

    if let Some(result) = parsed.result.as_deref() {
        if result != "success" {
            anyhow::bail!(
                "Rate endpoint reported {}: {}",
                result,
                parsed.error_type.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let rates = parsed.conversion_rates.context("Response has no conversion_rates")?;

    if let Some(updated) = &parsed.time_last_update_utc {
        debug!("Rates last updated {}", updated);
    }

    Ok(ExchangeRateTable::new(parsed.base_code.unwrap_or_else(|| base.to_string()), rates))
}

/// Wraps any fetch or parse error as a run-fatal rate failure.
fn rate_failure(base: &str, key: &str, error: anyhow::Error) -> PriceError {
    PriceError::RateFetchFailed {
        base: base.to_string(),
        reason: redact(&format!("{:#}", error), key),
    }
}

#[async_trait]
impl RateProvider for ExchangeRateClient {
    async fn fetch_rates(&self, base: &str) -> Result<ExchangeRateTable, PriceError> {
        let key = self.api_key.as_deref().filter(|k| !k.is_empty()).ok_or_else(|| {
            PriceError::MissingCredential { name: "EXCHANGE_RATE_API_KEY".to_string() }
        })?;

        info!("Fetching exchange rates for base {}", base);

        let url = self.url(key, base);
        let body = self.fetch(&url).await.map_err(|e| rate_failure(base, key, e))?;
        let table = parse_rates(&body, base).map_err(|e| rate_failure(base, key, e))?;

        debug!("Loaded {} exchange rates", table.len());
        Ok(table)
    }
}
