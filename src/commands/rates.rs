//! Rates command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::rates::{ExchangeRateClient, RateProvider};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Fetches the rate table and shows the rate of each configured currency.
pub struct RatesCommand {
    config: Config,
}

impl RatesCommand {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn execute(&self) -> Result<String> {
        let client =
            ExchangeRateClient::new(&self.config).context("Failed to create rate client")?;

        self.execute_with_client(&client).await
    }

    /// Fetches rates with a provided client (for testing).
    pub async fn execute_with_client(&self, client: &impl RateProvider) -> Result<String> {
        let table = client.fetch_rates(&self.config.base_currency).await?;
        info!("Fetched {} rates for {}", table.len(), table.base);

        for country in self.config.countries.iter().filter(|c| !table.contains(&c.currency)) {
            warn!("No rate for {}; its prices will be excluded", country);
        }

        let formatter = Formatter::new(self.config.format, &self.config.base_currency);
        Ok(formatter.format_rates(&table, &self.config.countries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{fast_config, MockRates};
    use crate::config::OutputFormat;
    use crate::error::PriceError;

    #[tokio::test]
    async fn test_rates_csv() {
        let config =
            Config { format: OutputFormat::Csv, ..fast_config(&[("us", "USD"), ("pk", "PKR")]) };

        let cmd = RatesCommand::new(config);
        let output = cmd.execute_with_client(&MockRates::new(&[("USD", 0.1404)])).await.unwrap();

        assert_eq!(output, "country,currency,rate\nus,USD,0.1404\npk,PKR,");
    }

    #[tokio::test]
    async fn test_rates_failure() {
        let cmd = RatesCommand::new(fast_config(&[("us", "USD")]));
        let err = cmd.execute_with_client(&MockRates::failing()).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PriceError>(),
            Some(PriceError::RateFetchFailed { .. })
        ));
    }
}
