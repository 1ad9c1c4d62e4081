//! Collect command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::pipeline::{Pipeline, RunReport};
use crate::rates::{ExchangeRateClient, RateProvider};
use crate::storefront::{Storefront, StorefrontClient};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Runs the pipeline and prints the aggregated records.
pub struct CollectCommand {
    config: Config,
}

impl CollectCommand {
    /// Creates a new collect command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Collects prices from every configured storefront and returns formatted output.
    pub async fn execute(&self) -> Result<String> {
        let storefront =
            StorefrontClient::new(&self.config).context("Failed to create HTTP client")?;
        let rates =
            ExchangeRateClient::new(&self.config).context("Failed to create rate client")?;

        self.execute_with_clients(storefront, rates).await
    }

    /// Collects prices with provided clients (for testing).
    pub async fn execute_with_clients(
        &self,
        storefront: impl Storefront,
        rates: impl RateProvider,
    ) -> Result<String> {
        let report = collect_report(storefront, rates, self.config.clone()).await?;

        let formatter = Formatter::new(self.config.format, &self.config.base_currency);
        Ok(formatter.format_records(&report.records))
    }
}

/// Runs one collection and fails if the run produced no usable records.
pub(crate) async fn collect_report(
    storefront: impl Storefront,
    rates: impl RateProvider,
    config: Config,
) -> Result<RunReport> {
    let pipeline = Pipeline::new(storefront, rates, config);
    let report = pipeline.run().await?;

    for (country, reason) in report.skipped() {
        warn!("Skipped {}: {}", country, reason);
    }
    info!("{}", report.summary());

    report.ensure_records()?;
    Ok(report)
}
