//! Full run: collect, then publish the dataset.

use super::collect::collect_report;
use crate::config::Config;
use crate::publish::{serialize_dataset, GitPublisher, Publisher};
use crate::rates::{ExchangeRateClient, RateProvider};
use crate::storefront::{Storefront, StorefrontClient};
use anyhow::{Context, Result};
use tracing::{error, info, warn};

/// Collects prices and hands the dataset to a publisher.
pub struct RunCommand {
    config: Config,
    publish: bool,
}

impl RunCommand {
    /// Creates a new run command. `publish = false` stops after collection.
    pub fn new(config: Config, publish: bool) -> Self {
        Self { config, publish }
    }

    /// Executes the full run and returns a human-readable report.
    pub async fn execute(&self) -> Result<String> {
        if self.publish && !self.config.can_publish() {
            warn!("REPO_URL or GITHUB_TOKEN is not set; the dataset will not be pushed");
        }

        let storefront =
            StorefrontClient::new(&self.config).context("Failed to create HTTP client")?;
        let rates =
            ExchangeRateClient::new(&self.config).context("Failed to create rate client")?;
        let publisher = GitPublisher::new(&self.config.publish);

        self.execute_with_clients(storefront, rates, &publisher).await
    }

    /// Executes the full run with provided collaborators (for testing).
    ///
    /// Publishing failures are logged and reported but never fail the run.
    pub async fn execute_with_clients(
        &self,
        storefront: impl Storefront,
        rates: impl RateProvider,
        publisher: &impl Publisher,
    ) -> Result<String> {
        let report = collect_report(storefront, rates, self.config.clone()).await?;

        let mut lines = vec![report.summary()];
        for (country, reason) in report.skipped() {
            lines.push(format!("  skipped {}: {}", country.code, reason));
        }

        if !self.publish {
            lines.push("Publish: disabled".to_string());
            return Ok(lines.join("\n"));
        }

        let content = serialize_dataset(&report.records)?;
        match publisher.publish(&content).await {
            Ok(outcome) => {
                info!("Publish: {}", outcome);
                lines.push(format!("Publish: {}", outcome));
            }
            Err(e) => {
                error!("Publish failed: {:#}", e);
                lines.push(format!("Publish: failed ({:#})", e));
            }
        }

        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{card_page, fast_config, MockPublisher, MockRates, MockStorefront};
    use crate::error::PriceError;
    use crate::pricing::AggregatedRecord;
    use crate::publish::PublishOutcome;

    fn storefront() -> MockStorefront {
        MockStorefront::new()
            .page("us", card_page(&[("Premium Individual", "$9.99")]))
            .page("de", card_page(&[("Premium Individual", "€8,99")]))
            .failing("jp")
    }

    fn rates() -> MockRates {
        MockRates::new(&[("USD", 1.0), ("EUR", 0.9), ("JPY", 20.0)])
    }

    fn config() -> Config {
        fast_config(&[("us", "USD"), ("jp", "JPY"), ("de", "EUR")])
    }

    #[tokio::test]
    async fn test_run_publishes_dataset() {
        let publisher = MockPublisher::returning(PublishOutcome::Published {
            message: "Data update: 2024-01-01 00:00:00 UTC".to_string(),
        });

        let cmd = RunCommand::new(config(), true);
        let output = cmd.execute_with_clients(storefront(), rates(), &publisher).await.unwrap();

        assert!(output.starts_with("2 records in CNY from 2/3 storefronts"));
        assert!(output.contains("skipped jp"));
        assert!(output.contains("Publish: published (Data update: 2024-01-01 00:00:00 UTC)"));

        let published = publisher.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        let records: Vec<AggregatedRecord> = serde_json::from_slice(&published[0]).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country_code, "US");
        assert_eq!(records[1].country_code, "DE");
        assert!(String::from_utf8_lossy(&published[0]).contains("\n    {"));
    }

    #[tokio::test]
    async fn test_run_without_publish() {
        let publisher = MockPublisher::returning(PublishOutcome::Unchanged);

        let cmd = RunCommand::new(config(), false);
        let output = cmd.execute_with_clients(storefront(), rates(), &publisher).await.unwrap();

        assert!(output.contains("Publish: disabled"));
        assert!(publisher.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_reports_skipped_publish() {
        let publisher = MockPublisher::returning(PublishOutcome::Skipped(
            PriceError::PublishSkipped { reason: "REPO_URL or GITHUB_TOKEN is not set".to_string() },
        ));

        let cmd = RunCommand::new(config(), true);
        let output = cmd.execute_with_clients(storefront(), rates(), &publisher).await.unwrap();

        assert!(output.contains("Publish: publish skipped: REPO_URL or GITHUB_TOKEN is not set"));
    }

    #[tokio::test]
    async fn test_run_publish_failure_is_not_fatal() {
        let publisher = MockPublisher::failing("git push failed (exit status: 128): denied");

        let cmd = RunCommand::new(config(), true);
        let output = cmd.execute_with_clients(storefront(), rates(), &publisher).await.unwrap();

        assert!(output.contains("Publish: failed (git push failed"));
    }

    #[tokio::test]
    async fn test_run_with_no_records_does_not_publish() {
        let publisher = MockPublisher::returning(PublishOutcome::Unchanged);
        let storefront = MockStorefront::new().failing("us").failing("jp").failing("de");

        let cmd = RunCommand::new(config(), true);
        let err = cmd.execute_with_clients(storefront, rates(), &publisher).await.unwrap_err();

        assert_eq!(err.downcast_ref::<PriceError>(), Some(&PriceError::NoRecords));
        assert!(publisher.published.lock().unwrap().is_empty());
    }
}
