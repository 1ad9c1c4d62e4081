//! Collection pipeline: rates, then every storefront, then one reduction.
//!
//! Rates are fetched once before any storefront is touched and a failure
//! there aborts the run. Storefronts are loaded through a bounded,
//! order-preserving stream; each one either yields observations or is
//! skipped with a typed reason. Aggregation starts only after every
//! storefront has finished.

use crate::config::Config;
use crate::error::{PriceError, WaitStage};
use crate::pricing::{
    clean_price, normalize_plan_name, reduce, to_reference, AggregatedRecord, PricedObservation,
    RawObservation,
};
use crate::rates::{ExchangeRateTable, RateProvider};
use crate::storefront::{extract, Country, Extraction, HtmlPage, PlanSelectors, Storefront};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// What happened to one storefront.
#[derive(Debug, Clone, PartialEq)]
pub enum CountryOutcome {
    /// The page was read; `observations` plan cards produced name/price pairs.
    Collected { observations: usize },
    /// The storefront was skipped.
    Skipped(PriceError),
}

/// Per-storefront entry of a [`RunReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct CountryReport {
    pub country: Country,
    pub outcome: CountryOutcome,
}

/// Everything a run produced, including what it had to leave out.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Reference currency of `records`
    pub base_currency: String,
    /// Cheapest record per (country, plan), in first-seen order
    pub records: Vec<AggregatedRecord>,
    /// One entry per configured storefront, in configuration order
    pub countries: Vec<CountryReport>,
    /// Individual plan cards that could not be read
    pub card_failures: Vec<PriceError>,
    /// Observations whose price text held no usable number
    pub unparsable: usize,
    /// Observations whose currency had no usable rate
    pub unconvertible: usize,
}

impl RunReport {
    /// Storefronts that were skipped, with the reason.
    pub fn skipped(&self) -> impl Iterator<Item = (&Country, &PriceError)> {
        self.countries.iter().filter_map(|c| match &c.outcome {
            CountryOutcome::Skipped(e) => Some((&c.country, e)),
            CountryOutcome::Collected { .. } => None,
        })
    }

    /// Number of storefronts that were read.
    pub fn collected_count(&self) -> usize {
        self.countries
            .iter()
            .filter(|c| matches!(c.outcome, CountryOutcome::Collected { .. }))
            .count()
    }

    /// Fails with [`PriceError::NoRecords`] when nothing usable was collected.
    pub fn ensure_records(&self) -> Result<(), PriceError> {
        if self.records.is_empty() {
            return Err(PriceError::NoRecords);
        }
        Ok(())
    }

    /// One-line summary for the end-of-run log.
    pub fn summary(&self) -> String {
        format!(
            "{} records in {} from {}/{} storefronts ({} skipped, {} card failures, {} unparsable, {} unconvertible)",
            self.records.len(),
            self.base_currency,
            self.collected_count(),
            self.countries.len(),
            self.countries.len() - self.collected_count(),
            self.card_failures.len(),
            self.unparsable,
            self.unconvertible
        )
    }
}

/// Orchestrates one collection run over explicit configuration.
pub struct Pipeline<S, R> {
    storefront: S,
    rates: R,
    config: Config,
}

impl<S: Storefront, R: RateProvider> Pipeline<S, R> {
    /// Creates a pipeline over the given collaborators.
    pub fn new(storefront: S, rates: R, config: Config) -> Self {
        Self { storefront, rates, config }
    }

    /// Fetches rates, then collects every configured storefront.
    ///
    /// Only a rate failure is returned as an error. Storefront and card
    /// failures are recorded in the report.
    pub async fn run(&self) -> Result<RunReport, PriceError> {
        let table = self.rates.fetch_rates(&self.config.base_currency).await?;
        info!("Loaded {} rates for base {}", table.len(), table.base);

        Ok(self.collect(&table).await)
    }

    /// Collects every configured storefront against an already fetched table.
    pub async fn collect(&self, rates: &ExchangeRateTable) -> RunReport {
        let concurrency = self.config.concurrency.max(1);
        debug!(
            "Collecting {} storefronts, {} at a time",
            self.config.countries.len(),
            concurrency
        );

        let results: Vec<(&Country, Result<Extraction, PriceError>)> =
            stream::iter(self.config.countries.iter())
                .map(|country| async move { (country, self.scrape_country(country).await) })
                .buffered(concurrency)
                .collect()
                .await;

        let mut report =
            RunReport { base_currency: self.config.base_currency.clone(), ..Default::default() };
        let mut priced = Vec::new();

        for (country, result) in results {
            let outcome = match result {
                Ok(extraction) => {
                    let observations = extraction.observations.len();
                    report.card_failures.extend(extraction.skipped);

                    for raw in extraction.observations {
                        let observation = price_observation(raw, country, rates);
                        if observation.local_price.is_none() {
                            report.unparsable += 1;
                        } else if observation.reference_price.is_none() {
                            report.unconvertible += 1;
                        }
                        priced.push(observation);
                    }

                    info!("Collected {} plans from {}", observations, country);
                    CountryOutcome::Collected { observations }
                }
                Err(e) => {
                    warn!("Skipping {}: {}", country, e);
                    CountryOutcome::Skipped(e)
                }
            };

            report.countries.push(CountryReport { country: country.clone(), outcome });
        }

        if report.unparsable > 0 || report.unconvertible > 0 {
            debug!(
                "Excluded {} unparsable and {} unconvertible observations",
                report.unparsable, report.unconvertible
            );
        }

        report.records = reduce(priced);
        report
    }

    /// Loads one storefront and reads its plan cards.
    ///
    /// A page without plan cards is reloaded every `selector_poll_ms` until
    /// `selector_timeout_ms` has passed since the first empty load.
    async fn scrape_country(&self, country: &Country) -> Result<Extraction, PriceError> {
        let selector_timeout = Duration::from_millis(self.config.selector_timeout_ms);
        let poll = Duration::from_millis(self.config.selector_poll_ms);
        let mut waiting_since: Option<Instant> = None;

        loop {
            let html = self.load(country).await?;
            let extraction = read_page(&html, &country.code, &self.config.selectors)?;
            if !extraction.is_empty() {
                return Ok(extraction);
            }

            let deadline = *waiting_since.get_or_insert_with(Instant::now) + selector_timeout;
            let now = Instant::now();
            if now >= deadline {
                return Err(PriceError::CountryTimedOut {
                    country: country.code.clone(),
                    stage: WaitStage::Selector,
                    timeout_ms: self.config.selector_timeout_ms,
                });
            }

            debug!("No plan cards on {} yet, reloading", country.code);
            tokio::time::sleep(poll.min(deadline - now)).await;
        }
    }

    /// Loads the page HTML within the navigation timeout.
    async fn load(&self, country: &Country) -> Result<String, PriceError> {
        let timeout_ms = self.config.navigation_timeout_ms;

        match tokio::time::timeout(Duration::from_millis(timeout_ms), self.storefront.load(country))
            .await
        {
            Ok(Ok(html)) => Ok(html),
            Ok(Err(e)) => Err(PriceError::CountryUnavailable {
                country: country.code.clone(),
                reason: format!("{:#}", e),
            }),
            Err(_) => Err(PriceError::CountryTimedOut {
                country: country.code.clone(),
                stage: WaitStage::Navigation,
                timeout_ms,
            }),
        }
    }
}

/// Parses and extracts in one synchronous step; the parsed document never
/// lives across an await point.
fn read_page(
    html: &str,
    country_code: &str,
    selectors: &PlanSelectors,
) -> Result<Extraction, PriceError> {
    let page = HtmlPage::parse(html);
    extract(&page, country_code, selectors)
}

/// Normalizes one raw observation and prices it in the reference currency.
fn price_observation(
    raw: RawObservation,
    country: &Country,
    rates: &ExchangeRateTable,
) -> PricedObservation {
    let local_price = clean_price(&raw.price_text_raw);
    let reference_price =
        local_price.and_then(|price| to_reference(price, &country.currency, rates));

    PricedObservation {
        country_code: country.dataset_code(),
        plan_category: normalize_plan_name(&raw.plan_name_raw),
        local_price,
        local_currency: country.currency.clone(),
        reference_price,
    }
}
