//! spotify-prices - Premium plan prices across storefronts, in one currency
//!
//! Collects plan prices from every configured country storefront, converts
//! them with live exchange rates, keeps the cheapest price per country and
//! plan, and publishes the dataset to a git repository.

pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod pipeline;
pub mod pricing;
pub mod publish;
pub mod rates;
pub mod storefront;

#[cfg(test)]
pub(crate) mod mocks;

pub use config::Config;
pub use error::PriceError;
pub use pipeline::{Pipeline, RunReport};
pub use pricing::{AggregatedRecord, PlanCategory};
