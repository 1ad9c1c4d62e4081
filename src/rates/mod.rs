//! Exchange-rate fetching for currency conversion.

mod client;
mod models;

pub use client::{ExchangeRateClient, RateProvider};
pub use models::ExchangeRateTable;
