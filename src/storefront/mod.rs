//! Storefront loading and plan-card extraction.

pub mod client;
pub mod countries;
pub mod extract;
pub mod page;
pub mod selectors;

pub use client::{Storefront, StorefrontClient};
pub use countries::{default_countries, Country};
pub use extract::{extract, Extraction};
pub use page::{ElementHandle, HtmlPage, PageSource};
pub use selectors::PlanSelectors;
