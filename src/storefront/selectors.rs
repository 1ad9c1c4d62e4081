//! CSS selectors for storefront plan cards.
//!
//! Storefront markup changes without notice, so the selectors are part of
//! the configuration. The defaults below match the current premium page.
//!
//! **Update process**: When extraction finds no cards, capture the page,
//! update `config.toml` (or these defaults), and add a test fixture.

use anyhow::{anyhow, Result};
use scraper::Selector;
use serde::{Deserialize, Serialize};

/// Repeating plan card container.
pub const DEFAULT_CARD: &str = r#"[data-testid="plan-card"]"#;

/// Plan title inside a card.
pub const DEFAULT_NAME: &str = r#"[data-testid="plan-title"]"#;

/// Price label inside a card.
pub const DEFAULT_PRICE: &str = r#"[data-testid="plan-price"]"#;

/// The three selectors the extractor relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSelectors {
    #[serde(default = "default_card")]
    pub card: String,
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_price")]
    pub price: String,
}

fn default_card() -> String {
    DEFAULT_CARD.to_string()
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_price() -> String {
    DEFAULT_PRICE.to_string()
}

impl Default for PlanSelectors {
    fn default() -> Self {
        Self { card: default_card(), name: default_name(), price: default_price() }
    }
}

impl PlanSelectors {
    /// Checks that every selector parses.
    pub fn validate(&self) -> Result<()> {
        for (label, css) in [("card", &self.card), ("name", &self.name), ("price", &self.price)] {
            parse_selector(css).map_err(|e| anyhow!("Invalid {} selector: {}", label, e))?;
        }
        Ok(())
    }
}

/// Parses a CSS selector, turning scraper's borrowed error into an owned one.
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("{:?} does not parse: {:?}", css, e))
}
