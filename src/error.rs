//! Typed failures for each pipeline stage.
//!
//! Severity is decided by the caller: a rate failure aborts the run, a
//! country failure skips one storefront, a card failure skips one plan card.

use std::fmt;
use thiserror::Error;

/// Which bounded wait expired while loading a storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStage {
    /// Page navigation (HTTP load) did not finish in time.
    Navigation,
    /// The page loaded but the plan-card selector never matched.
    Selector,
}

impl fmt::Display for WaitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitStage::Navigation => write!(f, "navigation"),
            WaitStage::Selector => write!(f, "selector wait"),
        }
    }
}

/// Failures produced by the collection pipeline and its collaborators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PriceError {
    #[error("failed to fetch exchange rates for base {base}: {reason}")]
    RateFetchFailed { base: String, reason: String },

    #[error("missing credential: {name} is not set")]
    MissingCredential { name: String },

    #[error("storefront {country} timed out during {stage} after {timeout_ms}ms")]
    CountryTimedOut { country: String, stage: WaitStage, timeout_ms: u64 },

    #[error("storefront {country} could not be loaded: {reason}")]
    CountryUnavailable { country: String, reason: String },

    #[error("plan card #{index} on storefront {country} skipped: {reason}")]
    CardParseError { country: String, index: usize, reason: String },

    #[error("publish skipped: {reason}")]
    PublishSkipped { reason: String },

    #[error("no usable prices were collected")]
    NoRecords,
}

impl PriceError {
    /// Returns the storefront code this failure belongs to, if any.
    pub fn country(&self) -> Option<&str> {
        match self {
            PriceError::CountryTimedOut { country, .. }
            | PriceError::CountryUnavailable { country, .. }
            | PriceError::CardParseError { country, .. } => Some(country),
            _ => None,
        }
    }

    /// Returns true if this failure must abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PriceError::RateFetchFailed { .. }
                | PriceError::MissingCredential { .. }
                | PriceError::NoRecords
        )
    }
}
