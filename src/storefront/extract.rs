//! Plan-card extraction from a loaded storefront page.

use super::page::{ElementHandle, PageSource};
use super::selectors::PlanSelectors;
use crate::error::PriceError;
use crate::pricing::RawObservation;
use tracing::{debug, trace, warn};

/// Result of reading every plan card on one page.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Number of elements that matched the card selector
    pub cards_found: usize,
    /// Raw name/price pairs, in card order
    pub observations: Vec<RawObservation>,
    /// Cards that were skipped, with the reason
    pub skipped: Vec<PriceError>,
}

impl Extraction {
    /// Returns true if the card selector matched nothing.
    pub fn is_empty(&self) -> bool {
        self.cards_found == 0
    }
}

/// Reads the plan name and price text from every card on `page`.
///
/// A card missing either field is skipped on its own; the remaining cards
/// are still read. Only a failing card query fails the whole page.
pub fn extract<P: PageSource>(
    page: &P,
    country_code: &str,
    selectors: &PlanSelectors,
) -> Result<Extraction, PriceError> {
    let cards = page.find_all(&selectors.card).map_err(|e| PriceError::CountryUnavailable {
        country: country_code.to_string(),
        reason: format!("card query failed: {:#}", e),
    })?;

    let mut extraction = Extraction { cards_found: cards.len(), ..Default::default() };

    for (index, card) in cards.iter().enumerate() {
        match read_card(card, selectors) {
            Ok((plan_name_raw, price_text_raw)) => {
                trace!(
                    "Card #{} on {}: {:?} / {:?}",
                    index,
                    country_code,
                    plan_name_raw,
                    price_text_raw
                );
                extraction.observations.push(RawObservation {
                    country_code: country_code.to_string(),
                    plan_name_raw,
                    price_text_raw,
                });
            }
            Err(e) => {
                let failure = PriceError::CardParseError {
                    country: country_code.to_string(),
                    index,
                    reason: format!("{:#}", e),
                };
                warn!("{}", failure);
                extraction.skipped.push(failure);
            }
        }
    }

    debug!(
        "Extracted {} of {} plan cards on {}",
        extraction.observations.len(),
        extraction.cards_found,
        country_code
    );

    Ok(extraction)
}

fn read_card<E: ElementHandle>(
    card: &E,
    selectors: &PlanSelectors,
) -> anyhow::Result<(String, String)> {
    let name = card.inner_text(&selectors.name)?;
    let price = card.inner_text(&selectors.price)?;
    Ok((name, price))
}
