//! Narrow page capabilities the extractor depends on.
//!
//! Extraction only needs to find repeating elements and read the text of
//! a descendant, so any rendering backend (or a test double) can stand in.

use super::selectors::parse_selector;
use anyhow::{Context, Result};
use scraper::{ElementRef, Html};

/// A loaded page that can be queried by CSS selector.
pub trait PageSource {
    type Element<'a>: ElementHandle
    where
        Self: 'a;

    /// Returns every element matching `selector`, in document order.
    fn find_all(&self, selector: &str) -> Result<Vec<Self::Element<'_>>>;
}

/// One element of a [`PageSource`].
pub trait ElementHandle {
    /// Returns the visible text of the first descendant matching `selector`.
    fn inner_text(&self, selector: &str) -> Result<String>;
}

/// A storefront page parsed from its HTML source.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    /// Parses an HTML document.
    pub fn parse(html: &str) -> Self {
        Self { document: Html::parse_document(html) }
    }
}

impl PageSource for HtmlPage {
    type Element<'a>
        = ElementRef<'a>
    where
        Self: 'a;

    fn find_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>> {
        let selector = parse_selector(selector)?;
        Ok(self.document.select(&selector).collect())
    }
}

impl ElementHandle for ElementRef<'_> {
    fn inner_text(&self, selector: &str) -> Result<String> {
        let parsed = parse_selector(selector)?;
        let element = self
            .select(&parsed)
            .next()
            .with_context(|| format!("no element matches {:?}", selector))?;

        let text = element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
        if text.is_empty() {
            anyhow::bail!("element matching {:?} has no text", selector);
        }

        Ok(text)
    }
}
