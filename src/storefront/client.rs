//! HTTP client for storefront pages using wreq for TLS fingerprint emulation.

use super::countries::Country;
use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;
use wreq_util::Emulation;

/// Trait for loading storefront pages - enables mocking for tests.
#[async_trait]
pub trait Storefront: Send + Sync {
    /// Loads the product page for one country and returns its HTML.
    async fn load(&self, country: &Country) -> Result<String>;
}

/// Storefront HTTP client with browser impersonation and request pacing.
pub struct StorefrontClient {
    client: Client,
    site_root: String,
    product_path: String,
    delay_ms: u64,
    delay_jitter_ms: u64,
}

impl StorefrontClient {
    /// Creates a new storefront client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .connect_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build()?;

        Ok(Self {
            client,
            site_root: config.site_root.clone(),
            product_path: config.product_path.clone(),
            delay_ms: config.delay_ms,
            delay_jitter_ms: config.delay_jitter_ms,
        })
    }

    /// Returns the page URL for a country.
    pub fn url_for(&self, country: &Country) -> String {
        country.storefront_url(&self.site_root, &self.product_path)
    }

    /// Performs a GET request with browser-like headers.
    async fn get(&self, url: &str, country: &Country) -> Result<String> {
        self.delay().await;

        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .emulation(Emulation::Chrome131)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Sec-Fetch-User", "?1")
            .header("Upgrade-Insecure-Requests", "1")
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 429 || status == 503 {
            warn!(
                "Rate limited ({}) on {}. Consider using a proxy or increasing delay.",
                status, country.code
            );
            anyhow::bail!("Rate limited by storefront (status {})", status);
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        // Geo-redirects land on another locale's page with other prices
        let final_url = response.uri().to_string();
        let locale_segment = format!("/{}/", country.code);
        if !final_url.contains(&locale_segment) {
            warn!(
                "Storefront {} redirected to {}. Prices may belong to a different country.",
                country.code, final_url
            );
        }

        response.text().await.context("Failed to read response body")
    }

    /// Adds a random delay to pace requests.
    async fn delay(&self) {
        if self.delay_ms == 0 {
            return;
        }

        let jitter = if self.delay_jitter_ms > 0 {
            rand::rng().random_range(0..=self.delay_jitter_ms)
        } else {
            0
        };

        let total_delay = self.delay_ms + jitter;
        debug!("Delaying {}ms", total_delay);
        tokio::time::sleep(Duration::from_millis(total_delay)).await;
    }
}

#[async_trait]
impl Storefront for StorefrontClient {
    async fn load(&self, country: &Country) -> Result<String> {
        let url = self.url_for(country);

        info!("Loading storefront: {}", url);
        self.get(&url, country).await
    }
}
