//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::storefront::countries::{default_countries, is_currency_code, Country};
use crate::storefront::selectors::PlanSelectors;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Upper bound on concurrent storefront sessions.
pub const MAX_CONCURRENCY: usize = 6;

/// A credential that never shows up in `Debug` output or logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wraps a credential.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw credential.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Reference currency all prices are converted into
    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    /// Rate endpoint template with `{key}` and `{base}` placeholders
    #[serde(default = "default_rates_url")]
    pub rates_url: String,

    /// Rate endpoint credential
    #[serde(default)]
    pub rates_api_key: Option<Secret>,

    /// Rate request timeout in milliseconds
    #[serde(default = "default_rates_timeout_ms")]
    pub rates_timeout_ms: u64,

    /// Storefront site root (no trailing slash needed)
    #[serde(default = "default_site_root")]
    pub site_root: String,

    /// Product page path below each country segment
    #[serde(default = "default_product_path")]
    pub product_path: String,

    /// Storefronts to scrape, in order
    #[serde(default = "default_countries")]
    pub countries: Vec<Country>,

    /// Plan card selectors
    #[serde(default)]
    pub selectors: PlanSelectors,

    /// Page load timeout in milliseconds (includes request pacing)
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// How long to keep reloading a page whose plan cards are missing
    #[serde(default = "default_selector_timeout_ms")]
    pub selector_timeout_ms: u64,

    /// Pause between reloads while waiting for plan cards
    #[serde(default = "default_selector_poll_ms")]
    pub selector_poll_ms: u64,

    /// Storefronts loaded at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Base delay before each storefront request in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Output format for printed records
    #[serde(default)]
    pub format: OutputFormat,

    /// Dataset publishing target
    #[serde(default)]
    pub publish: PublishConfig,
}

/// Where and how the dataset is committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// HTTPS URL of the target repository
    #[serde(default)]
    pub repo_url: Option<String>,

    /// Token with push access to `repo_url`
    #[serde(default)]
    pub token: Option<Secret>,

    /// Dataset path inside the repository
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Commit author name
    #[serde(default = "default_author_name")]
    pub author_name: String,

    /// Commit author email
    #[serde(default = "default_author_email")]
    pub author_email: String,
}

fn default_base_currency() -> String {
    "CNY".to_string()
}

fn default_rates_url() -> String {
    "https://v6.exchangerate-api.com/v6/{key}/latest/{base}".to_string()
}

fn default_rates_timeout_ms() -> u64 {
    30_000
}

fn default_site_root() -> String {
    "https://www.spotify.com".to_string()
}

fn default_product_path() -> String {
    "premium".to_string()
}

fn default_navigation_timeout_ms() -> u64 {
    45_000
}

fn default_selector_timeout_ms() -> u64 {
    20_000
}

fn default_selector_poll_ms() -> u64 {
    5_000
}

fn default_concurrency() -> usize {
    4
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    1000
}

fn default_output_path() -> String {
    "frontend/spotify_prices.json".to_string()
}

fn default_author_name() -> String {
    "price-bot".to_string()
}

fn default_author_email() -> String {
    "bot@render.com".to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            repo_url: None,
            token: None,
            output_path: default_output_path(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            rates_url: default_rates_url(),
            rates_api_key: None,
            rates_timeout_ms: default_rates_timeout_ms(),
            site_root: default_site_root(),
            product_path: default_product_path(),
            countries: default_countries(),
            selectors: PlanSelectors::default(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            selector_timeout_ms: default_selector_timeout_ms(),
            selector_poll_ms: default_selector_poll_ms(),
            concurrency: default_concurrency(),
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            proxy: None,
            format: OutputFormat::Table,
            publish: PublishConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("spotify-prices").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Some(key) = non_empty_env("EXCHANGE_RATE_API_KEY") {
            self.rates_api_key = Some(Secret::new(key));
        }

        if let Some(token) = non_empty_env("GITHUB_TOKEN") {
            self.publish.token = Some(Secret::new(token));
        }

        if let Some(repo) = non_empty_env("REPO_URL") {
            self.publish.repo_url = Some(repo);
        }

        if let Some(path) = non_empty_env("PRICES_OUTPUT_PATH") {
            self.publish.output_path = path;
        }

        if let Some(base) = non_empty_env("PRICES_BASE_CURRENCY") {
            self.base_currency = base.to_uppercase();
        }

        if let Some(proxy) = non_empty_env("PRICES_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Some(concurrency) = non_empty_env("PRICES_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }

        self
    }

    /// Checks the configuration before any network work starts.
    pub fn validate(&self) -> Result<()> {
        if self.countries.is_empty() {
            anyhow::bail!("No countries configured");
        }

        let mut seen = HashSet::new();
        for country in &self.countries {
            if !country.has_valid_code() {
                anyhow::bail!(
                    "Invalid country code {:?}: expected lowercase letters",
                    country.code
                );
            }
            if !country.has_valid_currency() {
                anyhow::bail!(
                    "Invalid currency {:?} for {}: expected a 3-letter uppercase code",
                    country.currency,
                    country.code
                );
            }
            if !seen.insert(country.code.as_str()) {
                anyhow::bail!("Country {} is configured more than once", country.code);
            }
        }

        if !is_currency_code(&self.base_currency) {
            anyhow::bail!("Invalid base currency {:?}", self.base_currency);
        }

        self.selectors.validate()?;

        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            anyhow::bail!(
                "Concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY,
                self.concurrency
            );
        }

        if self.navigation_timeout_ms == 0
            || self.selector_timeout_ms == 0
            || self.selector_poll_ms == 0
        {
            anyhow::bail!("Timeouts must be greater than zero");
        }

        if !self.rates_url.contains("{base}") {
            warn!("Rate URL has no {{base}} placeholder; base currency is ignored");
        }

        Ok(())
    }

    /// Returns true if both publish settings are present.
    pub fn can_publish(&self) -> bool {
        self.publish.repo_url.is_some() && self.publish.token.is_some()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
