//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Categories;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Job board endpoints
    #[serde(default)]
    pub site: SiteConfig,

    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Listing markup selectors
    #[serde(default)]
    pub parser: ParserConfig,

    /// Headless browser settings for detail frames
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Which postings to ask for
    #[serde(default)]
    pub filter: FilterConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.site.base_url)
            .map_err(|e| AppError::validation(format!("site.base_url: {e}")))?;
        for (name, path) in [
            ("site.list_path", &self.site.list_path),
            ("site.count_path", &self.site.count_path),
            ("site.detail_path", &self.site.detail_path),
        ] {
            if !path.starts_with('/') {
                return Err(AppError::validation(format!("{name} must start with '/'")));
            }
        }
        if self.site.detail_id_param.trim().is_empty() {
            return Err(AppError::validation("site.detail_id_param is empty"));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.browser.navigation_timeout_secs == 0 {
            return Err(AppError::validation(
                "browser.navigation_timeout_secs must be > 0",
            ));
        }
        for (name, selector) in [
            ("parser.row_selector", &self.parser.row_selector),
            ("parser.emphasis_selector", &self.parser.emphasis_selector),
            ("parser.id_selector", &self.parser.id_selector),
            ("parser.id_attr", &self.parser.id_attr),
            ("parser.date_selector", &self.parser.date_selector),
        ] {
            if selector.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        if self.filter.categories.is_empty() {
            return Err(AppError::validation("filter.categories is empty"));
        }
        if self.browser.frame_names.iter().any(|f| f.trim().is_empty()) {
            return Err(AppError::validation("browser.frame_names has an empty name"));
        }
        Ok(())
    }
}

/// Endpoints of the job board. Immutable once loaded; handed to each fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Scheme and host, without trailing slash
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// AJAX listing fragment endpoint
    #[serde(default = "defaults::list_path")]
    pub list_path: String,

    /// Plain-text count endpoint
    #[serde(default = "defaults::count_path")]
    pub count_path: String,

    /// Posting detail page
    #[serde(default = "defaults::detail_path")]
    pub detail_path: String,

    /// Query parameter carrying the posting id on the detail page
    #[serde(default = "defaults::detail_id_param")]
    pub detail_id_param: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            list_path: defaults::list_path(),
            count_path: defaults::count_path(),
            detail_path: defaults::detail_path(),
            detail_id_param: defaults::detail_id_param(),
        }
    }
}

impl SiteConfig {
    pub fn list_url(&self) -> String {
        self.endpoint(&self.list_path)
    }

    pub fn count_url(&self) -> String {
        self.endpoint(&self.count_path)
    }

    /// Canonical detail-page URL for a posting id.
    pub fn detail_url(&self, id: &str) -> Result<String> {
        let mut url = url::Url::parse(&self.endpoint(&self.detail_path))?;
        url.query_pairs_mut().append_pair(&self.detail_id_param, id);
        Ok(url.to_string())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Listing pages in flight at once; 1 fetches strictly one after another
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// What to do with a posting container that does not hold a whole posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MismatchPolicy {
    /// Abort the parse with `AppError::StructuralMismatch`
    #[default]
    Fail,
    /// Log and drop the container
    Skip,
}

/// CSS selectors for the listing fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    /// One element per posting
    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    /// Company name then posting title, inside a row
    #[serde(default = "defaults::emphasis_selector")]
    pub emphasis_selector: String,

    /// Element carrying the posting id
    #[serde(default = "defaults::id_selector")]
    pub id_selector: String,

    /// Attribute holding `<id>|...`
    #[serde(default = "defaults::id_attr")]
    pub id_attr: String,

    /// Registration/modification date element
    #[serde(default = "defaults::date_selector")]
    pub date_selector: String,

    #[serde(default)]
    pub on_mismatch: MismatchPolicy,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            row_selector: defaults::row_selector(),
            emphasis_selector: defaults::emphasis_selector(),
            id_selector: defaults::id_selector(),
            id_attr: defaults::id_attr(),
            date_selector: defaults::date_selector(),
            on_mismatch: MismatchPolicy::default(),
        }
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run Chrome without a window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Upper bound for one navigation, including the idle wait
    #[serde(default = "defaults::navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Navigation counts as settled at or below this many open requests
    #[serde(default = "defaults::idle_max_inflight")]
    pub idle_max_inflight: usize,

    /// How long the request count must stay low
    #[serde(default = "defaults::idle_settle")]
    pub idle_settle_ms: u64,

    /// Iframe names to extract from a detail page
    #[serde(default)]
    pub frame_names: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: defaults::headless(),
            navigation_timeout_secs: defaults::navigation_timeout(),
            idle_max_inflight: defaults::idle_max_inflight(),
            idle_settle_ms: defaults::idle_settle(),
            frame_names: Vec::new(),
        }
    }
}

/// Posting filter sent with every listing request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Site-defined job-function codes
    #[serde(default = "defaults::categories")]
    pub categories: Categories,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            categories: defaults::categories(),
        }
    }
}

mod defaults {
    use crate::models::Categories;

    // Site defaults
    pub fn base_url() -> String {
        "https://www.gamejob.co.kr".into()
    }
    pub fn list_path() -> String {
        "/Recruit/_GI_Job_List/".into()
    }
    pub fn count_path() -> String {
        "/Recruit/_SearchCount/".into()
    }
    pub fn detail_path() -> String {
        "/List_GI/GIB_Read.asp".into()
    }
    pub fn detail_id_param() -> String {
        "GI_No".into()
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobcrawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        1
    }

    // Parser defaults
    pub fn row_selector() -> String {
        "tr".into()
    }
    pub fn emphasis_selector() -> String {
        "strong".into()
    }
    pub fn id_selector() -> String {
        "button.btnScrap".into()
    }
    pub fn id_attr() -> String {
        "data-value".into()
    }
    pub fn date_selector() -> String {
        "span.modifyDate".into()
    }

    // Browser defaults
    pub fn headless() -> bool {
        true
    }
    pub fn navigation_timeout() -> u64 {
        30
    }
    pub fn idle_max_inflight() -> usize {
        2
    }
    pub fn idle_settle() -> u64 {
        500
    }

    // Filter defaults: 16 is the game-programming duty code
    pub fn categories() -> Categories {
        Categories::from(vec![16])
    }
}
