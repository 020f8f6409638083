use crate::config::SearchConfig;
use crate::error::SearchError;
use log::{error, info, warn};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::thread;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// One search hit as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResultItem {
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<ResultItem>,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub endpoint: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_attempts: 3,
            retry_delay: Duration::from_secs(3),
            timeout: Duration::from_secs(15),
        }
    }
}

/// Source of result pages for the collection loop.
///
/// Implementations never fail: exhaustion, quota and network trouble all
/// surface as an empty page, with the reason logged.
pub trait SearchProvider {
    fn search(&self, query: &str, start: u32) -> Vec<ResultItem>;
}

pub struct SearchEngine {
    client: Client,
    config: SearchConfig,
    settings: SearchSettings,
}

impl SearchEngine {
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        Self::with_settings(config, SearchSettings::default())
    }

    pub fn with_settings(
        config: SearchConfig,
        settings: SearchSettings,
    ) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("linkedin-lead-extractor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(SearchEngine {
            client,
            config,
            settings,
        })
    }

    /// A single request, classified. `start` is the 1-based result offset.
    pub fn try_search(&self, query: &str, start: u32) -> Result<Vec<ResultItem>, SearchError> {
        let start = start.to_string();
        let resp = self
            .client
            .get(&self.settings.endpoint)
            .query(&[
                ("q", query),
                ("key", self.config.api_key.as_str()),
                ("cx", self.config.search_engine_id.as_str()),
                ("start", start.as_str()),
            ])
            .send()?;

        let status = resp.status();
        let body = resp.text()?;

        if status == StatusCode::OK {
            let parsed: SearchResponse = serde_json::from_str(&body).map_err(SearchError::Decode)?;
            return Ok(parsed.items);
        }

        if body.to_lowercase().contains("quota") {
            return Err(SearchError::QuotaExceeded);
        }

        Err(SearchError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

impl SearchProvider for SearchEngine {
    fn search(&self, query: &str, start: u32) -> Vec<ResultItem> {
        let attempts = self.settings.max_attempts.max(1);

        for attempt in 1..=attempts {
            match self.try_search(query, start) {
                Ok(items) => {
                    info!("Search returned {} results (start={})", items.len(), start);
                    return items;
                }
                Err(SearchError::QuotaExceeded) => {
                    error!("Search API quota limit reached. Cannot continue.");
                    return Vec::new();
                }
                Err(e) if e.is_retriable() => {
                    warn!("Search attempt {}/{} failed: {}", attempt, attempts, e);
                }
                Err(e) => {
                    error!("Search failed: {}", e);
                    return Vec::new();
                }
            }

            if attempt < attempts {
                info!("Retrying in {:?}...", self.settings.retry_delay);
                thread::sleep(self.settings.retry_delay);
            }
        }

        error!("Failed to fetch results after {} attempts.", attempts);
        Vec::new()
    }
}
