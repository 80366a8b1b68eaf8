use crate::config::AppConfig;
use crate::error::{FetchError, SearchError};
use crate::http;
use crate::search::model::{parse_search_page, Photo};

/// Anything that can answer a photo query.
pub trait PhotoSource: Send + Sync {
    fn search(&self, query: &str, per_page: u32) -> Result<Vec<Photo>, SearchError>;
}

pub struct UnsplashClient {
    agent: ureq::Agent,
    base_url: String,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            agent: http::agent(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_key: config.access_key.clone().unwrap_or_default(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/search/photos", self.base_url)
    }
}

impl PhotoSource for UnsplashClient {
    fn search(&self, query: &str, per_page: u32) -> Result<Vec<Photo>, SearchError> {
        let url = self.endpoint();
        tracing::debug!("Searching {:?} (per_page={})", query, per_page);
        let response = self
            .agent
            .get(&url)
            .query("query", query)
            .query("per_page", &per_page.to_string())
            .set("Authorization", &format!("Client-ID {}", self.access_key))
            .set("Accept-Version", "v1")
            .call()
            .map_err(|e| FetchError::from_ureq(&url, e))?;

        let body = http::read_limited(response.into_reader(), http::MAX_BODY_BYTES)?;
        let page = parse_search_page(&body)?;
        tracing::info!(
            "Search {:?} returned {} of {} results",
            query,
            page.results.len(),
            page.total
        );
        Ok(page.results)
    }
}
