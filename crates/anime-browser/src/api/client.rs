//! Jikan API client with request pacing and single-flight search.

use super::error::{ApiError, ApiResult};
use super::rate_limiter::RateLimiter;
use super::types::*;
use super::AnimeSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::ApiConfig;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const SEARCH_FAILED: &str = "Failed to fetch anime";
const TOP_FAILED: &str = "Failed to fetch top anime";
const DETAIL_FAILED: &str = "Failed to fetch anime details";
const TIMED_OUT: &str = "Request timed out";

/// The search currently allowed to resolve
#[derive(Debug, Default)]
struct SearchSlot {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Jikan API v4 client
pub struct JikanClient {
    /// HTTP client
    client: Client,
    /// Base URL for Jikan API
    base_url: String,
    /// Items per list page
    page_size: u32,
    /// Send `sfw=true` with searches
    sfw: bool,
    /// Pacing queue shared by every call
    rate_limiter: Arc<RateLimiter>,
    /// In-flight search token
    search: Mutex<SearchSlot>,
}

impl JikanClient {
    /// Create a new Jikan client with its own rate limiter
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let limiter = RateLimiter::new(Duration::from_millis(config.min_interval_ms));
        Self::with_rate_limiter(config, Arc::new(limiter))
    }

    /// Create a client that paces through an existing limiter
    pub fn with_rate_limiter(config: &ApiConfig, rate_limiter: Arc<RateLimiter>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size,
            sfw: config.sfw,
            rate_limiter,
            search: Mutex::new(SearchSlot::default()),
        })
    }

    /// Shared pacing queue
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// Make a paced GET request and classify every failure
    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
        fallback: &str,
    ) -> ApiResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);

        self.rate_limiter.acquire().await;
        debug!(url = %url, query = ?query, "Making API request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| classify_transport(&url, &e, fallback))?;

        let status = response.status();

        if status.is_success() {
            let data = response
                .json::<T>()
                .await
                .map_err(|e| classify_transport(&url, &e, fallback))?;
            debug!(url = %url, "Request successful");
            return Ok(data);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(url = %url, "Rate limited by server");
            return Err(ApiError::RateLimited);
        }

        let body = response.text().await.unwrap_or_default();
        let message = upstream_message(&body).unwrap_or_else(|| fallback.to_string());

        warn!(
            url = %url,
            status = %status,
            error = %message,
            "Request failed"
        );

        Err(ApiError::UpstreamFailure(message))
    }

    /// Cancel any outstanding search and register a new one
    fn begin_search(&self) -> (u64, CancellationToken) {
        let mut slot = self.search.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = slot.token.take() {
            debug!(generation = slot.generation, "Cancelling superseded search");
            previous.cancel();
        }

        slot.generation += 1;
        let token = CancellationToken::new();
        slot.token = Some(token.clone());
        (slot.generation, token)
    }

    fn finish_search(&self, generation: u64) {
        let mut slot = self.search.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.generation == generation {
            slot.token = None;
        }
    }

    /// Whether a search is currently outstanding
    pub fn search_in_flight(&self) -> bool {
        self.search
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .token
            .is_some()
    }

    async fn search(&self, query: &str, page: u32) -> ApiResult<Page> {
        let (generation, token) = self.begin_search();
        info!(query = %query, page = page, generation = generation, "Searching anime");

        let mut params = vec![
            ("q", query.to_string()),
            ("page", page.to_string()),
        ];
        if self.sfw {
            params.push(("sfw", "true".to_string()));
        }
        params.push(("limit", self.page_size.to_string()));

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ApiError::Cancelled),
            result = self.get::<ListResponse>("/anime", &params, SEARCH_FAILED) => result,
        };

        // A newer search may have been issued while this response was in transit
        let result = if token.is_cancelled() {
            Err(ApiError::Cancelled)
        } else {
            result
        };

        if matches!(result, Err(ApiError::Cancelled)) {
            debug!(query = %query, generation = generation, "Search superseded, discarding");
        }

        self.finish_search(generation);
        result.map(Page::from)
    }

    async fn top(&self, page: u32) -> ApiResult<Page> {
        info!(page = page, "Fetching top anime");
        let params = [
            ("page", page.to_string()),
            ("limit", self.page_size.to_string()),
        ];
        self.get::<ListResponse>("/top/anime", &params, TOP_FAILED)
            .await
            .map(Page::from)
    }

    /// Fetch a page of search results or of the top list
    ///
    /// A new search cancels the previous one, which then resolves to
    /// [`ApiError::Cancelled`]. Top list calls are never cancelled.
    pub async fn fetch_list(&self, mode: &ListMode) -> ApiResult<Page> {
        debug!(search = mode.is_search(), page = mode.page(), "Fetching list");
        match mode {
            ListMode::Search { query, page } => self.search(query, *page).await,
            ListMode::TopList { page } => self.top(*page).await,
        }
    }

    /// Fetch full anime details by MAL ID
    pub async fn fetch_detail(&self, mal_id: u32) -> ApiResult<Item> {
        info!(mal_id = mal_id, "Fetching anime details");
        let response: DetailResponse = self
            .get(&format!("/anime/{}", mal_id), &[], DETAIL_FAILED)
            .await?;
        Ok(response.data)
    }

    /// First `count` entries of the top list, for the home page strip
    pub async fn fetch_featured(&self, count: usize) -> ApiResult<Vec<Item>> {
        let mut page = self.top(1).await?;
        page.items.truncate(count);
        Ok(page.items)
    }
}

#[async_trait]
impl AnimeSource for JikanClient {
    async fn fetch_list(&self, mode: &ListMode) -> ApiResult<Page> {
        JikanClient::fetch_list(self, mode).await
    }

    async fn fetch_detail(&self, mal_id: u32) -> ApiResult<Item> {
        JikanClient::fetch_detail(self, mal_id).await
    }
}

/// Map a reqwest error (connect, timeout, body decode) to a failure kind
fn classify_transport(url: &str, error: &reqwest::Error, fallback: &str) -> ApiError {
    if error.is_timeout() {
        warn!(url = %url, error = %error, "Request timed out");
        return ApiError::UpstreamFailure(TIMED_OUT.to_string());
    }
    if error.status() == Some(StatusCode::TOO_MANY_REQUESTS) {
        return ApiError::RateLimited;
    }
    warn!(url = %url, error = %error, "Request error");
    ApiError::UpstreamFailure(fallback.to_string())
}

/// Extract the `message` field of a Jikan error body
fn upstream_message(body: &str) -> Option<String> {
    serde_json::from_str::<UpstreamErrorBody>(body)
        .ok()
        .and_then(|error| error.message)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ApiConfig {
        ApiConfig {
            min_interval_ms: 10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = JikanClient::new(&config()).unwrap();
        assert_eq!(client.base_url, "https://api.jikan.moe/v4");
        assert_eq!(client.rate_limiter().min_interval(), Duration::from_millis(10));
        assert!(!client.search_in_flight());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ApiConfig {
            base_url: "http://localhost:8080/v4/".to_string(),
            ..config()
        };
        let client = JikanClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080/v4");
    }

    #[test]
    fn test_begin_search_cancels_previous() {
        let client = JikanClient::new(&config()).unwrap();

        let (first_generation, first) = client.begin_search();
        let (second_generation, second) = client.begin_search();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second_generation > first_generation);

        // Finishing the stale search must not clear the live one
        client.finish_search(first_generation);
        assert!(client.search_in_flight());

        client.finish_search(second_generation);
        assert!(!client.search_in_flight());
    }

    #[test]
    fn test_upstream_message() {
        let body = r#"{"status":404,"type":"BadResponseException","message":"Resource does not exist","error":"404 on ..."}"#;
        assert_eq!(upstream_message(body).as_deref(), Some("Resource does not exist"));
        assert_eq!(upstream_message(r#"{"status":500,"message":"  "}"#), None);
        assert_eq!(upstream_message("<html>Bad Gateway</html>"), None);
        assert_eq!(upstream_message(""), None);
    }
}
