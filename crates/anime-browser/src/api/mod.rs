//! Jikan API v4 client implementation.
//!
//! This module provides a paced client for the Jikan API (MyAnimeList
//! unofficial API) that cancels superseded searches and reduces every
//! failure to an [`ApiError`].

pub mod client;
pub mod error;
pub mod rate_limiter;
pub mod types;

pub use client::JikanClient;
pub use error::{ApiError, ApiResult, RATE_LIMITED_MESSAGE};
pub use rate_limiter::RateLimiter;
pub use types::*;

use async_trait::async_trait;

/// Where the store gets its data from
#[async_trait]
pub trait AnimeSource: Send + Sync {
    /// Fetch one page of search results or of the top list
    async fn fetch_list(&self, mode: &ListMode) -> ApiResult<Page>;

    /// Fetch a single record by MAL ID
    async fn fetch_detail(&self, mal_id: u32) -> ApiResult<Item>;
}
