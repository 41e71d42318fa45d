//! Anime browser library.
//!
//! Browse the top anime list, search by keyword and view details, backed by
//! the Jikan API v4. All requests are paced through one queue, superseded
//! searches are cancelled, and the results are exposed as snapshots.

pub mod api;
pub mod store;
pub mod view;

pub use api::{AnimeSource, ApiError, Item, JikanClient, ListMode, Page, RateLimiter};
pub use store::{AnimeStore, RequestStatus, Resolution, StateSnapshot};
