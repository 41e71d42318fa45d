//! Request coordinator.
//!
//! Turns intents into upstream calls and folds their outcomes into the
//! published [`StateSnapshot`]. Every mutation goes through the watch
//! channel's lock, so the search staleness check and the state update
//! it guards happen as one step.

use super::snapshot::{Action, StateSnapshot};
use crate::api::{AnimeSource, ApiError, ApiResult, ListMode, Page};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// How an intent ended, from the store's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The outcome was folded into the snapshot
    Applied,
    /// Superseded or cancelled; the snapshot was left alone
    Discarded,
}

/// Single-writer state container for the browser views
pub struct AnimeStore {
    source: Arc<dyn AnimeSource>,
    state: watch::Sender<StateSnapshot>,
    /// Bumped by every search intent; only the latest may resolve
    search_generation: AtomicU64,
}

impl AnimeStore {
    /// Create a store with default state
    pub fn new(source: Arc<dyn AnimeSource>) -> Self {
        let (state, _) = watch::channel(StateSnapshot::default());
        Self {
            source,
            state,
            search_generation: AtomicU64::new(0),
        }
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every published snapshot; dropping the receiver unsubscribes
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: Action) -> bool {
        self.state.send_if_modified(|state| state.apply(action))
    }

    /// Search for `query`, superseding any earlier search
    ///
    /// Searches must be issued one after another: the generation bumped here
    /// and the client's cancellation slot are ordered by call order.
    pub async fn issue_search(&self, query: &str, page: u32) -> Resolution {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.apply(Action::ListPending);
        });
        info!(query = %query, page = page, generation = generation, "Search issued");

        let result = self.source.fetch_list(&ListMode::search(query, page)).await;
        self.resolve_list(result, page, Some(generation))
    }

    /// Show one page of the top list
    pub async fn issue_top_list(&self, page: u32) -> Resolution {
        self.dispatch(Action::ListPending);
        info!(page = page, "Top list issued");

        let result = self.source.fetch_list(&ListMode::top(page)).await;
        self.resolve_list(result, page, None)
    }

    /// Load a single record into `selected_item`
    pub async fn issue_detail(&self, mal_id: u32) -> Resolution {
        self.dispatch(Action::DetailPending);
        info!(mal_id = mal_id, "Detail issued");

        let action = match self.source.fetch_detail(mal_id).await {
            Ok(item) => Action::DetailFulfilled(item),
            Err(error) => {
                log_failure(&error, "Detail request failed");
                Action::DetailFailed(error)
            }
        };

        if self.dispatch(action) {
            Resolution::Applied
        } else {
            Resolution::Discarded
        }
    }

    fn resolve_list(
        &self,
        result: ApiResult<Page>,
        page: u32,
        search_generation: Option<u64>,
    ) -> Resolution {
        let action = match result {
            Ok(list) => {
                debug!(
                    page = page,
                    items = list.items.len(),
                    total_pages = list.total_pages,
                    "List resolved"
                );
                Action::ListFulfilled {
                    page: list,
                    current_page: page,
                }
            }
            Err(error) => {
                log_failure(&error, "List request failed");
                Action::ListFailed(error)
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if let Some(generation) = search_generation {
                let latest = self.search_generation.load(Ordering::SeqCst);
                if generation != latest {
                    debug!(
                        generation = generation,
                        latest = latest,
                        "Discarding stale search outcome"
                    );
                    return false;
                }
            }
            state.apply(action)
        });

        if applied {
            Resolution::Applied
        } else {
            Resolution::Discarded
        }
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.dispatch(Action::SetQuery(query.into()));
    }

    pub fn set_page(&self, page: u32) {
        self.dispatch(Action::SetPage(page));
    }

    pub fn clear_error(&self) {
        self.dispatch(Action::ClearError);
    }

    /// Forget the selected record when the detail view goes away
    pub fn clear_detail(&self) {
        self.dispatch(Action::ClearDetail);
    }

    /// Load the first top list page unless a list was already shown
    pub async fn ensure_initial_list(&self) -> Option<Resolution> {
        if self.state.borrow().has_searched {
            return None;
        }
        Some(self.issue_top_list(1).await)
    }

    /// Store a new query and show its first page
    ///
    /// A blank query falls back to the top list.
    pub async fn submit_query(&self, query: &str) -> Resolution {
        self.set_query(query);
        self.set_page(1);

        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.issue_top_list(1).await
        } else {
            self.issue_search(trimmed, 1).await
        }
    }

    /// Move to another page of whatever list is being shown
    pub async fn go_to_page(&self, page: u32) -> Resolution {
        self.set_page(page);
        self.reissue_list().await
    }

    /// Clear the error and repeat the current list request
    pub async fn retry_list(&self) -> Resolution {
        self.clear_error();
        self.reissue_list().await
    }

    /// Repeat a failed detail request
    pub async fn retry_detail(&self, mal_id: u32) -> Resolution {
        self.issue_detail(mal_id).await
    }

    async fn reissue_list(&self) -> Resolution {
        let (query, page) = {
            let state = self.state.borrow();
            (state.query.trim().to_string(), state.current_page)
        };

        if query.is_empty() {
            self.issue_top_list(page).await
        } else {
            self.issue_search(&query, page).await
        }
    }
}

fn log_failure(error: &ApiError, context: &str) {
    if !error.is_user_visible() {
        debug!("{}: cancelled", context);
    } else if error.is_rate_limited() {
        warn!(error = %error, "{}: rate limited", context);
    } else {
        warn!(error = %error, "{}", context);
    }
}
