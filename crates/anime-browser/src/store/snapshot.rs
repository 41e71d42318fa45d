//! Observable browser state and its transition table.

use crate::api::{ApiError, Item, Page};

/// Progress of one request category (list or detail)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestStatus {
    #[default]
    Idle,
    Pending,
    Fulfilled,
    Failed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Pending => "pending",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can change the snapshot
#[derive(Debug, Clone)]
pub enum Action {
    ListPending,
    ListFulfilled { page: Page, current_page: u32 },
    ListFailed(ApiError),
    DetailPending,
    DetailFulfilled(Item),
    DetailFailed(ApiError),
    SetQuery(String),
    SetPage(u32),
    ClearError,
    ClearDetail,
}

/// What views render from
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// Current list page, in upstream order
    pub results: Vec<Item>,
    pub selected_item: Option<Item>,
    pub loading: bool,
    pub error: Option<ApiError>,
    /// 1-based
    pub current_page: u32,
    /// Always at least 1
    pub total_pages: u32,
    pub query: String,
    /// Set once any list request has succeeded
    pub has_searched: bool,
    pub list_status: RequestStatus,
    pub detail_status: RequestStatus,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            results: Vec::new(),
            selected_item: None,
            loading: false,
            error: None,
            current_page: 1,
            total_pages: 1,
            query: String::new(),
            has_searched: false,
            list_status: RequestStatus::Idle,
            detail_status: RequestStatus::Idle,
        }
    }
}

impl StateSnapshot {
    /// Apply one action; returns false when nothing changed
    ///
    /// Cancelled failures are absorbed here and never touch the state.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::ListFailed(ApiError::Cancelled) | Action::DetailFailed(ApiError::Cancelled) => {
                return false;
            }
            Action::ListPending => {
                self.loading = true;
                self.error = None;
                self.list_status = RequestStatus::Pending;
            }
            Action::ListFulfilled { page, current_page } => {
                self.loading = false;
                self.results = page.items;
                self.total_pages = page.total_pages.max(1);
                self.current_page = current_page.max(1);
                self.has_searched = true;
                self.list_status = RequestStatus::Fulfilled;
            }
            Action::ListFailed(error) => {
                self.loading = false;
                self.error = Some(error);
                self.list_status = RequestStatus::Failed;
            }
            Action::DetailPending => {
                self.loading = true;
                self.error = None;
                self.detail_status = RequestStatus::Pending;
            }
            Action::DetailFulfilled(item) => {
                self.loading = false;
                self.selected_item = Some(item);
                self.detail_status = RequestStatus::Fulfilled;
            }
            Action::DetailFailed(error) => {
                self.loading = false;
                self.error = Some(error);
                self.detail_status = RequestStatus::Failed;
            }
            Action::SetQuery(query) => {
                if self.query == query {
                    return false;
                }
                self.query = query;
            }
            Action::SetPage(page) => {
                let page = page.max(1);
                if self.current_page == page {
                    return false;
                }
                self.current_page = page;
            }
            Action::ClearError => {
                if self.error.is_none() {
                    return false;
                }
                self.error = None;
            }
            Action::ClearDetail => {
                if self.selected_item.is_none() {
                    return false;
                }
                self.selected_item = None;
            }
        }
        true
    }

    /// User-facing error text, if any
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    /// Whether the rate-limit guidance should be shown
    pub fn is_rate_limited(&self) -> bool {
        self.error.as_ref().is_some_and(ApiError::is_rate_limited)
    }
}
