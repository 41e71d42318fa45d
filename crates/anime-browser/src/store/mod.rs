//! State container shared by the views.

pub mod coordinator;
pub mod snapshot;

pub use coordinator::{AnimeStore, Resolution};
pub use snapshot::{Action, RequestStatus, StateSnapshot};
