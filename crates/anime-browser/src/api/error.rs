//! Failure taxonomy for upstream calls.

use thiserror::Error;

/// Message shown when the upstream service throttles us
pub const RATE_LIMITED_MESSAGE: &str =
    "You are being rate-limited. Please wait a moment and try again.";

/// Every failure the client can report
///
/// Transport and protocol errors are classified into one of these kinds
/// inside the client and never inspected again past that point.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Superseded by a newer request of the same kind; never shown to users
    #[error("Request cancelled")]
    Cancelled,

    /// Upstream answered HTTP 429
    #[error("{}", RATE_LIMITED_MESSAGE)]
    RateLimited,

    /// Any other failure, with the upstream message when one was provided
    #[error("{0}")]
    UpstreamFailure(String),
}

impl ApiError {
    /// Whether this failure should reach the user at all
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, ApiError::Cancelled)
    }

    /// Whether views should show rate-limit guidance
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(ApiError::RateLimited.to_string(), RATE_LIMITED_MESSAGE);
        assert_eq!(
            ApiError::UpstreamFailure("Resource does not exist".into()).to_string(),
            "Resource does not exist"
        );
    }

    #[test]
    fn test_visibility() {
        assert!(!ApiError::Cancelled.is_user_visible());
        assert!(ApiError::RateLimited.is_user_visible());
        assert!(ApiError::RateLimited.is_rate_limited());
        assert!(!ApiError::UpstreamFailure("x".into()).is_rate_limited());
    }
}
