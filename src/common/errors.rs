use serde::Serialize;
use thiserror::Error;

/// Typed outcome of a resolution attempt.
///
/// Every pipeline component returns one of these instead of panicking;
/// the REST layer is the only place they are turned into HTTP responses.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The raw input matched no recognized identifier grammar rule.
    #[error("unrecognized identifier: {0}")]
    InvalidIdentifier(String),

    /// The rate limiter denied the upstream call.
    #[error("rate limited for upstream '{0}'")]
    RateLimited(String),

    /// A provider or the extractor returned a non-2xx status or a
    /// network-level failure.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// An outbound call exceeded its deadline.
    #[error("upstream call timed out")]
    Timeout,

    /// The extraction crawl completed without locating a manifest.
    #[error("no playable source found for '{0}'")]
    NoSourceFound(String),
}

impl ResolveError {
    /// HTTP status the REST layer maps this error to.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidIdentifier(_) => 400,
            Self::RateLimited(_) => 429,
            Self::NoSourceFound(_) => 404,
            Self::UpstreamUnavailable(_) => 502,
            Self::Timeout => 504,
        }
    }
}

/// JSON error response body.
///
/// Always carries a stable `error` field; internal failures never leak a
/// stack trace or upstream HTML to the caller.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
    /// HTTP status code.
    pub status: u16,
    /// Human-readable error message.
    pub error: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            status,
            error: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }
}

impl From<&ResolveError> for ApiError {
    fn from(err: &ResolveError) -> Self {
        Self::new(err.status(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ResolveError::InvalidIdentifier("abc".into()).status(), 400);
        assert_eq!(ResolveError::RateLimited("dood".into()).status(), 429);
        assert_eq!(ResolveError::NoSourceFound("x".into()).status(), 404);
        assert_eq!(ResolveError::UpstreamUnavailable("503".into()).status(), 502);
        assert_eq!(ResolveError::Timeout.status(), 504);
    }

    #[test]
    fn api_error_carries_stable_error_field() {
        let err = ResolveError::InvalidIdentifier("abc".into());
        let body = serde_json::to_value(ApiError::from(&err)).unwrap();
        assert_eq!(body["status"], 400);
        assert!(body["error"].as_str().unwrap().contains("abc"));
    }
}
