//! Rate-limit reporting for failed remote calls
//!
//! Advisory only: the reset instant is logged, nothing is retried.

use chrono::{DateTime, Local, TimeZone};
use reqwest::header::HeaderMap;
use tracing::warn;

use crate::error::Error;

/// Header carrying the epoch-seconds instant at which the limit resets
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Decode the rate-limit reset instant in local time
pub fn reset_time(headers: &HeaderMap) -> Option<DateTime<Local>> {
    let raw = headers.get(RESET_HEADER)?.to_str().ok()?;
    let secs = raw.trim().parse::<i64>().ok()?;
    Local.timestamp_opt(secs, 0).single()
}

/// Log when the caller may try again, if the failure says so
pub fn report(err: &Error) {
    if let Some(at) = err.headers().and_then(reset_time) {
        warn!(retry_at = %at, "Please try after: {}", at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use tracing_test::traced_test;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(RESET_HEADER, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_reset_time_decodes_epoch_seconds() {
        let at = reset_time(&headers("1700000000")).unwrap();
        assert_eq!(at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_reset_time_missing_or_garbage() {
        assert!(reset_time(&HeaderMap::new()).is_none());
        assert!(reset_time(&headers("soon")).is_none());
    }

    #[test]
    #[traced_test]
    fn test_report_logs_reset_time() {
        report(&Error::Transport(TransportError {
            status: None,
            headers: Some(headers("1700000000")),
            message: "boom".to_string(),
        }));
        let at = Local.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(logs_contain(&format!("Please try after: {}", at)));
    }

    #[test]
    #[traced_test]
    fn test_report_silent_without_reset_header() {
        report(&Error::Config("x".to_string()));
        report(&Error::Transport(TransportError {
            status: None,
            headers: Some(HeaderMap::new()),
            message: "boom".to_string(),
        }));
        assert!(!logs_contain("Please try after"));
    }
}
