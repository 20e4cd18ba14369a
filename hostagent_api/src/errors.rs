//! Error types for the request wrapper.

use crate::request::Method;

/// Message carried by [`Error::TimedOut`]. Callers can compare against it
/// instead of matching on the variant.
pub const TIMED_OUT_MESSAGE: &str = "request timed out";

/// Message carried by [`Error::LoggedOut`].
pub const LOGGED_OUT_MESSAGE: &str = "logged out";

/// Every way a wrapped request can fail.
///
/// The `Display` text is the human-readable message surfaced to users; the
/// wrapper never returns these across its boundary as `Err`, only inside
/// [`Outcome::Failure`](crate::Outcome::Failure).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// DNS failure, refused connection, reset stream, and similar.
    #[error("{0}")]
    Transport(String),
    /// The per-call deadline expired and the request was aborted.
    #[error("request timed out")]
    TimedOut,
    /// The backend answered 403; the caller must re-authenticate.
    #[error("logged out")]
    LoggedOut,
    /// Any other non-2xx status.
    #[error("{method} {path} failed: {status} {status_text}: {body}")]
    Status {
        method: Method,
        path: String,
        status: u16,
        status_text: String,
        body: String,
    },
    /// A structured body was requested but the response did not decode.
    #[error("failed to parse response: {0}")]
    Parse(String),
    /// The origin and base path could not be combined into a URL.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl Error {
    /// HTTP status code for status-derived failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::LoggedOut => Some(403),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_match_display() {
        assert_eq!(Error::TimedOut.to_string(), TIMED_OUT_MESSAGE);
        assert_eq!(Error::LoggedOut.to_string(), LOGGED_OUT_MESSAGE);
    }

    #[test]
    fn status_message_embeds_request_details() {
        let err = Error::Status {
            method: Method::Post,
            path: "api/config".to_string(),
            status: 500,
            status_text: "Internal Server Error".to_string(),
            body: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "POST api/config failed: 500 Internal Server Error: boom"
        );
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn transport_message_is_passed_through() {
        let err = Error::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.status(), None);
    }
}
