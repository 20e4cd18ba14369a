//! Error types for the library layer.

use std::fmt;

use crate::preferences::PreferencesError;
use crate::reload::RELOAD_TIMED_OUT_MESSAGE;

/// Errors produced by the library layer, wrapping request failures and
/// adding reload, preference and input validation failures.
#[derive(Debug)]
pub enum HostAgentError {
    /// A wrapped request failed for any reason other than a 403.
    Api(hostagent_api::Error),
    /// The backend answered 403; the user must log in again.
    LoggedOut,
    /// The reload poller used up every attempt without a healthy probe.
    ReloadTimedOut,
    /// Reading or writing the preferences file failed.
    Preferences(PreferencesError),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl HostAgentError {
    pub fn is_logged_out(&self) -> bool {
        matches!(self, Self::LoggedOut)
    }
}

impl fmt::Display for HostAgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "{}", e),
            Self::LoggedOut => write!(f, "{}", hostagent_api::LOGGED_OUT_MESSAGE),
            Self::ReloadTimedOut => write!(f, "{}", RELOAD_TIMED_OUT_MESSAGE),
            Self::Preferences(e) => write!(f, "Preferences error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for HostAgentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Preferences(e) => Some(e),
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<hostagent_api::Error> for HostAgentError {
    fn from(e: hostagent_api::Error) -> Self {
        match e {
            hostagent_api::Error::LoggedOut => Self::LoggedOut,
            other => Self::Api(other),
        }
    }
}

impl From<PreferencesError> for HostAgentError {
    fn from(e: PreferencesError) -> Self {
        Self::Preferences(e)
    }
}

impl From<serde_json::Error> for HostAgentError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
