//! The uniform result of a wrapped request.

use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::Error;

/// Success payload: decoded JSON or raw text, as the caller asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }
}

/// Outcome of one request. Every failure path of the wrapper lands in
/// `Failure`; nothing is raised past it.
///
/// Serialises to `{"ok": bool, "body": ...}` where a failure's body is its
/// message.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(ResponseBody),
    Failure(Error),
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn body(&self) -> Option<&ResponseBody> {
        match self {
            Self::Success(b) => Some(b),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    /// Failure message, if this is a failure.
    pub fn message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }

    /// The backend answered 403.
    pub fn is_logged_out(&self) -> bool {
        matches!(self, Self::Failure(Error::LoggedOut))
    }

    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::Failure(Error::TimedOut))
    }

    pub fn into_result(self) -> Result<ResponseBody, Error> {
        match self {
            Self::Success(b) => Ok(b),
            Self::Failure(e) => Err(e),
        }
    }

    /// Decodes a successful structured body into `T`.
    ///
    /// A text body is decoded as JSON too, so callers that asked for text
    /// can still opt in afterwards.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        match self.into_result()? {
            ResponseBody::Json(v) => {
                serde_json::from_value(v).map_err(|e| Error::Parse(e.to_string()))
            }
            ResponseBody::Text(t) => {
                serde_json::from_str(&t).map_err(|e| Error::Parse(e.to_string()))
            }
        }
    }
}

impl From<Result<ResponseBody, Error>> for Outcome {
    fn from(r: Result<ResponseBody, Error>) -> Self {
        match r {
            Ok(b) => Self::Success(b),
            Err(e) => Self::Failure(e),
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Outcome", 2)?;
        s.serialize_field("ok", &self.is_ok())?;
        match self {
            Self::Success(body) => s.serialize_field("body", body)?,
            Self::Failure(err) => s.serialize_field("body", &err.to_string())?,
        }
        s.end()
    }
}
