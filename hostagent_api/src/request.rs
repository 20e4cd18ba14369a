//! Request descriptors handed to [`Client::request`](crate::Client::request).

use std::fmt;
use std::time::Duration;

/// HTTP methods used by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        }
    }
}

/// A single call against the backend.
///
/// `path` is relative to the context's base path. When `parse_json` is set
/// the success body is decoded as JSON, otherwise the raw text is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub path: String,
    pub method: Method,
    pub body: Option<String>,
    pub parse_json: bool,
    /// Overrides the context's default timeout for this call only.
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: None,
            parse_json: false,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Option<String>) -> Self {
        Self {
            body,
            ..Self::new(Method::Post, path)
        }
    }

    /// Decode the success body as JSON.
    pub fn json(mut self) -> Self {
        self.parse_json = true;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// True when a body will be sent (and so a JSON content type attached).
    pub fn has_body(&self) -> bool {
        self.body.as_deref().is_some_and(|b| !b.is_empty())
    }
}
