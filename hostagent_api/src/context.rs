//! Per-call request context: where the backend lives and who is asking.

use std::time::Duration;

use url::Url;

use crate::Error;

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Header carrying the API key on `api/` routes.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Values every request reads at call time.
///
/// The context is passed explicitly to the wrapper rather than held in
/// process-wide state, so tests can build one per case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Scheme, host and port of the backend. Any path on it is ignored.
    pub origin: Url,
    /// Prefix under which the backend serves every route.
    pub base_path: String,
    /// Active UI locale, sent as `Accept-Language`.
    pub locale: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl RequestContext {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            base_path: "/".to_string(),
            locale: "en".to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Parses `origin` and builds a context with default settings.
    pub fn parse(origin: &str) -> Result<Self, Error> {
        let origin = Url::parse(origin).map_err(|e| {
            tracing::error!("Invalid origin {}: {}", origin, e);
            Error::InvalidUrl(format!("{}: {}", origin, e))
        })?;
        Ok(Self::new(origin))
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for `path` under this context's base path.
    pub fn url_for(&self, path: &str) -> Result<Url, Error> {
        let joined = join_path(&self.base_path, path);
        let absolute = if joined.starts_with('/') {
            joined
        } else {
            format!("/{}", joined)
        };
        let url = self
            .origin
            .join(&absolute)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", absolute, e)))?;
        if !same_origin(&url, &self.origin) {
            tracing::error!("Refusing {}: resolves outside {}", absolute, self.origin);
            return Err(Error::InvalidUrl(format!(
                "{} resolves outside {}",
                absolute, self.origin
            )));
        }
        Ok(url)
    }
}

fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Joins `base` and `path`, trimming exactly one `/` from the end of `base`
/// and the start of `path`.
pub fn join_path(base: &str, path: &str) -> String {
    let base = base.strip_suffix('/').unwrap_or(base);
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", base, path)
}

/// Which family of backend routes a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// `api/...`: authenticated with the API key header.
    Api,
    /// `ui/...`: authenticated with the session cookie only.
    Ui,
    Other,
}

impl RouteKind {
    pub fn of(path: &str) -> Self {
        let path = path.strip_prefix('/').unwrap_or(path);
        if path.starts_with("api/") {
            Self::Api
        } else if path.starts_with("ui/") {
            Self::Ui
        } else {
            Self::Other
        }
    }
}
