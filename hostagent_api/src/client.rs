//! HTTP request wrapper for the host agent's UI and API routes.

use std::error::Error as _;

use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::{
    context::{RequestContext, RouteKind, API_KEY_HEADER},
    outcome::{Outcome, ResponseBody},
    request::Request,
    Error,
};

/// Path of the liveness endpoint, relative to the base path.
pub const PING_PATH: &str = "ui/ping";

/// Longest response body kept in a status failure message.
const MAX_BODY_IN_MESSAGE: usize = 2000;

/// Request wrapper around a shared `reqwest::Client`.
///
/// Every call returns an [`Outcome`]; transport errors, timeouts and non-2xx
/// statuses are all folded into [`Outcome::Failure`]. No retries happen here.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    /// Builds a client with a cookie store, so `ui/` routes carry the login
    /// session the backend hands out.
    pub fn new() -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("hostagent/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e.to_string())
            })?;
        Ok(Self { http })
    }

    /// Performs `request` against the backend described by `ctx`.
    pub async fn request(&self, ctx: &RequestContext, request: &Request) -> Outcome {
        let outcome: Outcome = self.send(ctx, request).await.into();
        if let Outcome::Failure(err) = &outcome {
            tracing::warn!("{} {} -> {}", request.method, request.path, err);
        }
        outcome
    }

    /// GET `path`, decoding JSON when `parse_json` is set.
    pub async fn get(&self, ctx: &RequestContext, path: &str, parse_json: bool) -> Outcome {
        let mut request = Request::get(path);
        request.parse_json = parse_json;
        self.request(ctx, &request).await
    }

    /// POST `body` to `path`, decoding JSON when `parse_json` is set.
    pub async fn post(
        &self,
        ctx: &RequestContext,
        path: &str,
        body: Option<String>,
        parse_json: bool,
    ) -> Outcome {
        let mut request = Request::post(path, body);
        request.parse_json = parse_json;
        self.request(ctx, &request).await
    }

    /// Liveness probe: GET `ui/ping` in text mode.
    pub async fn ping(&self, ctx: &RequestContext) -> Outcome {
        self.get(ctx, PING_PATH, false).await
    }

    async fn send(&self, ctx: &RequestContext, request: &Request) -> Result<ResponseBody, Error> {
        let url = ctx.url_for(&request.path)?;
        let timeout = request.timeout.unwrap_or(ctx.timeout);
        tracing::debug!(method = %request.method, %url, ?timeout, "sending request");

        let mut builder = self
            .http
            .request(request.method.into(), url)
            .timeout(timeout)
            .header(ACCEPT_LANGUAGE, ctx.locale.as_str());

        if RouteKind::of(&request.path) == RouteKind::Api {
            if let Some(key) = &ctx.api_key {
                builder = builder.header(API_KEY_HEADER, key.as_str());
            }
        }

        if request.has_body() {
            if let Some(body) = &request.body {
                builder = builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(body.clone());
            }
        }

        // The timeout also covers the body read; expiry aborts the connection.
        let resp = builder.send().await.map_err(transport_error)?;
        let status = resp.status();
        let text = resp.text().await.map_err(transport_error)?;

        if status == StatusCode::FORBIDDEN {
            return Err(Error::LoggedOut);
        }

        if !status.is_success() {
            return Err(Error::Status {
                method: request.method,
                path: request.path.clone(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body: truncate_body(&text),
            });
        }

        if !request.parse_json {
            return Ok(ResponseBody::Text(text));
        }

        if text.trim().is_empty() {
            return Ok(ResponseBody::Json(serde_json::Value::Null));
        }

        serde_json::from_str(&text)
            .map(ResponseBody::Json)
            .map_err(|e| {
                tracing::error!("Failed to parse response: {} | body: {}", e, truncate_body(&text));
                Error::Parse(e.to_string())
            })
    }
}

fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        return Error::TimedOut;
    }
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    Error::Transport(message)
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_BODY_IN_MESSAGE {
        return body.to_string();
    }
    let mut end = MAX_BODY_IN_MESSAGE;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
