//! Request wrapper for the host agent's web backend.
//!
//! Every call takes an explicit [`RequestContext`] (origin, base path,
//! locale, API key, timeout) and returns a uniform [`Outcome`] instead of
//! raising transport, timeout or status errors.

mod client;
mod context;
mod errors;
mod outcome;
mod request;

pub use self::client::{Client, PING_PATH};
pub use self::context::{join_path, RequestContext, RouteKind, API_KEY_HEADER, DEFAULT_TIMEOUT};
pub use self::errors::{Error, LOGGED_OUT_MESSAGE, TIMED_OUT_MESSAGE};
pub use self::outcome::{Outcome, ResponseBody};
pub use self::request::{Method, Request};
