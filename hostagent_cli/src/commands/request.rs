//! The `ping`, `get` and `post` subcommands: single wrapped requests.

use anyhow::Result;
use clap::Args;
use hostagent_lib::validation::{validate_api_path, validate_json_body, validate_timeout_ms};
use hostagent_lib::{Request, Session};

use crate::output::{print_outcome, OutputFormat};

/// Arguments for the `get` subcommand.
#[derive(Args)]
pub struct GetArgs {
    /// Route relative to the base path, e.g. ui/ping or api/info
    pub path: String,

    /// Decode the response as JSON
    #[arg(long)]
    pub json: bool,

    /// Timeout for this request only, in milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,
}

/// Arguments for the `post` subcommand.
#[derive(Args)]
pub struct PostArgs {
    /// Route relative to the base path
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Decode the response as JSON
    #[arg(long)]
    pub json: bool,

    /// Timeout for this request only, in milliseconds
    #[arg(long)]
    pub request_timeout_ms: Option<u64>,
}

pub async fn ping(session: &Session, format: &OutputFormat) -> Result<()> {
    print_outcome(session.ping().await, format)
}

pub async fn get(args: &GetArgs, session: &Session, format: &OutputFormat) -> Result<()> {
    let mut request = Request::get(validate_api_path(&args.path)?);
    request.parse_json = args.json;
    if let Some(ms) = args.request_timeout_ms {
        request = request.timeout(validate_timeout_ms(ms)?);
    }
    print_outcome(session.request(&request).await, format)
}

pub async fn post(args: &PostArgs, session: &Session, format: &OutputFormat) -> Result<()> {
    let body = args
        .body
        .as_deref()
        .map(validate_json_body)
        .transpose()?;
    let mut request = Request::post(validate_api_path(&args.path)?, body);
    request.parse_json = args.json;
    if let Some(ms) = args.request_timeout_ms {
        request = request.timeout(validate_timeout_ms(ms)?);
    }
    print_outcome(session.request(&request).await, format)
}
