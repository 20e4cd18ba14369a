//! The `apply` and `wait-reload` subcommands.

use anyhow::Result;
use clap::Args;
use hostagent_lib::validation::{validate_api_path, validate_json_body};
use hostagent_lib::{ApplyRequest, Session};

use crate::output::{print_apply, print_reload, OutputFormat, StderrNotifier};

/// Arguments for the `apply` subcommand.
#[derive(Args)]
pub struct ApplyArgs {
    /// Route that accepts the configuration, e.g. api/reconfig
    pub path: String,

    /// JSON configuration body
    #[arg(long)]
    pub body: Option<String>,

    /// Base path the backend will serve under after restarting
    #[arg(long)]
    pub new_base_path: Option<String>,
}

pub async fn run(args: &ApplyArgs, session: &mut Session, format: &OutputFormat) -> Result<()> {
    let body = args
        .body
        .as_deref()
        .map(validate_json_body)
        .transpose()?;
    let mut apply = ApplyRequest::new(validate_api_path(&args.path)?, body);
    if let Some(base) = &args.new_base_path {
        apply = apply.moving_to(base.as_str());
    }

    eprintln!("Submitting {} and waiting for the backend to reload...", apply.path);
    let report = session.apply(&apply, &StderrNotifier).await?;
    print_apply(&report, format)
}

pub async fn wait_reload(session: &Session, format: &OutputFormat) -> Result<()> {
    let report = session.wait_for_reload(&StderrNotifier).await?;
    print_reload(&report, format)
}
