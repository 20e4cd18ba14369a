//! The `profile` subcommand.

use anyhow::Result;
use hostagent_lib::Session;

use crate::output::{print_profile, OutputFormat};

pub async fn run(session: &Session, format: &OutputFormat) -> Result<()> {
    let profile = session.profile().await?;
    print_profile(&profile, format)
}
