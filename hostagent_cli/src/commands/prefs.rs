//! The `prefs` subcommand: inspect and edit the persisted preferences.

use anyhow::Result;
use clap::{Args, Subcommand};
use hostagent_lib::Session;

use crate::output::{print_prefs, OutputFormat};

/// Arguments for the `prefs` subcommand.
#[derive(Args)]
pub struct PrefsArgs {
    #[command(subcommand)]
    pub action: Option<PrefsAction>,
}

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Print the stored preferences
    Show,
    /// Set the base path the backend serves under
    SetBasePath { base_path: String },
    /// Set the locale sent as Accept-Language
    SetLocale { locale: String },
}

pub fn run(args: &PrefsArgs, session: &mut Session, format: &OutputFormat) -> Result<()> {
    match &args.action {
        None | Some(PrefsAction::Show) => {}
        Some(PrefsAction::SetBasePath { base_path }) => session.set_base_path(base_path)?,
        Some(PrefsAction::SetLocale { locale }) => session.set_locale(locale)?,
    }
    print_prefs(session.preferences(), format)
}
