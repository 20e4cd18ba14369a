//! CLI subcommand implementations.

pub mod apply;
pub mod prefs;
pub mod profile;
pub mod request;
