mod commands;
mod output;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use hostagent_lib::validation::{validate_api_key, validate_timeout_ms};
use hostagent_lib::{Client, ClientConfig, HostAgentError, Preferences, Session};
use url::Url;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "hostagent")]
#[command(about = "Talk to a host agent's web backend and manage its configuration")]
struct Cli {
    /// Output format: text or json
    #[arg(long, default_value = "text", global = true)]
    output: String,

    /// Backend origin (overrides HOSTAGENT_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// API key sent on api/ routes (overrides HOSTAGENT_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Preferences file holding base path and locale (overrides HOSTAGENT_PREFS)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Per-request timeout in milliseconds (overrides HOSTAGENT_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is up
    Ping,
    /// GET a backend route
    Get(commands::request::GetArgs),
    /// POST to a backend route
    Post(commands::request::PostArgs),
    /// Submit a configuration change and wait for the backend to reload
    Apply(commands::apply::ApplyArgs),
    /// Wait for a restarting backend to answer again
    WaitReload,
    /// Show the logged-in profile
    Profile,
    /// Show or change stored preferences
    Prefs(commands::prefs::PrefsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hostagent=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        _ => OutputFormat::Text,
    };

    let config = resolve_config(&cli)?;
    let prefs = Preferences::load(&config.prefs_path)?;
    let mut session = Session::new(Client::new()?, &config, prefs)
        .with_prefs_path(config.prefs_path.clone());

    let result = match &cli.command {
        Commands::Ping => commands::request::ping(&session, &format).await,
        Commands::Get(args) => commands::request::get(args, &session, &format).await,
        Commands::Post(args) => commands::request::post(args, &session, &format).await,
        Commands::Apply(args) => commands::apply::run(args, &mut session, &format).await,
        Commands::WaitReload => commands::apply::wait_reload(&session, &format).await,
        Commands::Profile => commands::profile::run(&session, &format).await,
        Commands::Prefs(args) => commands::prefs::run(args, &mut session, &format),
    };

    result.map_err(|e| match e.downcast_ref::<HostAgentError>() {
        Some(HostAgentError::LoggedOut) => anyhow!(
            "logged out: sign in to {} again and retry",
            config.url
        ),
        _ => e,
    })
}

/// Environment first, then flags on top.
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.url {
        config.url = Url::parse(url).map_err(|e| anyhow!("invalid --url '{}': {}", url, e))?;
    }
    if let Some(key) = &cli.api_key {
        config.api_key = Some(validate_api_key(key)?);
    }
    if let Some(path) = &cli.prefs {
        config.prefs_path = path.clone();
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = validate_timeout_ms(ms)?;
    }
    Ok(config)
}
