//! tohong-ai - Wedding compatibility and auspicious-date service
//!
//! Subcommands:
//! - `serve`: HTTP JSON API (default port 5740)
//! - `facts`: deterministic calendar and numerology facts for one person
//! - `harmony` / `dates`: one-shot provider calls for a couple, JSON on stdout
//! - `init-config`: write a default `tohong.toml`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tohong_ai::config::resolve_provider_settings;
use tohong_ai::services::{ChatCompletionsClient, CompatibilityService, RequestContext};
use tohong_ai::{api::AuspiciousDatesResponse, AppState};
use tohong_common::config::{
    default_config_path, load_config_with_source, write_toml_config, TomlConfig,
};
use tohong_common::{CoupleProfile, Gender, PersonFacts, PersonProfile};

/// Command-line arguments for tohong-ai
#[derive(Parser, Debug)]
#[command(name = "tohong-ai")]
#[command(about = "Vietnamese wedding compatibility and auspicious-date service")]
#[command(version)]
struct Cli {
    /// Config file (overrides TOHONG_CONFIG and the default location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Listen address (overrides [server] host)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides [server] port)
        #[arg(short, long, env = "TOHONG_PORT")]
        port: Option<u16>,
    },
    /// Print deterministic facts for one birth date
    Facts {
        /// Birth date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// male | female
        #[arg(long)]
        gender: Gender,
        /// Birth time, HH:MM
        #[arg(long)]
        time: Option<String>,
        #[arg(long, default_value = "-")]
        name: String,
    },
    /// Compatibility reading for a couple
    Harmony(CoupleArgs),
    /// Auspicious wedding dates for a couple
    Dates(CoupleArgs),
    /// Write a default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct CoupleArgs {
    #[arg(long)]
    groom_name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    groom_dob: String,
    /// HH:MM
    #[arg(long)]
    groom_time: Option<String>,
    #[arg(long)]
    bride_name: String,
    /// YYYY-MM-DD
    #[arg(long)]
    bride_dob: String,
    /// HH:MM
    #[arg(long)]
    bride_time: Option<String>,
    /// Desired wedding period, free text
    #[arg(long, default_value = "")]
    range: String,
    /// Language code for free-text fields
    #[arg(long, default_value = "vi")]
    language: String,
    #[arg(long)]
    user: Option<String>,
}

impl CoupleArgs {
    fn into_parts(self) -> Result<(CoupleProfile, RequestContext)> {
        let groom = PersonProfile::parse(&self.groom_name, &self.groom_dob, self.groom_time.as_deref())
            .context("Invalid groom")?;
        let bride = PersonProfile::parse(&self.bride_name, &self.bride_dob, self.bride_time.as_deref())
            .context("Invalid bride")?;

        let mut ctx = RequestContext::new().with_language(self.language);
        if let Some(user) = self.user {
            ctx = ctx.with_user(user);
        }

        Ok((CoupleProfile::new(groom, bride, self.range), ctx))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source) = load_config_with_source(cli.config.as_deref())?;
    init_tracing(&config.logging.level)?;
    match &source {
        Some(path) => info!(path = %path.display(), "Loaded configuration file"),
        None => info!("No configuration file found, using defaults"),
    }

    match cli.command {
        Command::Serve { host, port } => serve(&config, host, port).await,
        Command::Facts {
            date,
            gender,
            time,
            name,
        } => {
            let profile = PersonProfile::parse(&name, &date, time.as_deref())?;
            print_json(&PersonFacts::compute(&profile, gender))
        }
        Command::Harmony(args) => {
            let (profile, ctx) = args.into_parts()?;
            let service = build_service(&config)?;
            let cancel_token = cancel_on_ctrl_c();
            let harmony = service
                .compute_compatibility(&profile, &ctx, &cancel_token)
                .await?;
            print_json(&harmony)
        }
        Command::Dates(args) => {
            let (profile, ctx) = args.into_parts()?;
            let service = build_service(&config)?;
            let cancel_token = cancel_on_ctrl_c();
            let dates = service
                .find_auspicious_dates(&profile, &ctx, &cancel_token)
                .await?;
            print_json(&AuspiciousDatesResponse { dates })
        }
        Command::InitConfig { force } => init_config(cli.config, force),
    }
}

/// RUST_LOG wins over the configured level; output goes to stderr
fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .context("Invalid logging level")?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_service(config: &TomlConfig) -> Result<Arc<CompatibilityService>> {
    let settings = resolve_provider_settings(config)?;
    let client = ChatCompletionsClient::new(&settings)?;
    info!(endpoint = client.endpoint(), model = %settings.model, "Text provider configured");
    Ok(Arc::new(CompatibilityService::new(Arc::new(client))))
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, cancelling");
            trigger.cancel();
        }
    });
    token
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(config: &TomlConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    info!("Starting tohong-ai");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let service = build_service(config)?;
    let state = AppState::new(service);
    let shutdown = state.shutdown.clone();
    let app = tohong_ai::build_router(state);

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    info!("Listening on http://{addr}");
    info!("Health check: http://{addr}/health");

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            trigger.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

fn init_config(explicit: Option<PathBuf>, force: bool) -> Result<()> {
    let path = match explicit.or_else(default_config_path) {
        Some(path) => path,
        None => bail!("No config directory on this platform; pass --config <path>"),
    };

    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    write_toml_config(&TomlConfig::default(), &path)?;
    info!(path = %path.display(), "Wrote default configuration");
    println!("{}", path.display());
    Ok(())
}
