use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use senpy_api::SenpyClient;
use senpy_types::OutFormat;
use senpy_util::{UserPreferences, preferences::config_root, resolve_api_base};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

#[derive(Parser, Debug)]
#[command(name = "senpy", about = "Sentiment and emotion analysis against a senpy service", version)]
struct Cli {
    /// Service root (overrides SENPY_API_BASE and the saved preference)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List plugins grouped by type.
    Plugins {
        /// Print the raw plugin documents as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the datasets available for evaluation.
    Datasets,
    /// Show the parameters of a plugin, or the service-wide ones.
    Params {
        /// Plugin name; omitted means the basic parameters.
        plugin: Option<String>,
    },
    /// Analyse a text and print the service response.
    Analyse(AnalyseArgs),
    /// Analyse a text and print its triple graph as JSON.
    Graph {
        #[command(flatten)]
        analysis: AnalyseArgs,
        /// Print the node and edge lists instead of the adjacency listing.
        #[arg(long)]
        nodes: bool,
    },
    /// Evaluate a plugin on one or more datasets.
    Evaluate {
        /// Plugin to evaluate; defaults to the service default.
        #[arg(long)]
        plugin: Option<String>,
        /// Dataset id, repeatable.
        #[arg(long = "dataset", required = true)]
        datasets: Vec<String>,
        /// Print the request URL instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct AnalyseArgs {
    /// Text to analyse.
    pub input: String,
    /// Last plugin of the pipeline; defaults to the service default.
    #[arg(long)]
    pub plugin: Option<String>,
    /// Stage run before the plugin, repeatable and kept in order.
    #[arg(long = "stage")]
    pub stages: Vec<String>,
    /// Extra parameter as key=value, repeatable; overrides form defaults.
    #[arg(long = "param", value_parser = parse_kv)]
    pub params: Vec<(String, String)>,
    /// Response serialization.
    #[arg(long)]
    pub outformat: Option<OutFormat>,
    /// Print the request URL instead of sending it.
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_kv(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let preferences = Arc::new(UserPreferences::new().unwrap_or_else(|error| {
        eprintln!("warning: preferences unavailable ({error}); using defaults");
        UserPreferences::ephemeral()
    }));
    let api_base = resolve_api_base(cli.api_base.as_deref(), &preferences);
    let client = SenpyClient::new(&api_base).with_context(|| format!("invalid service address '{api_base}'"))?;

    let Some(command) = cli.command else {
        let _guard = init_file_tracing()?;
        tracing::info!(%api_base, "starting TUI");
        let outformat = preferences.default_outformat().unwrap_or_default();
        return senpy_tui::run(client, preferences, outformat).await;
    };

    init_stderr_tracing();
    let default_outformat = preferences.default_outformat().unwrap_or_default();
    match command {
        Commands::Plugins { json } => commands::plugins(&client, json).await,
        Commands::Datasets => commands::datasets(&client).await,
        Commands::Params { plugin } => commands::params(&client, plugin.as_deref()).await,
        Commands::Analyse(args) => {
            let outformat = args.outformat.unwrap_or(default_outformat);
            commands::analyse(&client, &args, outformat).await
        }
        Commands::Graph { analysis, nodes } => commands::graph(&client, &analysis, nodes).await,
        Commands::Evaluate {
            plugin,
            datasets,
            dry_run,
        } => commands::evaluate(&client, plugin.as_deref(), datasets, dry_run).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_tracing() {
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

/// The TUI owns the terminal, so tracing goes to `senpy.log` in the config dir.
fn init_file_tracing() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = config_root();
    std::fs::create_dir_all(&log_dir).with_context(|| format!("creating {}", log_dir.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&log_dir, "senpy.log"));
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init();
    Ok(guard)
}
