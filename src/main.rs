use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cache;
mod config;
mod error;
mod mock;
mod models;
mod report;
mod risk;
mod server;
mod source;

use crate::models::DashboardBundle;
use crate::source::{FileBundleSource, HttpBundleSource};

#[derive(Parser)]
#[command(name = "health-risk-dashboard")]
#[command(about = "Rule-based risk signals for the personal health dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("bundle_origin")
        .args(["backend_url", "bundle"])
        .multiple(false)
))]
struct BundleArgs {
    /// Backend base URL serving /api/dashboard
    #[arg(long)]
    backend_url: Option<String>,
    /// Read the bundle from a JSON file instead of the backend
    #[arg(long)]
    bundle: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a bundle and print its risk signals
    Evaluate {
        #[command(flatten)]
        origin: BundleArgs,
        /// Print signals as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report, optionally with a CSV of signals
    Report {
        #[command(flatten)]
        origin: BundleArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Emit the deterministic mock bundle as JSON
    Mock {
        /// Anchor date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Serve the dashboard bundle over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8000")]
        addr: SocketAddr,
    },
}

async fn resolve_bundle(origin: BundleArgs, today: NaiveDate) -> DashboardBundle {
    if let Some(path) = origin.bundle {
        return source::load_bundle(&FileBundleSource::new(path), today).await;
    }

    let backend_url = config::backend_url(origin.backend_url);
    source::load_bundle(&HttpBundleSource::new(&backend_url), today).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = Utc::now().date_naive();

    match cli.command {
        Commands::Evaluate { origin, json } => {
            let bundle = resolve_bundle(origin, today).await;
            let signals = risk::evaluate(&bundle);

            if json {
                println!("{}", serde_json::to_string_pretty(&signals)?);
                return Ok(());
            }

            if signals.is_empty() {
                println!("No risk signals for {}.", bundle.summary.date);
                return Ok(());
            }

            println!("Risk signals for {}:", bundle.summary.date);
            for signal in &signals {
                println!(
                    "- [{}] {}: {} ({})",
                    signal.severity, signal.label, signal.description, signal.action
                );
            }
        }
        Commands::Report { origin, out, csv } => {
            let bundle = resolve_bundle(origin, today).await;
            let signals = risk::evaluate(&bundle);

            let report = report::build_report(&bundle, &signals);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());

            if let Some(path) = csv {
                let file = std::fs::File::create(&path)
                    .with_context(|| format!("failed to create {}", path.display()))?;
                report::write_signals_csv(file, &signals)?;
                println!("Wrote {} signals to {}.", signals.len(), path.display());
            }
        }
        Commands::Mock { date, out } => {
            let bundle = mock::mock_bundle(date.unwrap_or(today));
            let json = serde_json::to_string_pretty(&bundle)?;

            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Mock bundle written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Serve { addr } => {
            let ttl = config::cache_ttl()?;
            let state = server::ServerState::new(cache::BundleCache::new(ttl), || {
                mock::backend_bundle(Utc::now().date_naive())
            });
            server::serve(addr, Arc::new(state)).await?;
        }
    }

    Ok(())
}
