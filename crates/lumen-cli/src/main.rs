//! Lumen CLI
//!
//! Runs a Prometheus range query from the terminal and prints the
//! normalized series, the same way notebook charts receive them.

mod render;

use anyhow::Context;
use chrono::Duration;
use clap::{Parser, Subcommand};
use lumen_core::{to_percentage, TimeRange};
use lumen_prometheus_sdk::{PrometheusClient, PrometheusConfig, RequestOptions};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "lumen", version, about = "Query Prometheus time series")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a range query
    Query {
        /// PromQL expression
        query: String,

        /// Range start (ISO-8601). Defaults to one hour before --to.
        #[arg(long)]
        from: Option<String>,

        /// Range end (ISO-8601). Defaults to now.
        #[arg(long)]
        to: Option<String>,

        /// Overrides PROMETHEUS_BASE_URL
        #[arg(long)]
        base_url: Option<String>,

        /// Show each value as its share of the per-timestamp total
        #[arg(long)]
        percentage: bool,

        /// Print the full series as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    lumen_telemetry::init("lumen-cli")?;

    match cli.command {
        Command::Query {
            query,
            from,
            to,
            base_url,
            percentage,
            json,
        } => {
            let range = resolve_range(from.as_deref(), to.as_deref())?;
            let config = PrometheusConfig::from_env()?;
            let options = match base_url {
                Some(url) => RequestOptions::new(&url),
                None => RequestOptions::from(&config),
            };
            debug!(base_url = %options.base_url, "Resolved Prometheus endpoint");

            let client = PrometheusClient::new(config)?;
            let mut series = client
                .query_range(&query, &range, &options)
                .await
                .with_context(|| format!("range query {:?} failed", query))?;
            if percentage {
                series = to_percentage(&series);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&series)?);
            } else {
                for line in render::summary_lines(&series) {
                    println!("{}", line);
                }
            }
        }
    }

    Ok(())
}

fn resolve_range(from: Option<&str>, to: Option<&str>) -> anyhow::Result<TimeRange> {
    let default = TimeRange::last(Duration::hours(1));
    let to = match to {
        Some(raw) => lumen_core::parse_timestamp(raw).context("invalid --to")?,
        None => default.to,
    };
    let from = match from {
        Some(raw) => lumen_core::parse_timestamp(raw).context("invalid --from")?,
        None => to - Duration::hours(1),
    };

    Ok(TimeRange::new(from, to))
}
