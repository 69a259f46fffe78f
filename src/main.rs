mod api_types;
mod config;
mod distribution;
mod errors;
mod fetch;
mod graph;
mod models;
mod orchestrator;
mod table;
mod tags;
mod timeline;
mod verdict;
mod viz_export;

#[cfg(test)]
mod test_util;

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use config::{resolve_config_path, AppConfig};
use fetch::{HttpSource, JsonFileSource, Upstream};
use models::{Language, Query};
use orchestrator::{run_query, QueryOutcome};
use viz_export::{run_dir_name, write_views};

/// Factcheck Vibes - verdict, tag, source, timeline and graph views over fact-check searches
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Search text sent upstream (blank yields the empty "no data" views)
    #[arg(default_value = "")]
    query: String,

    /// Language code, or "all"
    #[arg(short, long, default_value = "all")]
    language: String,

    /// Maximum number of records to request
    #[arg(short, long, default_value_t = 100)]
    num_results: usize,

    /// Build the source/tag relationship graph
    #[arg(short, long)]
    graph: bool,

    /// Read the batch from a JSON file instead of an HTTP endpoint
    #[arg(short, long, conflicts_with = "endpoint")]
    input: Option<PathBuf>,

    /// HTTP search endpoint (overrides http_endpoint from the config file)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Path to config file (overrides FCV_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting factcheck_vibes");

    let args = Args::parse();

    let cfg = match resolve_config_path(args.config.as_deref()) {
        Some(path) => {
            debug!("Using config file: {}", path.display());
            if !path.exists() {
                bail!(
                    "config not found at {}\n\
                     Use --config to specify a config file, or set FCV_CONFIG.\n\
                     Example config.yaml:\n\
                     tag_policy: skip\ndate_policy: fail\nverdict_other_threshold: 2.0\n\
                     http_endpoint: \"http://localhost:8080/search\"\n",
                    path.display()
                );
            }
            AppConfig::load(&path)?
        }
        None => {
            debug!("No config file - using built-in defaults");
            AppConfig::default()
        }
    };

    let query = Query {
        text: args.query.trim().to_string(),
        language: Language::parse(&args.language),
        max_results: args.num_results,
    };

    let upstream = if let Some(path) = args.input {
        Upstream::File(JsonFileSource { path })
    } else if let Some(endpoint) = args.endpoint.or_else(|| cfg.http_endpoint.clone()) {
        Upstream::Http(HttpSource::new(endpoint, Duration::from_secs(cfg.http_timeout_secs))?)
    } else {
        Upstream::Unconfigured
    };
    if matches!(upstream, Upstream::Unconfigured) && !query.text.is_empty() {
        bail!("no upstream configured: pass --input <file>, --endpoint <url>, or set http_endpoint in the config");
    }

    let outcome = run_query(&upstream, &query, &cfg, args.graph).await;

    let dir_name = if query.text.is_empty() {
        "no_query".to_string()
    } else {
        run_dir_name(&query.text, chrono::Utc::now().timestamp_millis())
    };
    let out_dir = args.output_dir.join(dir_name);
    let files = write_views(&out_dir, &outcome)?;

    match &outcome {
        QueryOutcome::Ready(v) => info!(
            "Views written - dir={}, files={}, results={}, unique_sources={}, unique_tags={}",
            out_dir.display(),
            files.len(),
            v.summary.results,
            v.summary.unique_sources,
            v.summary.unique_tags
        ),
        QueryOutcome::NoData(_) => info!("No query given - wrote empty views to {}", out_dir.display()),
        QueryOutcome::Failed { kind, message, .. } => {
            warn!("Query failed - kind={}, error={}, dir={}", kind, message, out_dir.display())
        }
    }

    Ok(())
}
