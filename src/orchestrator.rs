use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, error, info};

use crate::config::AppConfig;
use crate::distribution::{aggregate, aggregate_verdicts_grouped, Distribution, RecordField};
use crate::errors::PipelineError;
use crate::fetch::{normalize_batch, FactCheckSource};
use crate::graph::{build_graph, GraphElement};
use crate::models::{NormalizedRecord, Query};
use crate::table::{project_table, Table};
use crate::timeline::{project_timeline, TimelinePoint};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Summary {
    pub query: Option<String>,
    pub results: usize,
    pub unique_sources: usize,
    pub unique_tags: usize,
}

impl Summary {
    pub fn of(query: &str, records: &[NormalizedRecord]) -> Self {
        let sources: HashSet<&str> = records.iter().map(|r| r.source()).collect();
        let tags: HashSet<&str> = records
            .iter()
            .flat_map(|r| r.tags.iter().map(String::as_str))
            .collect();
        Self {
            query: Some(query.to_string()),
            results: records.len(),
            unique_sources: sources.len(),
            unique_tags: tags.len(),
        }
    }
}

/// Every derived view of one query's batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViewSet {
    pub summary: Summary,
    pub verdicts: Distribution, // grouped
    pub tags: Distribution,
    pub sources: Distribution,
    pub timeline: Vec<TimelinePoint>,
    pub table: Table,
    pub graph: Vec<GraphElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    /// No query text: neutral, empty views.
    NoData(ViewSet),
    /// Fatal error: a single error view replaces every chart.
    Failed {
        query: String,
        kind: &'static str,
        message: String,
    },
    Ready(ViewSet),
}

/// Derive all views from an already-cleaned batch.
///
/// The views only read `records`, so they are computed side by side.
pub fn derive_views(
    query: &str,
    records: &[NormalizedRecord],
    cfg: &AppConfig,
    graph_enabled: bool,
) -> Result<ViewSet, PipelineError> {
    let ((verdicts, tags, sources), (timeline, (graph, table))) = rayon::join(
        || {
            (
                aggregate_verdicts_grouped(records, cfg.verdict_other_threshold),
                aggregate(records, RecordField::Tag),
                aggregate(records, RecordField::Source),
            )
        },
        || {
            rayon::join(
                || project_timeline(records, cfg.date_policy),
                || {
                    (
                        build_graph(records, graph_enabled),
                        project_table(records, &cfg.field_names),
                    )
                },
            )
        },
    );

    Ok(ViewSet {
        summary: Summary::of(query, records),
        verdicts,
        tags,
        sources,
        timeline: timeline?,
        table,
        graph,
    })
}

async fn run_inner<S: FactCheckSource>(
    source: &S,
    query: &Query,
    cfg: &AppConfig,
    graph_enabled: bool,
) -> Result<ViewSet, PipelineError> {
    if query.text.trim().is_empty() {
        return Err(PipelineError::EmptyQuery);
    }

    let fetch_start = std::time::Instant::now();
    let rows = source.fetch(query).await?;
    info!(
        "Fetch completed - duration={:.2}s, rows={}",
        fetch_start.elapsed().as_secs_f32(),
        rows.len()
    );

    let records = normalize_batch(rows, &cfg.field_names, cfg.tag_policy)?;
    derive_views(&query.text, &records, cfg, graph_enabled)
}

/// Run one query end to end. Each call owns its batch; nothing is shared.
pub async fn run_query<S: FactCheckSource>(
    source: &S,
    query: &Query,
    cfg: &AppConfig,
    graph_enabled: bool,
) -> QueryOutcome {
    let pipeline_start = std::time::Instant::now();
    info!(
        "Pipeline started - query={:?}, language={}, max_results={}, graph={}",
        query.text,
        query.language.as_param(),
        query.max_results,
        graph_enabled
    );

    match run_inner(source, query, cfg, graph_enabled).await {
        Ok(views) => {
            info!(
                "Pipeline completed - duration={:.2}s, results={}, sources={}, tags={}",
                pipeline_start.elapsed().as_secs_f32(),
                views.summary.results,
                views.summary.unique_sources,
                views.summary.unique_tags
            );
            QueryOutcome::Ready(views)
        }
        Err(PipelineError::EmptyQuery) => {
            debug!("Empty query - returning neutral views");
            QueryOutcome::NoData(ViewSet::default())
        }
        Err(e) => {
            error!("Pipeline failed - kind={}, error={}", e.kind(), e);
            QueryOutcome::Failed {
                query: query.text.clone(),
                kind: e.kind(),
                message: e.to_string(),
            }
        }
    }
}
