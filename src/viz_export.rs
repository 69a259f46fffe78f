// src/viz_export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::{fs, path::Path};
use tracing::debug;

use crate::orchestrator::{QueryOutcome, ViewSet};

/* -------------------------------------------------------------------------- */
/* Entry point                                                                */
/* -------------------------------------------------------------------------- */

/// Write a query outcome as renderer-ready JSON documents into `out_dir`.
///
/// Ready and no-data outcomes produce one file per view; a failed query
/// produces only `views.error.json`. `views.index.json` always lists what was
/// written.
pub fn write_views(out_dir: &Path, outcome: &QueryOutcome) -> Result<Vec<String>> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    let (status, files) = match outcome {
        QueryOutcome::Ready(v) => ("ready", write_view_set(out_dir, v)?),
        QueryOutcome::NoData(v) => ("no_data", write_view_set(out_dir, v)?),
        QueryOutcome::Failed { query, kind, message } => {
            let name = "views.error.json";
            write_json(
                out_dir.join(name),
                &json!({ "query": query, "kind": kind, "message": message, "title": "Error fetching data" }),
            )?;
            ("failed", vec![name.to_string()])
        }
    };

    let idx = json!({ "version": 1, "status": status, "files": files });
    write_json(out_dir.join("views.index.json"), &idx)?;
    debug!("Views written - dir={}, status={}, files={}", out_dir.display(), status, files.len());
    Ok(files)
}

fn write_view_set(out_dir: &Path, v: &ViewSet) -> Result<Vec<String>> {
    let views = [
        ("views.summary.json", serde_json::to_value(&v.summary)?),
        ("views.verdicts.json", serde_json::to_value(&v.verdicts)?),
        ("views.tags.json", serde_json::to_value(&v.tags)?),
        ("views.sources.json", serde_json::to_value(&v.sources)?),
        ("views.timeline.json", serde_json::to_value(&v.timeline)?),
        ("views.table.json", serde_json::to_value(&v.table)?),
        ("views.graph.json", serde_json::to_value(&v.graph)?),
    ];

    let mut files = Vec::with_capacity(views.len());
    for (name, value) in views {
        write_json(out_dir.join(name), &value).with_context(|| format!("write {}", name))?;
        files.push(name.to_string());
    }
    Ok(files)
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .map(|_| ())
        .map_err(|e| e.into())
}

/// Per-query output folder: lowercased query, spaces as `_`, then a millisecond stamp.
pub fn run_dir_name(query: &str, stamp_millis: i64) -> String {
    let slug: String = query
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    format!("{slug}_{stamp_millis}")
}
