use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What to do with one record that fails a cleaning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowPolicy {
    Skip, // drop the record, log a warning, keep going
    Fail, // abort the whole query
}

/// Upstream keys that carry the fields the pipeline interprets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub source: String,
    pub verdict: String,
    pub tags: String,
    pub review_date: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            source: "Source Name".into(),
            verdict: "Verdict".into(),
            tags: "Tags".into(),
            review_date: "Review Publication Date".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub field_names: FieldNames,
    /// Policy for unparseable tag lists (and rows missing the source field).
    pub tag_policy: RowPolicy,
    /// Policy for unparseable review dates.
    pub date_policy: RowPolicy,
    /// Verdict categories strictly below this share (percent) fold into "other".
    pub verdict_other_threshold: f64,
    pub http_endpoint: Option<String>,
    pub http_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            field_names: FieldNames::default(),
            tag_policy: RowPolicy::Skip,
            date_policy: RowPolicy::Fail,
            verdict_other_threshold: 2.0,
            http_endpoint: None,
            http_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing config YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_yaml(&text)?;
        debug!("Config loaded - path={}", path.display());
        Ok(cfg)
    }
}

/// `--config` flag wins, then `FCV_CONFIG`, else none (built-in defaults).
pub fn resolve_config_path(cli: Option<&str>) -> Option<PathBuf> {
    if let Some(p) = cli {
        return Some(PathBuf::from(p));
    }
    std::env::var("FCV_CONFIG").ok().map(PathBuf::from)
}
