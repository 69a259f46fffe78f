use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::FieldNames;
use crate::errors::PipelineError;
use crate::models::{FactCheckRecord, RawTags};

pub type ApiRow = Map<String, Value>;

/// Upstream payload: a bare array of rows, or an object wrapping them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiBatch {
    Rows(Vec<ApiRow>),
    Envelope { results: Vec<ApiRow> },
}

impl ApiBatch {
    pub fn into_rows(self) -> Vec<ApiRow> {
        match self {
            ApiBatch::Rows(rows) => rows,
            ApiBatch::Envelope { results } => results,
        }
    }
}

fn scalar_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn raw_tags(v: Option<&Value>) -> RawTags {
    match v {
        Some(Value::String(s)) => RawTags::Text(s.clone()),
        Some(Value::Array(items)) => RawTags::List(items.iter().map(scalar_text).collect()),
        Some(Value::Null) | None => RawTags::default(),
        Some(other) => RawTags::Text(other.to_string()),
    }
}

/// Lift one upstream row into a record, keeping every field in its original order.
pub fn row_to_record(
    index: usize,
    row: ApiRow,
    names: &FieldNames,
) -> Result<FactCheckRecord, PipelineError> {
    let source_name = match row.get(&names.source) {
        Some(v) if !v.is_null() => scalar_text(v).trim().to_string(),
        _ => {
            return Err(PipelineError::MissingField {
                index,
                field: names.source.clone(),
            })
        }
    };

    Ok(FactCheckRecord {
        source_name,
        verdict_raw: row.get(&names.verdict).map(scalar_text).unwrap_or_default(),
        tags_raw: raw_tags(row.get(&names.tags)),
        review_date: row.get(&names.review_date).map(scalar_text).unwrap_or_default(),
        fields: row,
    })
}
