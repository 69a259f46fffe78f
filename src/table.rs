// src/table.rs
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::config::FieldNames;
use crate::models::NormalizedRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Map<String, Value>>,
}

/// Flatten the cleaned batch for tabular display.
///
/// Columns follow the batch's own field order (first-seen across rows). The
/// source cell is the trimmed name, the verdict cell shows the canonical label
/// and tags render as `"a, b"`.
pub fn project_table(records: &[NormalizedRecord], names: &FieldNames) -> Table {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut columns = Vec::new();
    for r in records {
        for key in r.record.fields.keys() {
            if seen.insert(key) {
                columns.push(ColumnSpec {
                    name: key.clone(),
                    id: key.clone(),
                });
            }
        }
    }

    let rows = records
        .iter()
        .map(|r| {
            let mut row = r.record.fields.clone();
            if let Some(v) = row.get_mut(&names.source) {
                *v = Value::from(r.source());
            }
            if let Some(v) = row.get_mut(&names.verdict) {
                *v = Value::from(r.verdict_canonical.as_str());
            }
            if let Some(v) = row.get_mut(&names.tags) {
                *v = Value::from(r.tags.join(", "));
            }
            row
        })
        .collect();

    Table { columns, rows }
}
