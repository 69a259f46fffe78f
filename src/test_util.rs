use serde_json::{Map, Value};

use crate::models::{FactCheckRecord, NormalizedRecord, RawTags};

/// A cleaned record whose fields mirror the typed values under the default column names.
pub fn rec(source: &str, verdict: &str, tags: &[&str]) -> NormalizedRecord {
    dated(source, verdict, tags, "")
}

pub fn dated(source: &str, verdict: &str, tags: &[&str], date: &str) -> NormalizedRecord {
    let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
    let mut fields = Map::new();
    fields.insert("Source Name".into(), Value::from(source));
    fields.insert("Verdict".into(), Value::from(verdict));
    fields.insert("Tags".into(), Value::from(tags.clone()));
    fields.insert("Review Publication Date".into(), Value::from(date));
    NormalizedRecord {
        index: 0,
        record: FactCheckRecord {
            source_name: source.into(),
            verdict_raw: verdict.into(),
            tags_raw: RawTags::List(tags.clone()),
            review_date: date.into(),
            fields,
        },
        verdict_canonical: verdict.into(),
        tags,
    }
}
