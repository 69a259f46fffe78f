use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Search parameters handed to the upstream source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub language: Language,
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    All,
    Code(String), // e.g. "es", "pt-BR"
}

impl Language {
    /// "all" (any casing) or blank means no language filter.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Language::All
        } else {
            Language::Code(s.to_string())
        }
    }

    pub fn as_param(&self) -> &str {
        match self {
            Language::All => "all",
            Language::Code(c) => c,
        }
    }
}

/// Tag field as it arrives from upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTags {
    List(Vec<String>),
    Text(String), // list literal "['a', 'b']" or "a, b"
}

impl Default for RawTags {
    fn default() -> Self {
        RawTags::List(Vec::new())
    }
}

impl RawTags {
    pub fn display(&self) -> String {
        match self {
            RawTags::List(v) => format!("{v:?}"),
            RawTags::Text(s) => s.clone(),
        }
    }
}

/// One raw row of the upstream batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckRecord {
    pub source_name: String,
    pub verdict_raw: String,
    pub tags_raw: RawTags,
    pub review_date: String,
    pub fields: Map<String, Value>, // every upstream field, upstream order
}

/// A cleaned record: canonical verdict plus parsed, per-record-unique tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub index: usize, // position in the raw batch, before any rows were dropped
    pub record: FactCheckRecord,
    pub verdict_canonical: String,
    pub tags: Vec<String>,
}

impl NormalizedRecord {
    pub fn source(&self) -> &str {
        &self.record.source_name
    }
}
