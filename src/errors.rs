use thiserror::Error;

/// Upstream batch acquisition failed. Fatal for the whole query.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("upstream returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("could not read batch from {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("could not decode batch: {0}")]
    Decode(String),
}

/// A tag field that looked like a list literal but did not parse.
#[derive(Debug, Error, PartialEq)]
#[error("malformed tag list at byte {offset}: {reason}")]
pub struct TagError {
    pub offset: usize,
    pub reason: &'static str,
}

/// Errors raised while turning one query into its derived views.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("query text is empty")]
    EmptyQuery,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("record {index}: malformed tags {raw:?}: {source}")]
    MalformedTags {
        index: usize,
        raw: String,
        source: TagError,
    },
    #[error("record {index}: missing required field '{field}'")]
    MissingField { index: usize, field: String },
    #[error("record {index}: unparseable review date {raw:?}")]
    DateParse { index: usize, raw: String },
}

impl PipelineError {
    /// Short machine-readable tag for the error view.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::EmptyQuery => "empty_query",
            PipelineError::Fetch(_) => "fetch",
            PipelineError::MalformedTags { .. } => "malformed_tags",
            PipelineError::MissingField { .. } => "missing_field",
            PipelineError::DateParse { .. } => "date_parse",
        }
    }
}
