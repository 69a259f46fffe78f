use itertools::Itertools;
use reqwest::{Client, Url};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api_types::{row_to_record, ApiBatch, ApiRow};
use crate::config::{FieldNames, RowPolicy};
use crate::errors::{FetchError, PipelineError};
use crate::models::{NormalizedRecord, Query};
use crate::tags::parse_tags;
use crate::verdict::normalize_verdict;

/// Upstream collaborator that turns a query into a raw batch of rows.
///
/// Any error is fatal for the query; no partial batch is accepted.
#[allow(async_fn_in_trait)]
pub trait FactCheckSource {
    async fn fetch(&self, query: &Query) -> Result<Vec<ApiRow>, FetchError>;
}

/// A JSON file holding an array of rows (or `{"results": [...]}`).
pub struct JsonFileSource {
    pub path: PathBuf,
}

impl FactCheckSource for JsonFileSource {
    async fn fetch(&self, query: &Query) -> Result<Vec<ApiRow>, FetchError> {
        let path = self.path.display().to_string();
        debug!("Reading batch file - path={}", path);

        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| FetchError::Io { path: path.clone(), reason: e.to_string() })?;
        let batch: ApiBatch =
            serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))?;

        let mut rows = batch.into_rows();
        rows.truncate(query.max_results);
        info!("Batch file read - path={}, rows={}", path, rows.len());
        Ok(rows)
    }
}

/// HTTP search endpoint answering `GET ?query=&language=&num_results=` with JSON rows.
pub struct HttpSource {
    client: Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let endpoint = endpoint.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Request { url: endpoint.clone(), reason: e.to_string() })?;
        Ok(Self { client, endpoint })
    }

    pub fn request_url(&self, query: &Query) -> Result<Url, FetchError> {
        let max = query.max_results.to_string();
        Url::parse_with_params(
            &self.endpoint,
            [
                ("query", query.text.as_str()),
                ("language", query.language.as_param()),
                ("num_results", max.as_str()),
            ],
        )
        .map_err(|e| FetchError::Request { url: self.endpoint.clone(), reason: e.to_string() })
    }
}

impl FactCheckSource for HttpSource {
    async fn fetch(&self, query: &Query) -> Result<Vec<ApiRow>, FetchError> {
        let url = self.request_url(query)?;
        let start = std::time::Instant::now();
        debug!("Fetching batch - url={}", url);

        let request_err =
            |e: reqwest::Error| FetchError::Request { url: url.to_string(), reason: e.to_string() };

        let resp = self.client.get(url.clone()).send().await.map_err(request_err)?;
        let status = resp.status();
        if !status.is_success() {
            warn!("Upstream rejected query - url={}, status={}", url, status);
            return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
        }

        let batch: ApiBatch = resp.json().await.map_err(|e| FetchError::Decode(e.to_string()))?;
        let mut rows = batch.into_rows();
        rows.truncate(query.max_results);

        info!(
            "Batch fetch completed - duration={:.2}s, rows={}",
            start.elapsed().as_secs_f32(),
            rows.len()
        );
        Ok(rows)
    }
}

/// The upstream picked at startup.
pub enum Upstream {
    File(JsonFileSource),
    Http(HttpSource),
    /// Nothing configured; only a blank query (which never fetches) can run.
    Unconfigured,
}

impl FactCheckSource for Upstream {
    async fn fetch(&self, query: &Query) -> Result<Vec<ApiRow>, FetchError> {
        match self {
            Upstream::File(s) => s.fetch(query).await,
            Upstream::Http(s) => s.fetch(query).await,
            Upstream::Unconfigured => Err(FetchError::Request {
                url: "<none>".into(),
                reason: "no upstream configured".into(),
            }),
        }
    }
}

fn apply_policy(
    policy: RowPolicy,
    err: PipelineError,
    skipped: &mut usize,
) -> Result<(), PipelineError> {
    match policy {
        RowPolicy::Fail => Err(err),
        RowPolicy::Skip => {
            warn!("Record dropped - {}", err);
            *skipped += 1;
            Ok(())
        }
    }
}

/// Clean a raw batch: lift rows, canonicalize verdicts, parse and dedup tags.
///
/// Rows with a missing source or malformed tags follow `tag_policy`.
pub fn normalize_batch(
    rows: Vec<ApiRow>,
    names: &FieldNames,
    tag_policy: RowPolicy,
) -> Result<Vec<NormalizedRecord>, PipelineError> {
    let total = rows.len();
    let mut out = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for (index, row) in rows.into_iter().enumerate() {
        let record = match row_to_record(index, row, names) {
            Ok(r) => r,
            Err(e) => {
                apply_policy(tag_policy, e, &mut skipped)?;
                continue;
            }
        };

        let tags = match parse_tags(&record.tags_raw) {
            Ok(t) => t.into_iter().unique().collect(),
            Err(source) => {
                let e = PipelineError::MalformedTags {
                    index,
                    raw: record.tags_raw.display(),
                    source,
                };
                apply_policy(tag_policy, e, &mut skipped)?;
                continue;
            }
        };

        out.push(NormalizedRecord {
            index,
            verdict_canonical: normalize_verdict(&record.verdict_raw),
            tags,
            record,
        });
    }

    if skipped > 0 {
        info!("Cleaning - dropped={} records, retained={}", skipped, out.len());
    } else {
        debug!("Cleaning - retained={} of {} records", out.len(), total);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;
    use serde_json::{json, Value};
    use std::io::Write;

    fn rows(v: Value) -> Vec<ApiRow> {
        serde_json::from_value(v).unwrap()
    }

    fn query(max: usize) -> Query {
        Query { text: "vaccines".into(), language: Language::All, max_results: max }
    }

    #[test]
    fn cleaning_canonicalizes_and_dedups_tags() {
        let batch = rows(json!([
            { "Source Name": "A", "Verdict": "Falso.", "Tags": "x, y, x", "Review Publication Date": "2024-01-01" }
        ]));
        let out = normalize_batch(batch, &FieldNames::default(), RowPolicy::Skip).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].verdict_canonical, "false");
        assert_eq!(out[0].tags, vec!["x", "y"]);
        assert_eq!(out[0].record.verdict_raw, "Falso.");
    }

    #[test]
    fn malformed_tags_are_skipped_under_skip_policy() {
        let batch = rows(json!([
            { "Source Name": "A", "Verdict": "true", "Tags": "['x" },
            { "Source Name": "B", "Verdict": "true", "Tags": "['y']" },
            { "Verdict": "true" }
        ]));
        let out = normalize_batch(batch, &FieldNames::default(), RowPolicy::Skip).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source(), "B");
    }

    #[test]
    fn malformed_tags_fail_the_batch_under_fail_policy() {
        let batch = rows(json!([
            { "Source Name": "A", "Verdict": "true", "Tags": "ok" },
            { "Source Name": "B", "Verdict": "true", "Tags": "[oops]" }
        ]));
        let err = normalize_batch(batch, &FieldNames::default(), RowPolicy::Fail).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedTags { index: 1, .. }));
    }

    #[test]
    fn missing_source_fails_the_batch_under_fail_policy() {
        let batch = rows(json!([
            { "Source Name": "A", "Verdict": "true" },
            { "Verdict": "true", "Tags": "x" }
        ]));
        let err = normalize_batch(batch, &FieldNames::default(), RowPolicy::Fail).unwrap_err();
        assert!(
            matches!(&err, PipelineError::MissingField { index: 1, field } if field == "Source Name"),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = sock.read(&mut buf).await.unwrap();
            sock.write_all(
                b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
            )
            .await
            .unwrap();
        });

        let src = HttpSource::new(format!("http://{addr}/search"), Duration::from_secs(5)).unwrap();
        let err = src.fetch(&query(10)).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }), "{err:?}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn json_file_source_truncates_to_max_results() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"results":[{{"Source Name":"A"}},{{"Source Name":"B"}},{{"Source Name":"C"}}]}}"#)
            .unwrap();
        let src = JsonFileSource { path: f.path().to_path_buf() };
        let got = src.fetch(&query(2)).await.unwrap();
        assert_eq!(got.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let src = JsonFileSource { path: PathBuf::from("/definitely/not/here.json") };
        assert!(matches!(src.fetch(&query(10)).await, Err(FetchError::Io { .. })));
    }

    #[test]
    fn http_request_carries_query_parameters() {
        let src = HttpSource::new("http://localhost:8080/search", Duration::from_secs(1)).unwrap();
        let q = Query { text: "climate change".into(), language: Language::parse("es"), max_results: 50 };
        let url = src.request_url(&q).unwrap();
        let pairs: Vec<(String, String)> =
            url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        assert_eq!(
            pairs,
            vec![
                ("query".to_string(), "climate change".to_string()),
                ("language".to_string(), "es".to_string()),
                ("num_results".to_string(), "50".to_string()),
            ]
        );
    }
}
