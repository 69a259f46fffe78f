// src/timeline.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RowPolicy;
use crate::errors::PipelineError;
use crate::models::NormalizedRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub date: NaiveDate,
    pub verdict: String,
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

static EMBEDDED_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<y>\d{4})[/-](?P<m>\d{1,2})[/-](?P<d>\d{1,2})").expect("static regex")
});

/// Parse a review date in any of the shapes upstream is known to send.
pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // last resort: first YYYY-MM-DD / YYYY/MM/DD run inside the text
    let c = EMBEDDED_DATE.captures(s)?;
    NaiveDate::from_ymd_opt(
        c.name("y")?.as_str().parse().ok()?,
        c.name("m")?.as_str().parse().ok()?,
        c.name("d")?.as_str().parse().ok()?,
    )
}

/// One (date, canonical verdict) point per record, ascending by date.
///
/// Ties keep batch order. An unparseable date aborts under
/// [`RowPolicy::Fail`]; under [`RowPolicy::Skip`] that record is left off the
/// timeline only.
pub fn project_timeline(
    records: &[NormalizedRecord],
    date_policy: RowPolicy,
) -> Result<Vec<TimelinePoint>, PipelineError> {
    let mut points = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for r in records {
        match parse_review_date(&r.record.review_date) {
            Some(date) => points.push(TimelinePoint {
                date,
                verdict: r.verdict_canonical.clone(),
            }),
            None => {
                let err = PipelineError::DateParse {
                    index: r.index,
                    raw: r.record.review_date.clone(),
                };
                match date_policy {
                    RowPolicy::Fail => return Err(err),
                    RowPolicy::Skip => {
                        warn!("Timeline point dropped - {}", err);
                        dropped += 1;
                    }
                }
            }
        }
    }

    points.sort_by_key(|p| p.date);
    debug!("Timeline projected - points={}, dropped={}", points.len(), dropped);
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::dated;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_common_date_shapes() {
        let want = ymd(2024, 3, 5);
        for raw in [
            "2024-03-05",
            " 2024-03-05 ",
            "2024-03-05T10:00:00Z",
            "2024-03-05T23:30:00-02:00",
            "2024-03-05T10:00:00",
            "2024-03-05 10:00:00.123",
            "2024/03/05",
            "03/05/2024",
            "5 March 2024",
            "March 5, 2024",
            "Mar 5, 2024",
            "reviewed on 2024-03-05 by staff",
        ] {
            assert_eq!(parse_review_date(raw), Some(want), "raw={raw:?}");
        }
    }

    #[test]
    fn rejects_garbage() {
        for raw in ["", "yesterday", "2024-13-40", "n/a"] {
            assert_eq!(parse_review_date(raw), None, "raw={raw:?}");
        }
    }

    #[test]
    fn sorted_ascending_with_stable_ties() {
        let batch = vec![
            dated("A", "true", &[], "2024-01-02"),
            dated("B", "false", &[], "2024-01-01"),
            dated("C", "misleading", &[], "2024-01-02"),
        ];
        let tl = project_timeline(&batch, RowPolicy::Fail).unwrap();
        let got: Vec<_> = tl.iter().map(|p| (p.date, p.verdict.as_str())).collect();
        assert_eq!(
            got,
            vec![
                (ymd(2024, 1, 1), "false"),
                (ymd(2024, 1, 2), "true"),
                (ymd(2024, 1, 2), "misleading"),
            ]
        );
    }

    #[test]
    fn bad_date_fails_or_skips_per_policy() {
        let mut bad = dated("B", "false", &[], "someday");
        bad.index = 4;
        let batch = vec![dated("A", "true", &[], "2024-01-02"), bad];
        // reported with the raw batch position, not the slice position
        let err = project_timeline(&batch, RowPolicy::Fail).unwrap_err();
        assert!(matches!(err, PipelineError::DateParse { index: 4, .. }));

        let tl = project_timeline(&batch, RowPolicy::Skip).unwrap();
        assert_eq!(tl.len(), 1);
        assert_eq!(tl[0].verdict, "true");
    }
}
