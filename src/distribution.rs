// src/distribution.rs
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use crate::models::NormalizedRecord;

pub const OTHER: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Verdict, // one count per record
    Tag,     // one count per (record, tag)
    Source,  // one count per record
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub count: usize,
    pub percentage: f64,
}

/// Categories ranked by descending count, ties in first-seen order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Distribution {
    pub buckets: Vec<Bucket>,
}

impl Distribution {
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.key == key)
    }

    fn from_counts(counts: Vec<(String, usize)>) -> Self {
        let total: usize = counts.iter().map(|(_, c)| c).sum();
        let mut buckets: Vec<Bucket> = counts
            .into_iter()
            .map(|(key, count)| Bucket {
                percentage: count as f64 * 100.0 / total as f64,
                key,
                count,
            })
            .collect();
        // stable: equal counts keep first-seen order
        buckets.sort_by(|a, b| b.count.cmp(&a.count));
        Self { buckets }
    }
}

/// Count keys keeping the order in which each first appeared.
fn ordered_counts<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut slot: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for k in keys {
        match slot.get(k) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(k, counts.len());
                counts.push((k.to_string(), 1));
            }
        }
    }
    counts
}

/// Frequency distribution of one field across the batch, every key reported.
pub fn aggregate(records: &[NormalizedRecord], field: RecordField) -> Distribution {
    let counts = match field {
        RecordField::Verdict => ordered_counts(records.iter().map(|r| r.verdict_canonical.as_str())),
        RecordField::Source => ordered_counts(records.iter().map(|r| r.source())),
        RecordField::Tag => {
            ordered_counts(records.iter().flat_map(|r| r.tags.iter().map(String::as_str)))
        }
    };
    Distribution::from_counts(counts)
}

/// Verdict distribution with the long tail folded into [`OTHER`].
///
/// A category whose share is strictly below `threshold_pct` merges into
/// `other`; a verdict literally named "other" lands in the same bucket.
pub fn aggregate_verdicts_grouped(records: &[NormalizedRecord], threshold_pct: f64) -> Distribution {
    let raw = aggregate(records, RecordField::Verdict);
    if raw.is_empty() {
        return raw;
    }

    let mut counts: Vec<(String, usize)> = Vec::with_capacity(raw.len());
    let mut other_slot: Option<usize> = None;
    let mut small = 0usize;

    for b in raw.buckets {
        if b.percentage < threshold_pct || b.key == OTHER {
            if b.key != OTHER {
                small += 1;
            }
            match other_slot {
                Some(i) => counts[i].1 += b.count,
                None => {
                    other_slot = Some(counts.len());
                    counts.push((OTHER.to_string(), b.count));
                }
            }
        } else {
            counts.push((b.key, b.count));
        }
    }

    debug!("Verdict grouping - folded={} categories into '{}'", small, OTHER);
    Distribution::from_counts(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::rec;

    fn pct_sum(d: &Distribution) -> f64 {
        d.buckets.iter().map(|b| b.percentage).sum()
    }

    #[test]
    fn empty_batch_gives_empty_distribution() {
        for field in [RecordField::Verdict, RecordField::Tag, RecordField::Source] {
            assert!(aggregate(&[], field).is_empty());
        }
        assert!(aggregate_verdicts_grouped(&[], 2.0).is_empty());
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let batch = vec![
            rec("A", "false", &["x", "y"]),
            rec("B", "true", &["x"]),
            rec("A", "false", &["z"]),
        ];
        for field in [RecordField::Verdict, RecordField::Tag, RecordField::Source] {
            let d = aggregate(&batch, field);
            assert!((pct_sum(&d) - 100.0).abs() < 1e-9, "{field:?}");
        }
    }

    #[test]
    fn ranking_is_descending_with_first_seen_ties() {
        let batch = vec![
            rec("B", "true", &[]),
            rec("A", "true", &[]),
            rec("C", "true", &[]),
            rec("A", "true", &[]),
        ];
        let keys: Vec<_> = aggregate(&batch, RecordField::Source)
            .buckets
            .into_iter()
            .map(|b| (b.key, b.count))
            .collect();
        assert_eq!(keys, vec![("A".to_string(), 2), ("B".to_string(), 1), ("C".to_string(), 1)]);
    }

    #[test]
    fn rare_verdicts_fold_into_other() {
        // 98 false, 1 satire, 1 other → satire is 1% < 2%
        let mut batch: Vec<_> = (0..98).map(|_| rec("A", "false", &[])).collect();
        batch.push(rec("A", "satire", &[]));
        batch.push(rec("A", "other", &[]));

        let d = aggregate_verdicts_grouped(&batch, 2.0);
        assert_eq!(d.len(), 2);
        assert_eq!(d.get("false").unwrap().count, 98);
        assert_eq!(d.get("other").unwrap().count, 2);
        assert!(d.get("satire").is_none());
        assert!((pct_sum(&d) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn exactly_threshold_is_not_folded() {
        let mut batch: Vec<_> = (0..49).map(|_| rec("A", "false", &[])).collect();
        batch.push(rec("A", "satire", &[])); // 2%
        let d = aggregate_verdicts_grouped(&batch, 2.0);
        assert_eq!(d.get("satire").unwrap().count, 1);
        assert!(d.get("other").is_none());
    }

    #[test]
    fn tags_and_sources_are_never_grouped() {
        let mut batch: Vec<_> = (0..99).map(|_| rec("big", "false", &["common"])).collect();
        batch.push(rec("tiny", "false", &["rare"]));
        assert_eq!(aggregate(&batch, RecordField::Source).get("tiny").unwrap().count, 1);
        assert_eq!(aggregate(&batch, RecordField::Tag).get("rare").unwrap().count, 1);
        assert!(aggregate(&batch, RecordField::Tag).get(OTHER).is_none());
    }
}
