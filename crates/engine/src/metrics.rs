//! Metrics — owned per-endpoint aggregation table.
//!
//! The table is explicitly passed, never ambient: callers `ingest`
//! records in input order and read results through `snapshot`. A
//! rejected line never reaches `ingest`, so failures contribute nothing
//! to the aggregate.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::ApiRecord;

/// Histogram bucket label for records that carried no response code.
pub const NO_CODE_BUCKET: &str = "(none)";

#[derive(Debug, Default, Clone)]
struct EndpointEntry {
    hits: u64,
    resp_time_sum_ms: f64,
    resp_time_count: u64,
    codes: BTreeMap<String, u64>,
}

/// Per-endpoint metrics: hit counts, running average response time, and
/// a response-code histogram.
#[derive(Debug, Default)]
pub struct EndpointTable {
    entries: BTreeMap<String, EndpointEntry>,
    records: u64,
}

impl EndpointTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record in. `override_ms` — the optional second CSV
    /// column — takes precedence over the time captured from the line.
    pub fn ingest(&mut self, record: &ApiRecord, override_ms: Option<f64>) {
        let entry = self
            .entries
            .entry(record.endpoint_key().to_string())
            .or_default();
        entry.hits += 1;

        let millis =
            override_ms.or_else(|| record.resp_time.as_ref().and_then(|t| t.as_millis()));
        if let Some(ms) = millis {
            entry.resp_time_sum_ms += ms;
            entry.resp_time_count += 1;
        }

        let bucket = record
            .resp_code
            .clone()
            .unwrap_or_else(|| NO_CODE_BUCKET.to_string());
        *entry.codes.entry(bucket).or_insert(0) += 1;

        self.records += 1;
    }

    /// Total records folded in so far.
    pub fn records(&self) -> u64 {
        self.records
    }

    /// A read-only snapshot suitable for rendering or export. Rows are
    /// ordered by endpoint key.
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            records: self.records,
            rows: self
                .entries
                .iter()
                .map(|(endpoint, entry)| EndpointRow {
                    endpoint: endpoint.clone(),
                    hits: entry.hits,
                    avg_resp_time_ms: if entry.resp_time_count > 0 {
                        Some(entry.resp_time_sum_ms / entry.resp_time_count as f64)
                    } else {
                        None
                    },
                    codes: entry.codes.clone(),
                })
                .collect(),
        }
    }
}

/// The whole table at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct TableSnapshot {
    pub records: u64,
    pub rows: Vec<EndpointRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EndpointRow {
    pub endpoint: String,
    pub hits: u64,
    pub avg_resp_time_ms: Option<f64>,
    /// Response-code histogram, including the [`NO_CODE_BUCKET`].
    pub codes: BTreeMap<String, u64>,
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RespTime, TimeUnit};

    fn record(endpoint: &str, code: Option<&str>, ms: Option<f64>) -> ApiRecord {
        let mut r = ApiRecord::catch_all("raw");
        r.non_api_url = None;
        r.api_type = Some(endpoint.to_string());
        r.resp_code = code.map(str::to_string);
        r.resp_time = ms.map(|v| RespTime {
            value: v.to_string(),
            unit: Some(TimeUnit::Millis),
        });
        r
    }

    #[test]
    fn test_empty_table_snapshot() {
        let table = EndpointTable::new();
        let snap = table.snapshot();
        assert_eq!(snap.records, 0);
        assert!(snap.rows.is_empty());
    }

    #[test]
    fn test_hits_and_average_accumulate() {
        let mut table = EndpointTable::new();
        table.ingest(&record("t1/entries", Some("200"), Some(70.0)), None);
        table.ingest(&record("t1/entries", Some("200"), Some(90.0)), None);
        table.ingest(&record("t1/network", Some("200"), Some(10.0)), None);

        let snap = table.snapshot();
        assert_eq!(snap.records, 3);
        assert_eq!(snap.rows.len(), 2);

        let entries = &snap.rows[0];
        assert_eq!(entries.endpoint, "t1/entries");
        assert_eq!(entries.hits, 2);
        assert_eq!(entries.avg_resp_time_ms, Some(80.0));
    }

    #[test]
    fn test_override_takes_precedence() {
        let mut table = EndpointTable::new();
        table.ingest(&record("t1/entries", Some("200"), Some(70.0)), Some(7.0));
        let snap = table.snapshot();
        assert_eq!(snap.rows[0].avg_resp_time_ms, Some(7.0));
    }

    #[test]
    fn test_code_histogram_with_no_code_bucket() {
        let mut table = EndpointTable::new();
        table.ingest(&record("t1/entries", Some("200"), None), None);
        table.ingest(&record("t1/entries", Some("200"), None), None);
        table.ingest(&record("t1/entries", Some("503"), None), None);
        table.ingest(&record("t1/entries", None, None), None);

        let snap = table.snapshot();
        let codes = &snap.rows[0].codes;
        assert_eq!(codes.get("200"), Some(&2));
        assert_eq!(codes.get("503"), Some(&1));
        assert_eq!(codes.get(NO_CODE_BUCKET), Some(&1));
    }

    #[test]
    fn test_missing_times_excluded_from_average() {
        let mut table = EndpointTable::new();
        table.ingest(&record("t1/entries", Some("200"), Some(50.0)), None);
        table.ingest(&record("t1/entries", Some("200"), None), None);

        let snap = table.snapshot();
        assert_eq!(snap.rows[0].hits, 2);
        // One timed sample only; the untimed hit must not drag the mean.
        assert_eq!(snap.rows[0].avg_resp_time_ms, Some(50.0));
    }

    #[test]
    fn test_non_api_bucket_keyed_by_url() {
        let mut table = EndpointTable::new();
        let mut r = ApiRecord::catch_all("raw");
        r.non_api_url = Some("/favicon.ico".into());
        table.ingest(&r, None);

        let snap = table.snapshot();
        assert_eq!(snap.rows[0].endpoint, "/favicon.ico");
    }
}
