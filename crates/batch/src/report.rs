//! Report — rendering and export of the aggregated endpoint table.
//!
//! The text table always goes to stdout; `export` additionally writes a
//! machine-readable file when a report path is configured, picking the
//! format from the extension (`.json`, otherwise CSV).

use std::fs::File;

use chrono::Utc;
use engine::metrics::TableSnapshot;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json write error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render the snapshot as a plain text table, one endpoint per row.
pub fn render_table(snapshot: &TableSnapshot) -> String {
    let width = snapshot
        .rows
        .iter()
        .map(|r| r.endpoint.len())
        .max()
        .unwrap_or(0)
        .max("endpoint".len());

    let mut out = String::new();
    out.push_str(&format!(
        "{:<width$}  {:>6}  {:>12}  codes\n",
        "endpoint", "hits", "avg_ms"
    ));
    for row in &snapshot.rows {
        let avg = match row.avg_resp_time_ms {
            Some(ms) => format!("{ms:.2}"),
            None => "-".to_string(),
        };
        out.push_str(&format!(
            "{:<width$}  {:>6}  {:>12}  {}\n",
            row.endpoint,
            row.hits,
            avg,
            codes_summary(row)
        ));
    }
    out.push_str(&format!("{} records total\n", snapshot.records));
    out
}

/// Write the snapshot to `path`, as JSON or CSV depending on the
/// extension.
pub fn export(snapshot: &TableSnapshot, path: &str) -> Result<(), ReportError> {
    if path.ends_with(".json") {
        write_json(snapshot, path)
    } else {
        write_csv(snapshot, path)
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    #[serde(flatten)]
    snapshot: &'a TableSnapshot,
}

fn write_json(snapshot: &TableSnapshot, path: &str) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_string(),
        source,
    })?;
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        snapshot,
    };
    serde_json::to_writer_pretty(file, &report)?;
    Ok(())
}

fn write_csv(snapshot: &TableSnapshot, path: &str) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|source| ReportError::Create {
        path: path.to_string(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["endpoint", "hits", "avg_resp_time_ms", "codes"])?;
    for row in &snapshot.rows {
        let avg = row
            .avg_resp_time_ms
            .map(|ms| format!("{ms:.2}"))
            .unwrap_or_default();
        writer.write_record([
            row.endpoint.as_str(),
            &row.hits.to_string(),
            &avg,
            &codes_summary(row),
        ])?;
    }
    writer.flush().map_err(|source| ReportError::Create {
        path: path.to_string(),
        source,
    })?;
    Ok(())
}

/// Flatten a row's code histogram into `code:count` pairs.
fn codes_summary(row: &engine::metrics::EndpointRow) -> String {
    row.codes
        .iter()
        .map(|(code, count)| format!("{code}:{count}"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use engine::metrics::EndpointTable;
    use engine::model::{ApiRecord, RespTime, TimeUnit};
    use std::io::Read;

    fn sample_snapshot() -> TableSnapshot {
        let mut table = EndpointTable::new();
        let mut a = ApiRecord::catch_all("raw");
        a.non_api_url = None;
        a.api_type = Some("t1/entries".to_string());
        a.resp_code = Some("200".to_string());
        a.resp_time = Some(RespTime {
            value: "70".to_string(),
            unit: Some(TimeUnit::Millis),
        });
        table.ingest(&a, None);

        let mut b = ApiRecord::catch_all("raw");
        b.non_api_url = Some("/favicon.ico".to_string());
        table.ingest(&b, None);

        table.snapshot()
    }

    #[test]
    fn test_render_table_lists_every_endpoint() {
        let text = render_table(&sample_snapshot());
        assert!(text.contains("t1/entries"));
        assert!(text.contains("/favicon.ico"));
        assert!(text.contains("2 records total"));
        assert!(text.contains("70.00"));
    }

    #[test]
    fn test_render_empty_table() {
        let text = render_table(&EndpointTable::new().snapshot());
        assert!(text.contains("0 records total"));
    }

    #[test]
    fn test_csv_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        export(&sample_snapshot(), path.to_str().unwrap()).unwrap();

        let mut content = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("endpoint,hits,avg_resp_time_ms,codes"));
        assert_eq!(lines.next(), Some("/favicon.ico,1,,(none):1"));
        assert_eq!(lines.next(), Some("t1/entries,1,70.00,200:1"));
    }

    #[test]
    fn test_json_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        export(&sample_snapshot(), path.to_str().unwrap()).unwrap();

        let mut content = String::new();
        std::fs::File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(value.get("generated_at").is_some());
        assert_eq!(value["records"], 2);
        assert_eq!(value["rows"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_codes_summary_joins_pairs() {
        let snap = sample_snapshot();
        let entries = snap
            .rows
            .iter()
            .find(|r| r.endpoint == "t1/entries")
            .unwrap();
        assert_eq!(codes_summary(entries), "200:1");
    }
}
