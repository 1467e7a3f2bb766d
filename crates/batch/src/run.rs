//! Run — the batch pipeline: ingest, classify, normalize, aggregate,
//! report.
//!
//! Lines are processed strictly in input order; the table's running
//! averages depend on it.

use engine::classify::{Classification, LineClassifier};
use engine::metrics::EndpointTable;
use engine::model::ClassifyError;
use engine::normalize::normalize;
use tracing::{debug, info};

use crate::conf::{BatchConfig, UnknownLinePolicy};
use crate::ingest::{self, InputRow};
use crate::report;

pub fn run(config: &BatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let classifier = LineClassifier::new()?;
    let rows = ingest::read_rows(&config.input_path, config.columns)?;
    info!("Read {} rows from {}", rows.len(), config.input_path);

    let table = aggregate(&classifier, &rows, config.policy)?;
    info!("Aggregated {} records", table.records());

    let snapshot = table.snapshot();
    print!("{}", report::render_table(&snapshot));
    if !config.report_path.is_empty() {
        report::export(&snapshot, &config.report_path)?;
        info!("Report written to {}", config.report_path);
    }
    Ok(())
}

/// Classify and fold every row, honoring the unknown-line policy.
pub fn aggregate(
    classifier: &LineClassifier,
    rows: &[InputRow],
    policy: UnknownLinePolicy,
) -> Result<EndpointTable, ClassifyError> {
    let mut table = EndpointTable::new();
    let mut headers = 0u64;
    let mut bucketed = 0u64;

    for row in rows {
        match classifier.classify(&row.line) {
            Ok(Classification::Header) => {
                headers += 1;
            }
            Ok(Classification::Matched(found)) => {
                let record = normalize(&found, &row.line);
                table.ingest(&record, override_ms(row));
            }
            Err(ClassifyError::UnrecognizedLine { line })
                if policy == UnknownLinePolicy::Bucket =>
            {
                // Loose fallback first; failing that, the whole line
                // becomes its own non-API bucket.
                let record = match classifier.classify_fallback(&line) {
                    Some(found) => normalize(&found, &line),
                    None => engine::ApiRecord::catch_all(&line),
                };
                debug!(line = %line, "unrecognized line bucketed");
                bucketed += 1;
                table.ingest(&record, override_ms(row));
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        "Classified {} records ({} header rows skipped, {} bucketed)",
        table.records(),
        headers,
        bucketed
    );
    Ok(table)
}

fn override_ms(row: &InputRow) -> Option<f64> {
    row.resp_time_override
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
}

// ── Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn row(line: &str) -> InputRow {
        InputRow {
            line: line.to_string(),
            resp_time_override: None,
        }
    }

    fn row_with_override(line: &str, ms: &str) -> InputRow {
        InputRow {
            line: line.to_string(),
            resp_time_override: Some(ms.to_string()),
        }
    }

    #[test]
    fn test_header_rows_never_aggregate() {
        let classifier = LineClassifier::new().unwrap();
        let rows = vec![
            row("record.log"),
            row("200 71ms GET /ils/pcubed/api/tenants/t1/entries → x"),
        ];
        let table = aggregate(&classifier, &rows, UnknownLinePolicy::Fail).unwrap();
        assert_eq!(table.records(), 1);
    }

    #[test]
    fn test_strict_policy_aborts_on_unknown_line() {
        let classifier = LineClassifier::new().unwrap();
        let rows = vec![
            row("200 71ms GET /ils/pcubed/api/tenants/t1/entries → x"),
            row("totally novel shape"),
        ];
        let err = aggregate(&classifier, &rows, UnknownLinePolicy::Fail).unwrap_err();
        assert!(err.to_string().contains("totally novel shape"));
    }

    #[test]
    fn test_lenient_policy_uses_fallback_grammar() {
        let classifier = LineClassifier::new().unwrap();
        let rows = vec![row("oddly framed GET /metrics with trailing words")];
        let table = aggregate(&classifier, &rows, UnknownLinePolicy::Bucket).unwrap();
        let snap = table.snapshot();
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.rows[0].endpoint, "/metrics");
    }

    #[test]
    fn test_lenient_policy_buckets_hopeless_lines() {
        let classifier = LineClassifier::new().unwrap();
        let rows = vec![row("no method or url at all")];
        let table = aggregate(&classifier, &rows, UnknownLinePolicy::Bucket).unwrap();
        let snap = table.snapshot();
        assert_eq!(snap.rows[0].endpoint, "no method or url at all");
        assert_eq!(snap.rows[0].hits, 1);
    }

    #[test]
    fn test_override_column_wins_over_captured_time() {
        let classifier = LineClassifier::new().unwrap();
        let rows = vec![row_with_override(
            "200 71ms GET /ils/pcubed/api/tenants/t1/entries → x",
            "9",
        )];
        let table = aggregate(&classifier, &rows, UnknownLinePolicy::Fail).unwrap();
        let snap = table.snapshot();
        assert_eq!(snap.rows[0].avg_resp_time_ms, Some(9.0));
    }

    #[test]
    fn test_mixed_dialects_share_one_endpoint() {
        let classifier = LineClassifier::new().unwrap();
        let rows = vec![
            row("200 70ms GET /ils/pcubed/api/tenants/t1/network → x"),
            row(r#"1.2.3.4 - - "GET /ils/pcubed/api/tenants/t1/network HTTP/1.1" 503 90 "-" tail"#),
        ];
        let table = aggregate(&classifier, &rows, UnknownLinePolicy::Fail).unwrap();
        let snap = table.snapshot();
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.rows[0].endpoint, "t1/network");
        assert_eq!(snap.rows[0].hits, 2);
        assert_eq!(snap.rows[0].avg_resp_time_ms, Some(80.0));
        assert_eq!(snap.rows[0].codes.get("200"), Some(&1));
        assert_eq!(snap.rows[0].codes.get("503"), Some(&1));
    }
}
