//! Ingest — CSV row source feeding the classification pipeline.
//!
//! Row shape is validated here, before any line reaches the core: a row
//! with the wrong column count aborts ingestion.

use std::fs::File;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("csv read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected {expected} columns, got {got}")]
    RowShape {
        row: usize,
        expected: usize,
        got: usize,
    },
}

/// One CSV row: the raw log line plus the optional response-time
/// override carried in the second column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    pub line: String,
    pub resp_time_override: Option<String>,
}

/// Read every row of the file at `path`, in order.
///
/// The reader is configured headerless: the export's header row is a
/// data row here and gets discarded later by the classifier.
pub fn read_rows(path: &str, expected_columns: usize) -> Result<Vec<InputRow>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_string(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() != expected_columns {
            return Err(IngestError::RowShape {
                row: idx + 1,
                expected: expected_columns,
                got: record.len(),
            });
        }
        rows.push(InputRow {
            line: record.get(0).unwrap_or("").to_string(),
            resp_time_override: record.get(1).map(str::to_string),
        });
    }
    Ok(rows)
}

// ── Tests ───────────────────────────────────────────────────────
