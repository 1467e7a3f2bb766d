//! Log-line classification and per-endpoint metrics engine.
//!
//! Converts raw access-log lines (several incompatible dialects) into a
//! single canonical record shape, then folds those records into a
//! per-endpoint metrics table.
//!
//! # Architecture
//!
//! - `grammar/`: named pattern fragments and the composed line grammars
//! - `classify.rs`: priority-ordered first-match classification
//! - `normalize.rs`: capture slots -> canonical record construction
//! - `model.rs`: canonical record, sub-records, and error types
//! - `metrics.rs`: owned per-endpoint aggregation table
//!
//! # Guarantees
//!
//! - Matching is stateless and idempotent; grammars are compiled once
//!   and reused for every line
//! - Every classified line produces exactly one record, traceable back
//!   to the source line via `raw_log`
//! - A line matching no grammar is a classification failure, never a
//!   partially populated record

pub mod grammar;
pub mod classify;
pub mod normalize;
pub mod model;
pub mod metrics;

// Re-export commonly used types
pub use classify::{Classification, LineClassifier};
pub use model::{ApiRecord, ClassifyError};
pub use normalize::normalize;
