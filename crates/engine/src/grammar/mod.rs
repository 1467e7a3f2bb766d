//! Grammar module — pattern fragments and the composed line grammars.
//!
//! - `fragment.rs`: composable named pattern pieces
//! - `lines.rs`: the complete line grammars, in match-priority order

pub mod fragment;
pub mod lines;

pub use fragment::Fragment;
pub use lines::{slot, GrammarError, GrammarSet, LineGrammar, LineMatch};

/// Fixed path prefix of the API surface this engine understands.
pub const API_PATH_PREFIX: &str = "/ils/pcubed/api/tenants/";

/// Literal token identifying an exported CSV header row.
pub const HEADER_TOKEN: &str = "record.log";
