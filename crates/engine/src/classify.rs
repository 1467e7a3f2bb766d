//! Classify — priority-ordered structural matching of raw lines.

use tracing::debug;

use crate::grammar::{GrammarError, GrammarSet, LineMatch};
use crate::model::ClassifyError;

/// Outcome of classifying one raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'a> {
    /// CSV header row; carries no data and is discarded by callers.
    Header,
    /// The first grammar (in priority order) that structurally matched.
    Matched(LineMatch<'a>),
}

/// Tries each line grammar in fixed priority order and returns the
/// first structural match.
///
/// Matching is stateless and idempotent: re-classifying the same line
/// always yields the same result, and classification never mutates
/// anything on failure.
pub struct LineClassifier {
    grammars: GrammarSet,
}

impl LineClassifier {
    pub fn new() -> Result<Self, GrammarError> {
        Ok(Self {
            grammars: GrammarSet::new()?,
        })
    }

    /// Classify one raw line.
    ///
    /// The header grammar runs first so the header row can never
    /// false-positive against a data grammar. A non-header line
    /// matching nothing is a hard classification failure; what the
    /// caller does with it is policy, not the classifier's concern.
    pub fn classify<'a>(&self, line: &'a str) -> Result<Classification<'a>, ClassifyError> {
        if self.grammars.header().try_match(line).is_some() {
            return Ok(Classification::Header);
        }

        for grammar in self.grammars.ordered() {
            if let Some(found) = grammar.try_match(line) {
                if found.is_empty() {
                    return Err(ClassifyError::EmptyCapture {
                        grammar: grammar.name(),
                    });
                }
                debug!(grammar = grammar.name(), "line classified");
                return Ok(Classification::Matched(found));
            }
        }

        Err(ClassifyError::UnrecognizedLine {
            line: line.to_string(),
        })
    }

    /// Loose last-resort match for the lenient unknown-line policy: any
    /// HTTP method followed by a URL, anywhere on the line.
    pub fn classify_fallback<'a>(&self, line: &'a str) -> Option<LineMatch<'a>> {
        self.grammars.fallback().try_match(line)
    }
}

// ── Tests ───────────────────────────────────────────────────────
