//! Model — the canonical record every dialect is normalized into.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    /// No grammar matched a non-header line: the batch hit a new,
    /// unhandled log shape. The offending text is reported verbatim to
    /// ease grammar authoring.
    #[error("line matched no known grammar, add one: ------->{line}<-------")]
    UnrecognizedLine { line: String },

    /// A grammar matched structurally but captured nothing. This is a
    /// grammar-authoring bug, never a data problem.
    #[error("grammar '{grammar}' matched but captured no fields")]
    EmptyCapture { grammar: &'static str },
}

/// Unit suffix attached to a response-time literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Micros,
    Millis,
    Seconds,
}

impl TimeUnit {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "µs" => Some(TimeUnit::Micros),
            "ms" => Some(TimeUnit::Millis),
            "s" => Some(TimeUnit::Seconds),
            _ => None,
        }
    }
}

/// A captured response time: the bare numeral plus the unit the line
/// used, kept separate so averaging can never confuse ms with s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RespTime {
    pub value: String,
    pub unit: Option<TimeUnit>,
}

impl RespTime {
    /// The value converted to milliseconds. Unitless values are read as
    /// milliseconds, the dominant dialect.
    pub fn as_millis(&self) -> Option<f64> {
        let value: f64 = self.value.parse().ok()?;
        Some(match self.unit {
            Some(TimeUnit::Micros) => value / 1000.0,
            Some(TimeUnit::Seconds) => value * 1000.0,
            Some(TimeUnit::Millis) | None => value,
        })
    }
}

/// Detail block extracted from upstream connection failure lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamError {
    pub error_message: Option<String>,
    pub client: Option<String>,
    pub server: Option<String>,
    pub upstream: Option<String>,
    pub host: Option<String>,
    pub referrer: Option<String>,
}

/// The canonical API-call record.
///
/// Every successfully classified line produces exactly one of these;
/// which optional fields are present depends on the dialect that
/// matched.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRecord {
    pub method: Option<String>,

    /// Request path when it matched the known API surface. At most one
    /// of `api_url` / `non_api_url` is set, never both.
    pub api_url: Option<String>,
    pub non_api_url: Option<String>,

    pub tenant: Option<String>,
    /// Tenant-qualified resource type, e.g. `pcubed-uss/entries`.
    pub api_type: Option<String>,
    /// Resource type with the tenant stripped.
    pub api_kind: Option<String>,

    /// Resolved from whichever of the three aliased captures fired.
    pub bottleneck_uid: Option<String>,
    pub plant_uid: Option<String>,
    pub org_uid: Option<String>,
    pub loss_reason_uid: Option<String>,

    pub resp_code: Option<String>,
    pub resp_time: Option<RespTime>,

    pub upstream_error: Option<UpstreamError>,

    /// The original input line, verbatim.
    pub raw_log: String,
}

impl ApiRecord {
    /// Aggregation key: the API type when known, else the catch-all URL.
    pub fn endpoint_key(&self) -> &str {
        self.api_type
            .as_deref()
            .or(self.non_api_url.as_deref())
            .unwrap_or("(no-url)")
    }

    /// Catch-all record for a line no grammar recognized (lenient
    /// policy only): the whole line becomes its own non-API bucket.
    pub fn catch_all(line: &str) -> Self {
        Self {
            method: None,
            api_url: None,
            non_api_url: Some(line.to_string()),
            tenant: None,
            api_type: None,
            api_kind: None,
            bottleneck_uid: None,
            plant_uid: None,
            org_uid: None,
            loss_reason_uid: None,
            resp_code: None,
            resp_time: None,
            upstream_error: None,
            raw_log: line.to_string(),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────
