//! Lines — the complete line grammars, in match-priority order.
//!
//! Each supported log dialect gets one compiled [`LineGrammar`] built
//! from the shared fragment vocabulary below. Order matters everywhere:
//! the grammar list is tried first-match-wins, and every alternation
//! inside a fragment prefers its earlier branches.

use regex::Regex;
use thiserror::Error;

use super::fragment::Fragment;
use super::{API_PATH_PREFIX, HEADER_TOKEN};

/// Capture-slot names shared between the grammars and the normalizer.
pub mod slot {
    pub const METHOD: &str = "method";
    pub const API_URL: &str = "api_url";
    pub const NON_API_URL: &str = "non_api_url";
    pub const API_TYPE: &str = "api_type";
    pub const TENANT: &str = "tenant";
    pub const API_KIND: &str = "api_kind";
    /// Bottleneck UID from an `entries`/`targets` query parameter.
    pub const BN_UID_QUERY: &str = "bn_uid_query";
    /// Bottleneck UID embedded in a `bottlenecks/{uid}` path.
    pub const BN_UID_PATH: &str = "bn_uid_path";
    /// Optional bottleneck UID from a `loss_reasons` query parameter.
    pub const BN_UID_OPT: &str = "bn_uid_opt";
    pub const PLANT_UID: &str = "plant_uid";
    pub const ORG_UID: &str = "org_uid";
    pub const LOSS_REASON_UID: &str = "loss_reason_uid";
    pub const RESP_CODE: &str = "resp_code";
    pub const RESP_TIME: &str = "resp_time";
    pub const RESP_UNIT: &str = "resp_unit";
    pub const ERROR_MESSAGE: &str = "error_message";
    pub const CLIENT: &str = "client";
    pub const SERVER: &str = "server";
    pub const UPSTREAM: &str = "upstream";
    pub const HOST: &str = "host";
    pub const REFERRER: &str = "referrer";
}

// Grammar names, in match-priority order.
pub const HEADER_LINE: &str = "header-line";
pub const STANDARD_REQUEST: &str = "standard-request";
pub const INVERTED_REQUEST: &str = "inverted-request";
pub const UPSTREAM_ERROR: &str = "upstream-error";
pub const BARE_REQUEST: &str = "bare-request";
/// Loose last-resort grammar used only by the lenient unknown-line policy.
pub const ANY_REQUEST: &str = "any-request";

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar '{name}' failed to compile: {source}")]
    BadPattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },
}

/// One log dialect: a compiled pattern and the slots it can capture.
#[derive(Debug)]
pub struct LineGrammar {
    name: &'static str,
    regex: Regex,
    slots: Vec<&'static str>,
}

impl LineGrammar {
    fn compile(name: &'static str, fragment: Fragment) -> Result<Self, GrammarError> {
        let regex = Regex::new(fragment.text())
            .map_err(|source| GrammarError::BadPattern { name, source })?;
        Ok(Self {
            name,
            regex,
            slots: fragment.slots().to_vec(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply this grammar to `line`. Matching is an unanchored search,
    /// as the surrounding timestamp/severity decoration varies by
    /// dialect and is not part of any grammar.
    pub fn try_match<'a>(&self, line: &'a str) -> Option<LineMatch<'a>> {
        let caps = self.regex.captures(line)?;
        let slots = self
            .slots
            .iter()
            .filter_map(|&s| caps.name(s).map(|m| (s, m.as_str())))
            .collect();
        Some(LineMatch {
            grammar: self.name,
            slots,
        })
    }
}

/// A successful match: the grammar that fired and the slot substrings it
/// captured. Ephemeral; consumed immediately by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch<'a> {
    grammar: &'static str,
    slots: Vec<(&'static str, &'a str)>,
}

impl<'a> LineMatch<'a> {
    #[cfg(test)]
    pub(crate) fn synthetic(grammar: &'static str, slots: Vec<(&'static str, &'a str)>) -> Self {
        Self { grammar, slots }
    }

    pub fn grammar(&self) -> &'static str {
        self.grammar
    }

    pub fn get(&self, slot: &str) -> Option<&'a str> {
        self.slots
            .iter()
            .find(|(name, _)| *name == slot)
            .map(|(_, value)| *value)
    }

    /// True when the grammar matched structurally but captured nothing.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

// ── Fragment vocabulary ─────────────────────────────────────────

/// 8-4-4-4-12 hex-grouped identifier. The final group deliberately
/// admits `a`-`h`, matching what the log producers actually emit.
fn uid() -> Fragment {
    Fragment::raw(r"[A-Fa-f0-9]{8}(?:-[A-Fa-f0-9]{4}){3}-[A-Fa-h0-9]{12}")
}

fn http_method() -> Fragment {
    Fragment::capture(slot::METHOD, Fragment::raw("GET|POST|PUT|DELETE|PATCH"))
}

/// HTTP version marker including the closing quote of the request
/// fragment it always terminates, e.g. `HTTP/1.1"`.
fn http_version() -> Fragment {
    Fragment::raw(r#"HTTP/\d\.\d""#)
}

/// Tenant-agnostic resource kind. Alternation order is priority: query
/// forms before their bare counterparts, and `bottlenecks/{uid}` before
/// bare `bottlenecks` so the path-embedded UID capture can fire.
fn resource_kind() -> Fragment {
    Fragment::alt([
        Fragment::seq([
            Fragment::raw(r"(?:entries|targets)\?bottleneck_uid="),
            Fragment::capture(slot::BN_UID_QUERY, uid()),
        ]),
        Fragment::raw(r"sse_socket\?subs"),
        Fragment::raw("data_entry"),
        Fragment::raw("logo"),
        Fragment::raw("client_languages"),
        Fragment::raw("clients"),
        Fragment::seq([
            Fragment::raw("bottlenecks/"),
            Fragment::capture(slot::BN_UID_PATH, uid()),
        ]),
        Fragment::raw("bottlenecks"),
        Fragment::raw("entries"),
        Fragment::raw("network"),
        Fragment::raw("sub_losses"),
        Fragment::raw("last_updated"),
        Fragment::raw(r"global_losses\?raw"),
        Fragment::seq([
            Fragment::raw(r"loss_types\?plant_uid="),
            Fragment::capture(slot::PLANT_UID, uid()),
        ]),
        Fragment::seq([
            Fragment::raw(r"loss_reasons\?opt_bottleneck_uid="),
            Fragment::capture(slot::BN_UID_OPT, uid()),
        ]),
        Fragment::seq([
            Fragment::raw(r"loss_reasons\?loss_reason_guid="),
            Fragment::capture(slot::LOSS_REASON_UID, uid()),
        ]),
        Fragment::seq([
            Fragment::raw(r"projects\?organization_uid="),
            Fragment::capture(slot::ORG_UID, Fragment::raw(r"\w*")),
        ]),
        Fragment::raw(r"watches\?raw"),
    ])
}

/// `tenant/resource-kind`, the tenant-qualified API type.
fn api_type() -> Fragment {
    Fragment::capture(
        slot::API_TYPE,
        Fragment::seq([
            Fragment::capture(slot::TENANT, Fragment::raw(r"\S+")),
            Fragment::raw("/"),
            Fragment::capture(slot::API_KIND, resource_kind()),
        ]),
    )
}

fn api_url() -> Fragment {
    Fragment::capture(
        slot::API_URL,
        Fragment::seq([
            Fragment::lit(API_PATH_PREFIX),
            api_type(),
            Fragment::raw(r"\S*"),
        ]),
    )
}

/// A request path: the known API surface when it matches, otherwise a
/// catch-all non-API URL. The two branches are mutually exclusive by
/// construction.
fn generic_url() -> Fragment {
    Fragment::alt([
        api_url(),
        Fragment::capture(slot::NON_API_URL, Fragment::raw(r"\S+")),
    ])
}

fn resp_code() -> Fragment {
    Fragment::capture(slot::RESP_CODE, Fragment::raw(r"\d{3}"))
}

/// Response time: the bare numeral and its unit suffix captured
/// separately, so the unit is never smuggled into the value.
fn resp_time() -> Fragment {
    Fragment::seq([
        Fragment::capture(slot::RESP_TIME, Fragment::raw(r"\d+(?:\.\d+)?")),
        Fragment::capture(slot::RESP_UNIT, Fragment::raw("µs|ms|s")).opt(),
    ])
}

/// Sentinel tokens marking the end of meaningful content on a line.
fn trailing_noise() -> Fragment {
    Fragment::alt([
        Fragment::lit("\"-\""),
        Fragment::lit("\"https:"),
        Fragment::lit("→"),
        Fragment::lit("× JSON"),
    ])
}

// ── Composed line grammars ──────────────────────────────────────

/// Web-server access line: method before response code.
fn standard_request() -> Fragment {
    Fragment::spaced([
        http_method(),
        generic_url(),
        http_version(),
        resp_code(),
        resp_time(),
        trailing_noise(),
    ])
}

/// Application-proxy line: response code before method.
fn inverted_request() -> Fragment {
    Fragment::spaced([
        resp_code(),
        resp_time(),
        http_method(),
        generic_url(),
        trailing_noise(),
    ])
}

/// Free-text line emitted when an upstream connection fails, with a
/// quoted request fragment nested inside.
fn upstream_error() -> Fragment {
    Fragment::seq([
        Fragment::raw(r"\[error\] \d+#\d+: "),
        Fragment::capture(slot::ERROR_MESSAGE, Fragment::raw(".*")),
        Fragment::raw(", client: "),
        Fragment::capture(slot::CLIENT, Fragment::raw(".*")),
        Fragment::raw(", server: "),
        Fragment::capture(slot::SERVER, Fragment::raw(".*")),
        Fragment::raw(r#", request: ""#),
        Fragment::spaced([http_method(), generic_url(), http_version()]),
        Fragment::raw(r#", upstream: ""#),
        Fragment::capture(slot::UPSTREAM, Fragment::raw(".*")),
        Fragment::raw(r#"", host: ""#),
        Fragment::capture(slot::HOST, Fragment::raw(".*")),
        Fragment::raw(r#"", referrer: ""#),
        Fragment::capture(slot::REFERRER, Fragment::raw(".*")),
        Fragment::raw("\""),
    ])
}

/// Minimal line format with no response metadata.
fn bare_request() -> Fragment {
    Fragment::seq([
        Fragment::raw("Request: "),
        Fragment::spaced([http_method(), generic_url()]),
    ])
}

/// Any method followed by any URL, anywhere on the line. Never part of
/// the main priority order; only the lenient unknown-line policy
/// reaches for it.
fn any_request() -> Fragment {
    Fragment::spaced([http_method(), generic_url()])
}

/// The complete dialect set.
///
/// Constructed once at process start and reused for every line; matching
/// holds no mutable state.
#[derive(Debug)]
pub struct GrammarSet {
    header: LineGrammar,
    ordered: Vec<LineGrammar>,
    fallback: LineGrammar,
}

impl GrammarSet {
    pub fn new() -> Result<Self, GrammarError> {
        Ok(Self {
            header: LineGrammar::compile(HEADER_LINE, Fragment::lit(HEADER_TOKEN))?,
            ordered: vec![
                LineGrammar::compile(STANDARD_REQUEST, standard_request())?,
                LineGrammar::compile(INVERTED_REQUEST, inverted_request())?,
                LineGrammar::compile(UPSTREAM_ERROR, upstream_error())?,
                LineGrammar::compile(BARE_REQUEST, bare_request())?,
            ],
            fallback: LineGrammar::compile(ANY_REQUEST, any_request())?,
        })
    }

    /// The header grammar, checked before everything else so the CSV
    /// header row can never false-positive against a data grammar.
    pub fn header(&self) -> &LineGrammar {
        &self.header
    }

    /// Data grammars in match-priority order.
    pub fn ordered(&self) -> &[LineGrammar] {
        &self.ordered
    }

    /// The lenient-policy fallback grammar.
    pub fn fallback(&self) -> &LineGrammar {
        &self.fallback
    }
}

// ── Tests ───────────────────────────────────────────────────────
