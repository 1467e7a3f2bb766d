//! Normalize — explicit construction of the canonical record from one
//! grammar match.
//!
//! The mapping from capture-slot name to canonical field lives here and
//! only here, so grammar internals never leak into the public record
//! shape.

use crate::grammar::{slot, LineMatch};
use crate::model::{ApiRecord, RespTime, TimeUnit, UpstreamError};

/// Build the canonical record for a successful match on `line`.
pub fn normalize(found: &LineMatch<'_>, line: &str) -> ApiRecord {
    let upstream_error = non_empty(found, slot::ERROR_MESSAGE).map(|message| UpstreamError {
        error_message: Some(message.to_string()),
        client: owned(found, slot::CLIENT),
        server: owned(found, slot::SERVER),
        upstream: owned(found, slot::UPSTREAM),
        host: owned(found, slot::HOST),
        referrer: owned(found, slot::REFERRER),
    });

    // Error lines carry no response metadata; their nested request
    // fragment still populates the URL fields below.
    let (resp_code, resp_time) = if upstream_error.is_some() {
        (None, None)
    } else {
        (owned(found, slot::RESP_CODE), resp_time(found))
    };

    ApiRecord {
        method: owned(found, slot::METHOD),
        api_url: owned(found, slot::API_URL),
        non_api_url: owned(found, slot::NON_API_URL),
        tenant: owned(found, slot::TENANT),
        api_type: owned(found, slot::API_TYPE),
        api_kind: owned(found, slot::API_KIND),
        bottleneck_uid: bottleneck_uid(found),
        plant_uid: owned(found, slot::PLANT_UID),
        org_uid: owned(found, slot::ORG_UID),
        loss_reason_uid: owned(found, slot::LOSS_REASON_UID),
        resp_code,
        resp_time,
        upstream_error,
        // Always set, unconditionally, as the last step: every record
        // stays traceable to its source line.
        raw_log: line.to_string(),
    }
}

/// The bottleneck identifier is an alias over three mutually exclusive
/// captures. First non-empty wins, in declared priority order:
/// entries/targets query, then bottlenecks/{uid} path, then the
/// loss_reasons optional query.
fn bottleneck_uid(found: &LineMatch<'_>) -> Option<String> {
    non_empty(found, slot::BN_UID_QUERY)
        .or_else(|| non_empty(found, slot::BN_UID_PATH))
        .or_else(|| non_empty(found, slot::BN_UID_OPT))
        .map(str::to_string)
}

fn resp_time(found: &LineMatch<'_>) -> Option<RespTime> {
    let value = non_empty(found, slot::RESP_TIME)?.to_string();
    let unit = found.get(slot::RESP_UNIT).and_then(TimeUnit::parse);
    Some(RespTime { value, unit })
}

fn non_empty<'a>(found: &LineMatch<'a>, name: &str) -> Option<&'a str> {
    found.get(name).filter(|value| !value.is_empty())
}

fn owned(found: &LineMatch<'_>, name: &str) -> Option<String> {
    non_empty(found, name).map(str::to_string)
}

// ── Tests ───────────────────────────────────────────────────────
