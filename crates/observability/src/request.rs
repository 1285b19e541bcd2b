//! Per-request correlation.
//!
//! Every authorization-relevant request gets a fresh id; the span carries it
//! together with the caller's identity claim so resolver events logged inside
//! the span can be tied back to one request.

use core::fmt;

use tracing::Span;
use uuid::Uuid;

/// Correlation id for one inbound request (UUID v7, time-ordered).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Span for one request with a fresh [`RequestId`].
///
/// `identity` is the raw identity claim; an absent claim is recorded as empty.
pub fn request_span(identity: Option<&str>) -> Span {
    request_span_with(RequestId::new(), identity)
}

pub fn request_span_with(request_id: RequestId, identity: Option<&str>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id,
        identity = identity.unwrap_or_default(),
    )
}
