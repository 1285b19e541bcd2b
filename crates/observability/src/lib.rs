//! Logging setup and per-request correlation shared by every binary.

/// Initialize process-wide logging.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    subscriber::init();
}

/// Subscriber configuration (filters, JSON layer).
pub mod subscriber;

/// Request correlation (request ids, per-request spans).
pub mod request;

pub use request::{RequestId, request_span};
