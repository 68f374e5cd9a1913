//! Fresh outbound request ids (§3 `PendingOutbound`'s uniqueness invariant:
//! "id uniqueness within a session is guaranteed by a monotonic counter
//! combined with a session-scoped random prefix").

use mcp_types::RequestId;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use uuid::Uuid;

/// Generates ids of the form `<session-prefix>-<n>`, unique across every
/// `Session` in the process (the prefix) and within one session (the
/// counter), so two sessions in the same process can never mint colliding
/// ids.
pub struct RequestIdGenerator {
    prefix: String,
    next: AtomicI64,
}

impl RequestIdGenerator {
    pub fn new() -> Self {
        Self {
            prefix: Uuid::now_v7().simple().to_string()[..8].to_string(),
            next: AtomicI64::new(0),
        }
    }

    /// Returns `id` unchanged unless it is [`RequestId::Unset`], in which
    /// case a fresh id is stamped in.
    pub fn stamp(&self, id: RequestId) -> RequestId {
        if id.is_unset() { self.next() } else { id }
    }

    pub fn next(&self) -> RequestId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        RequestId::String(format!("{}-{n}", self.prefix))
    }
}

impl Default for RequestIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
