//! `InflightInbound` (§3): the map from an in-progress inbound request's id
//! to its cancel handle. Entries are inserted by the Run loop *before* the
//! request is dispatched to a handler task, so a `$/cancelled` arriving
//! concurrently with handler startup is never lost (§4.3, §5).

use dashmap::DashMap;
use mcp_types::RequestId;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio_util::sync::CancellationToken;

/// A handle a dispatched handler task owns for the lifetime of one request.
#[derive(Clone)]
pub struct InflightEntry {
    pub token: CancellationToken,
    peer_cancelled: Arc<AtomicBool>,
}

impl InflightEntry {
    /// Whether this request's cancellation came from the peer's
    /// `$/cancelled`, as opposed to session shutdown. The Run loop uses this
    /// to decide whether to suppress the response (§4.3: "on cancellation
    /// initiated by the peer ... send no response").
    pub fn is_peer_cancelled(&self) -> bool {
        self.peer_cancelled.load(Ordering::Acquire)
    }
}

#[derive(Default)]
pub struct InflightInbound {
    handles: DashMap<RequestId, InflightEntry>,
}

impl InflightInbound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: RequestId) -> InflightEntry {
        let entry = InflightEntry {
            token: CancellationToken::new(),
            peer_cancelled: Arc::new(AtomicBool::new(false)),
        };
        self.handles.insert(id, entry.clone());
        entry
    }

    /// Cancels the handle for `id`, if present. An unknown id (peer sent
    /// `$/cancelled` for a request that never existed, or already completed)
    /// is ignored silently per §8's boundary cases; the `bool` return is for
    /// callers that want to log a diagnostic, not to signal an error.
    pub fn cancel(&self, id: &RequestId) -> bool {
        match self.handles.get(id) {
            Some(entry) => {
                entry.peer_cancelled.store(true, Ordering::Release);
                entry.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Removes and returns the entry for `id`, called once its handler has
    /// terminated so the Run loop can decide whether to write a response.
    pub fn take(&self, id: &RequestId) -> Option<InflightEntry> {
        self.handles.remove(id).map(|(_, entry)| entry)
    }

    /// Cancels every outstanding handle. Used by session teardown (§4.3);
    /// does not mark entries peer-cancelled, since by the time shutdown
    /// reaches here the transport is going away regardless of whether a
    /// response gets written.
    pub fn cancel_all(&self) {
        for entry in self.handles.iter() {
            entry.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_marks_peer_cancelled_and_fires_the_token() {
        let inflight = InflightInbound::new();
        let id = RequestId::Integer(1);
        let entry = inflight.insert(id.clone());
        assert!(inflight.cancel(&id));
        assert!(entry.is_peer_cancelled());
        assert!(entry.token.is_cancelled());
    }

    #[test]
    fn cancel_on_unknown_id_is_ignored() {
        let inflight = InflightInbound::new();
        assert!(!inflight.cancel(&RequestId::Integer(404)));
    }

    #[test]
    fn distinct_ids_have_independent_tokens() {
        let inflight = InflightInbound::new();
        let a = inflight.insert(RequestId::Integer(1));
        let b = inflight.insert(RequestId::Integer(2));
        inflight.cancel(&RequestId::Integer(1));
        assert!(a.token.is_cancelled());
        assert!(!b.token.is_cancelled());
    }

    #[test]
    fn take_removes_the_entry() {
        let inflight = InflightInbound::new();
        let id = RequestId::Integer(1);
        inflight.insert(id.clone());
        assert!(inflight.take(&id).is_some());
        assert!(inflight.take(&id).is_none());
    }
}
