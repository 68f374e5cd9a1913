//! `PendingOutbound` (§3): the map from an outbound request's id to the
//! Waiter that completes when a matching `Response`/`Error` arrives, or when
//! the caller cancels, or when the session shuts down.

use dashmap::DashMap;
use mcp_types::JSONRPCErrorError;
use mcp_types::RequestId;
use tokio::sync::oneshot;

/// What eventually completes a Waiter.
#[derive(Debug)]
pub enum PendingOutcome {
    Response(serde_json::Value),
    Error(JSONRPCErrorError),
    /// A local `$/cancelled` was sent (or requested) for this id.
    Cancelled,
    /// The session tore down while this request was outstanding.
    ShuttingDown,
}

/// `map<RequestId, Waiter>` (§3). At most one Waiter per id; enforced by
/// `insert` overwriting (and thereby abandoning) any prior entry under the
/// same id, which cannot happen in practice because ids are minted fresh by
/// [`crate::id_gen::RequestIdGenerator`].
#[derive(Default)]
pub struct PendingOutbound {
    waiters: DashMap<RequestId, oneshot::Sender<PendingOutcome>>,
}

impl PendingOutbound {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: RequestId) -> oneshot::Receiver<PendingOutcome> {
        let (tx, rx) = oneshot::channel();
        self.waiters.insert(id, tx);
        rx
    }

    pub fn remove(&self, id: &RequestId) {
        self.waiters.remove(id);
    }

    /// Completes the Waiter for `id`, if one is still registered. Returns
    /// `false` when no Waiter is found (an unknown or already-completed id),
    /// which callers treat as "diagnostic, then drop" per §8.
    pub fn complete(&self, id: &RequestId, outcome: PendingOutcome) -> bool {
        match self.waiters.remove(id) {
            Some((_, tx)) => {
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }

    /// Drains every outstanding Waiter, completing each with
    /// [`PendingOutcome::ShuttingDown`]. Used by session teardown (§4.3).
    pub fn shut_down_all(&self) {
        let ids: Vec<RequestId> = self.waiters.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            self.complete(&id, PendingOutcome::ShuttingDown);
        }
    }
}
