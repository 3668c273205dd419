//! Live-reload client registry.
//!
//! Each connected browser gets an mpsc channel; the connection task owns the
//! receiving end and forwards messages over its socket. Broadcasting is best effort:
//! a failed send to one client is logged and the remaining clients are still tried.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

/// The fixed signal telling a browser to refresh.
pub const RELOAD_MESSAGE: &str = "RELOAD";

/// Per-client channel capacity.
const CLIENT_BUFFER: usize = 16;

/// Identifier assigned to a client on registration.
pub type ClientId = usize;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients a send was attempted for
    pub attempted: usize,
    /// Clients the message was queued for
    pub delivered: usize,
    /// Clients whose send failed
    pub failed: Vec<ClientId>,
}

/// Registry of connected live-reload clients.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: RwLock<BTreeMap<ClientId, mpsc::Sender<String>>>,
    next_id: AtomicUsize,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new client.
    ///
    /// # Returns
    ///
    /// Client ID and the receiver the connection should drain
    pub fn register(&self) -> (ClientId, mpsc::Receiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        self.clients.write().insert(id, tx);
        tracing::debug!(client = id, "live-reload client registered");
        (id, rx)
    }

    /// Remove a client, typically once its connection has closed.
    pub fn unregister(&self, id: ClientId) -> bool {
        let removed = self.clients.write().remove(&id).is_some();
        if removed {
            tracing::debug!(client = id, "live-reload client unregistered");
        }
        removed
    }

    /// Number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    /// Check if no clients are registered.
    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    /// Send a message to every registered client.
    ///
    /// Works on a snapshot of the registry so connections may come and go while the
    /// broadcast runs. Each send is isolated: a closed or full channel is logged and
    /// skipped.
    pub fn broadcast(&self, message: &str) -> BroadcastReport {
        let snapshot: Vec<(ClientId, mpsc::Sender<String>)> = self
            .clients
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut report = BroadcastReport {
            attempted: snapshot.len(),
            ..BroadcastReport::default()
        };

        for (id, tx) in snapshot {
            match tx.try_send(message.to_string()) {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    tracing::warn!(client = id, error = %err, "failed to notify live-reload client");
                    report.failed.push(id);
                }
            }
        }

        tracing::debug!(
            attempted = report.attempted,
            delivered = report.delivered,
            "broadcast complete"
        );
        report
    }

    /// Broadcast [`RELOAD_MESSAGE`].
    pub fn broadcast_reload(&self) -> BroadcastReport {
        self.broadcast(RELOAD_MESSAGE)
    }
}
