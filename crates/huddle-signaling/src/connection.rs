//! Live socket handles and the pool of all connected clients.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use huddle_auth::claims::Identity;
use huddle_core::types::id::UserId;

use crate::message::ServerEvent;

/// Unique connection identifier. A reconnect always yields a new one;
/// handles are never reused.
pub type ConnectionId = Uuid;

/// A handle to a single client connection.
///
/// Holds the sender half of the outbound channel plus the trusted identity
/// the gate attached at connect time. Delivery is fire-and-forget: a full
/// buffer drops the event rather than blocking the sender.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Verified identity attached by the connection gate.
    pub identity: Identity,
    /// Sender for outbound events.
    sender: mpsc::Sender<ServerEvent>,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still live.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle.
    pub fn new(identity: Identity, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identity,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// The user this connection belongs to.
    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    /// Queue an outbound event for this connection.
    ///
    /// Returns `false` when the event was dropped (closed connection or a
    /// stalled client with a full buffer).
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check whether the connection is still live.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection closed; subsequent sends are suppressed.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

/// Thread-safe pool of every live connection, available or not.
///
/// Holds no cross-entry invariants; those live in the coordinator state.
#[derive(Debug, Default)]
pub struct SocketPool {
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl SocketPool {
    /// Creates a new empty pool.
    pub fn new() -> Self {
        Self {
            by_id: DashMap::new(),
        }
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.remove(conn_id).map(|(_, handle)| handle)
    }

    /// Gets a connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    /// Returns all connection handles.
    pub fn all(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns the total connection count.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
