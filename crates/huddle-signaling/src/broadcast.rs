//! Broadcast emitter — pushes presence snapshots to every connection.

use crate::connection::SocketPool;
use crate::message::ServerEvent;
use crate::presence::PresenceSummary;

/// Pushes one presence snapshot to all connected clients.
///
/// Every connection gets the snapshot, not just networking-eligible ones —
/// offline clients may be browsing the directory. Delivery per connection
/// is independent fire-and-forget, so a stalled client never delays the
/// snapshot reaching others.
pub(crate) fn emit(sockets: &SocketPool, users: Vec<PresenceSummary>) {
    let event = ServerEvent::PresenceSnapshot { users };
    let handles = sockets.all();

    tracing::debug!(connections = handles.len(), "Broadcasting presence snapshot");
    for handle in handles {
        handle.send(event.clone());
    }
}
