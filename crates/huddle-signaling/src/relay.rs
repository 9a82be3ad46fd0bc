//! Signal relay — forwards opaque negotiation payloads between parties.

use huddle_core::types::id::UserId;

use crate::connection::SocketPool;
use crate::message::ServerEvent;
use crate::presence::PresenceRegistry;

/// Forwards `payload` to `to`, tagged with `from` for provenance.
///
/// Pure stateless forwarding keyed by identity: no interpretation, no
/// validation, no buffering. An absent target means the message is dropped
/// without notifying the sender — the negotiation protocol above this
/// layer times out on its own when messages stop arriving.
pub(crate) fn forward(
    presence: &PresenceRegistry,
    sockets: &SocketPool,
    from: UserId,
    to: UserId,
    payload: serde_json::Value,
) {
    let handle = presence
        .lookup(to)
        .and_then(|conn_id| sockets.get(&conn_id));

    match handle {
        Some(handle) => {
            handle.send(ServerEvent::RelaySignal {
                from_user_id: from,
                payload,
            });
        }
        None => {
            tracing::debug!(from = %from, to = %to, "Relay target not present, dropping signal");
        }
    }
}
