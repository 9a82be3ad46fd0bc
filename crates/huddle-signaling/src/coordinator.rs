//! The coordinator — single owner of presence and call-session state.
//!
//! Every mutation sequence that spans two users (accept, end, disconnect
//! cleanup) runs under one lock acquisition, so racing accepts or a
//! disconnect racing an accept can never leave the two participants
//! inconsistent. No lock is ever held across an `.await`; outbound
//! delivery is non-blocking `try_send` on per-connection channels.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use huddle_auth::claims::Identity;
use huddle_core::config::signaling::{PresenceMode, SignalingConfig};
use huddle_core::error::AppError;
use huddle_core::types::id::{CallId, UserId};
use huddle_core::types::profile::ProfileSummary;

use crate::broadcast;
use crate::call::{CallState, CallTable};
use crate::connection::{ConnectionHandle, SocketPool};
use crate::message::{ClientEvent, ServerEvent};
use crate::presence::{Availability, PresenceRegistry, PresenceSummary};
use crate::relay;

/// Mutable coordinator state, guarded as one unit.
#[derive(Debug, Default)]
struct CoordinatorState {
    presence: PresenceRegistry,
    calls: CallTable,
}

/// Counters exposed on the detailed health endpoint.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct CoordinatorStats {
    /// Live connections, available or not.
    pub connections: usize,
    /// Users in the presence directory.
    pub present_users: usize,
    /// Accepted calls currently running.
    pub active_calls: usize,
}

/// The presence and call-signaling coordinator.
#[derive(Debug)]
pub struct Coordinator {
    state: Mutex<CoordinatorState>,
    sockets: SocketPool,
    config: SignalingConfig,
    /// Self-reference for spawning ring-timeout tasks.
    self_ref: Weak<Coordinator>,
}

impl Coordinator {
    /// Creates a coordinator with empty state.
    pub fn new(config: SignalingConfig) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            state: Mutex::new(CoordinatorState::default()),
            sockets: SocketPool::new(),
            config,
            self_ref: weak.clone(),
        })
    }

    /// Registers an authenticated connection.
    ///
    /// Returns the handle plus the receiver the transport task drains for
    /// outbound events. In `on-connect` mode a token carrying the
    /// networking flag also enters the presence directory immediately.
    pub async fn register(
        &self,
        identity: Identity,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(identity, tx));
        self.sockets.add(handle.clone());

        info!(
            conn_id = %handle.id,
            user_id = %handle.user_id(),
            "Connection registered"
        );

        if self.config.presence_mode == PresenceMode::OnConnect
            && handle.identity.networking_available
        {
            self.enter_directory(&handle, None).await;
        }

        (handle, rx)
    }

    /// Tears down a closed connection: implicit declare-unavailable plus
    /// end-call on behalf of the disconnecting user where applicable.
    pub async fn disconnect(&self, conn: &ConnectionHandle) {
        conn.mark_closed();
        self.sockets.remove(&conn.id);
        self.leave_directory(conn).await;

        info!(
            conn_id = %conn.id,
            user_id = %conn.user_id(),
            "Connection closed"
        );
    }

    /// Dispatches one inbound client event.
    ///
    /// Call-flow rejections surface as a `call-error` on the originating
    /// connection only; nothing here terminates the connection.
    pub async fn handle_event(&self, conn: &Arc<ConnectionHandle>, event: ClientEvent) {
        match event {
            ClientEvent::DeclareAvailable { profile } => {
                self.enter_directory(conn, profile).await;
            }
            ClientEvent::DeclareUnavailable => {
                self.leave_directory(conn).await;
            }
            ClientEvent::RequestCall { target_user_id } => {
                match self.request_call(conn, target_user_id).await {
                    Ok(Some(call_id)) => self.arm_ring_timeout(call_id),
                    Ok(None) => {}
                    Err(err) => {
                        conn.send(ServerEvent::error(&err));
                    }
                }
            }
            ClientEvent::AcceptCall { target_user_id } => {
                if let Err(err) = self.accept_call(conn, target_user_id).await {
                    conn.send(ServerEvent::error(&err));
                }
            }
            ClientEvent::RejectCall { target_user_id } => {
                if let Err(err) = self.reject_call(conn, target_user_id).await {
                    conn.send(ServerEvent::error(&err));
                }
            }
            ClientEvent::RelaySignal {
                target_user_id,
                payload,
            } => {
                self.relay(conn, target_user_id, payload).await;
            }
            ClientEvent::EndCall { target_user_id } => {
                self.end_call(conn, target_user_id).await;
            }
        }
    }

    /// Adds or refreshes the user's presence entry and broadcasts.
    async fn enter_directory(&self, conn: &ConnectionHandle, profile: Option<ProfileSummary>) {
        let profile = profile.unwrap_or_else(|| conn.identity.profile.clone());
        let snapshot = {
            let mut state = self.state.lock().await;
            let replaced = state
                .presence
                .mark_available(conn.user_id(), profile, conn.id);

            // A reconnect supersedes the old socket: close it out of the
            // pool so the stale handle can never receive targeted messages.
            if let Some(old_conn) = replaced.filter(|old| *old != conn.id) {
                if let Some(old) = self.sockets.remove(&old_conn) {
                    old.mark_closed();
                    debug!(
                        user_id = %conn.user_id(),
                        old_conn = %old_conn,
                        "Stale connection superseded by reconnect"
                    );
                }
            }

            Self::snapshot_of(&state)
        };

        broadcast::emit(&self.sockets, snapshot);
    }

    /// Removes the user from the directory (if this connection still owns
    /// the entry), ending any call state they hold, and broadcasts.
    async fn leave_directory(&self, conn: &ConnectionHandle) {
        let snapshot = {
            let mut state = self.state.lock().await;
            if !state.presence.owns(conn.user_id(), conn.id) {
                None
            } else {
                Self::vacate(&mut state, &self.sockets, conn.user_id());
                Some(Self::snapshot_of(&state))
            }
        };

        if let Some(snapshot) = snapshot {
            broadcast::emit(&self.sockets, snapshot);
        }
    }

    /// Rings `callee` on behalf of the connection's user.
    ///
    /// Commits no availability — busyness is only committed on acceptance,
    /// so a callee may legitimately be rung by several callers at once.
    /// Returns the call id when a new ring was created (a repeat request
    /// re-notifies the callee on the existing ring).
    async fn request_call(
        &self,
        conn: &ConnectionHandle,
        callee: UserId,
    ) -> Result<Option<CallId>, AppError> {
        let caller = conn.user_id();
        let mut state = self.state.lock().await;

        let caller_profile = match state.presence.get(caller) {
            Some(entry) => entry.profile.clone(),
            None => {
                return Err(AppError::caller_not_eligible(
                    "You must be declared available to place calls",
                ));
            }
        };
        if callee == caller {
            return Err(AppError::target_unavailable("Cannot place a call to yourself"));
        }
        if !state.presence.contains(callee) {
            return Err(AppError::target_unavailable("User is offline or unavailable"));
        }
        if state.calls.is_in_call(callee) {
            return Err(AppError::target_busy("User is currently busy"));
        }

        let (call_id, created) = state.calls.ring(caller, callee);
        Self::notify(
            &state,
            &self.sockets,
            callee,
            ServerEvent::IncomingCall {
                from_user_id: caller,
                profile: caller_profile,
            },
        );

        debug!(caller = %caller, callee = %callee, call_id = %call_id, created, "Ring");
        Ok(created.then_some(call_id))
    }

    /// Accepts a ring from `original_caller`.
    ///
    /// The first acceptance to land wins: if either party committed to
    /// another call in the meantime the accept resolves as `TargetBusy`. A
    /// vanished caller resolves as `StaleCallReference`; a duplicate accept
    /// is a no-op.
    async fn accept_call(
        &self,
        conn: &ConnectionHandle,
        original_caller: UserId,
    ) -> Result<(), AppError> {
        let accepter = conn.user_id();
        let mut state = self.state.lock().await;

        let ring = match state.calls.find_ring(original_caller, accepter) {
            Some(id) => id,
            None if state.presence.contains(original_caller) => return Ok(()),
            None => {
                return Err(AppError::stale_call_reference("Caller is no longer available"));
            }
        };

        if state.calls.is_in_call(accepter) || state.calls.is_in_call(original_caller) {
            return Err(AppError::target_busy("User is currently busy"));
        }

        if !state.calls.promote(ring) {
            return Err(AppError::internal("Call promotion failed"));
        }

        Self::notify(
            &state,
            &self.sockets,
            original_caller,
            ServerEvent::CallAccepted {
                from_user_id: accepter,
            },
        );

        let snapshot = Self::snapshot_of(&state);
        drop(state);
        broadcast::emit(&self.sockets, snapshot);

        info!(caller = %original_caller, callee = %accepter, "Call accepted");
        Ok(())
    }

    /// Declines a ring from `original_caller`. No availability was ever
    /// committed for a ring, so this mutates nothing beyond dropping it.
    async fn reject_call(
        &self,
        conn: &ConnectionHandle,
        original_caller: UserId,
    ) -> Result<(), AppError> {
        let rejecter = conn.user_id();
        let mut state = self.state.lock().await;

        match state.calls.find_ring(original_caller, rejecter) {
            Some(ring) => {
                state.calls.remove(ring);
                Self::notify(
                    &state,
                    &self.sockets,
                    original_caller,
                    ServerEvent::CallRejected {
                        from_user_id: rejecter,
                    },
                );
                Ok(())
            }
            None if state.presence.contains(original_caller) => Ok(()),
            None => Err(AppError::stale_call_reference("Caller is no longer available")),
        }
    }

    /// Hangs up. Idempotent: a second end for the same pair changes
    /// nothing and emits no duplicate `call-ended`.
    ///
    /// The active session's own participant record decides who gets
    /// notified; the client-supplied peer id is only used to locate a ring
    /// being cancelled before acceptance.
    async fn end_call(&self, conn: &ConnectionHandle, peer: UserId) {
        let ender = conn.user_id();
        let snapshot = {
            let mut state = self.state.lock().await;

            if let Some(session) = state.calls.end_active(ender) {
                if let Some(other) = session.peer_of(ender) {
                    Self::notify(
                        &state,
                        &self.sockets,
                        other,
                        ServerEvent::CallEnded { by_user_id: ender },
                    );
                }
                info!(ender = %ender, call_id = %session.id, "Call ended");
                Some(Self::snapshot_of(&state))
            } else if let Some(ring) = state
                .calls
                .find_ring(ender, peer)
                .or_else(|| state.calls.find_ring(peer, ender))
            {
                if let Some(session) = state.calls.remove(ring) {
                    if let Some(other) = session.peer_of(ender) {
                        Self::notify(
                            &state,
                            &self.sockets,
                            other,
                            ServerEvent::CallEnded { by_user_id: ender },
                        );
                    }
                }
                // Cancelling a ring never changed any availability.
                None
            } else {
                debug!(ender = %ender, peer = %peer, "End-call with no matching session");
                None
            }
        };

        if let Some(snapshot) = snapshot {
            broadcast::emit(&self.sockets, snapshot);
        }
    }

    /// Forwards an opaque negotiation payload to `target`.
    async fn relay(&self, conn: &ConnectionHandle, target: UserId, payload: serde_json::Value) {
        let state = self.state.lock().await;
        relay::forward(&state.presence, &self.sockets, conn.user_id(), target, payload);
    }

    /// Resolves a ring that was never answered within the configured
    /// timeout: the caller sees a rejection, the callee's ring UI clears.
    pub async fn expire_ring(&self, call_id: CallId) {
        let mut state = self.state.lock().await;

        let session = match state.calls.get(call_id) {
            Some(s) if s.state == CallState::Ringing => s.clone(),
            // Already answered, rejected, or cleaned up.
            _ => return,
        };

        state.calls.remove(call_id);
        Self::notify(
            &state,
            &self.sockets,
            session.caller,
            ServerEvent::CallRejected {
                from_user_id: session.callee,
            },
        );
        Self::notify(
            &state,
            &self.sockets,
            session.callee,
            ServerEvent::CallEnded {
                by_user_id: session.caller,
            },
        );

        debug!(call_id = %call_id, caller = %session.caller, "Ring timed out");
    }

    /// Current presence directory with derived availability.
    pub async fn snapshot(&self) -> Vec<PresenceSummary> {
        let state = self.state.lock().await;
        Self::snapshot_of(&state)
    }

    /// Counters for the detailed health endpoint.
    pub async fn stats(&self) -> CoordinatorStats {
        let state = self.state.lock().await;
        CoordinatorStats {
            connections: self.sockets.len(),
            present_users: state.presence.len(),
            active_calls: state.calls.active_count(),
        }
    }

    fn arm_ring_timeout(&self, call_id: CallId) {
        let secs = self.config.ring_timeout_seconds;
        if secs == 0 {
            return;
        }
        let Some(coordinator) = self.self_ref.upgrade() else {
            return;
        };
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            coordinator.expire_ring(call_id).await;
        });
    }

    /// Ends every call the user holds and removes their presence entry.
    ///
    /// Best-effort cleanup: an already-absent peer is treated as already
    /// cleaned up, never as an error.
    fn vacate(state: &mut CoordinatorState, sockets: &SocketPool, user: UserId) {
        if let Some(session) = state.calls.end_active(user) {
            if let Some(peer) = session.peer_of(user) {
                Self::notify(
                    state,
                    sockets,
                    peer,
                    ServerEvent::CallEnded { by_user_id: user },
                );
            }
        }

        for ring in state.calls.drop_rings_involving(user) {
            if ring.caller == user {
                // The caller vanished mid-ring; clear the callee's ring UI.
                Self::notify(
                    state,
                    sockets,
                    ring.callee,
                    ServerEvent::CallEnded { by_user_id: user },
                );
            } else {
                // The callee vanished; the caller resolves it through the
                // next snapshot or a subsequent action on this user.
                debug!(
                    caller = %ring.caller,
                    callee = %ring.callee,
                    "Dropped ring to vanished callee"
                );
            }
        }

        state.presence.mark_unavailable(user);
    }

    fn snapshot_of(state: &CoordinatorState) -> Vec<PresenceSummary> {
        state
            .presence
            .iter()
            .map(|entry| PresenceSummary {
                user_id: entry.user_id,
                profile: entry.profile.clone(),
                availability: if state.calls.is_in_call(entry.user_id) {
                    Availability::InCall
                } else {
                    Availability::Available
                },
            })
            .collect()
    }

    /// Delivers a targeted event through the user's registered connection.
    fn notify(
        state: &CoordinatorState,
        sockets: &SocketPool,
        user: UserId,
        event: ServerEvent,
    ) -> bool {
        state
            .presence
            .lookup(user)
            .and_then(|conn_id| sockets.get(&conn_id))
            .map(|handle| handle.send(event))
            .unwrap_or(false)
    }
}
