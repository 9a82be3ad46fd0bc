//! Call sessions and the table tracking every non-terminal one.

use std::collections::HashMap;

use huddle_core::types::id::{CallId, UserId};

/// Non-terminal call session state.
///
/// Terminal outcomes (ended, rejected, cancelled, timed out) are not
/// represented: a session reaching one is removed from the table
/// immediately, so the table only ever holds calls that still matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// Requested, callee not yet responded. Commits no availability.
    Ringing,
    /// Accepted; both parties are committed.
    Active,
}

/// One attempted or active call between two users.
#[derive(Debug, Clone)]
pub struct CallSession {
    /// Session identifier.
    pub id: CallId,
    /// Who placed the call.
    pub caller: UserId,
    /// Who was rung.
    pub callee: UserId,
    /// Current state.
    pub state: CallState,
}

impl CallSession {
    /// The other party, if `user` participates in this session.
    pub fn peer_of(&self, user: UserId) -> Option<UserId> {
        if user == self.caller {
            Some(self.callee)
        } else if user == self.callee {
            Some(self.caller)
        } else {
            None
        }
    }

    /// Whether `user` participates in this session.
    pub fn involves(&self, user: UserId) -> bool {
        user == self.caller || user == self.callee
    }
}

/// All non-terminal call sessions, with a user → active-session index.
///
/// The index is what makes the mutual-exclusion invariant directly
/// checkable: a user is busy exactly when they appear in it, and the
/// coordinator's single critical section guarantees both participants are
/// indexed or neither is.
#[derive(Debug, Default)]
pub struct CallTable {
    sessions: HashMap<CallId, CallSession>,
    active_by_user: HashMap<UserId, CallId>,
}

impl CallTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            active_by_user: HashMap::new(),
        }
    }

    /// Creates a ringing session, or returns the existing one for the same
    /// ordered pair — a repeated request re-rings rather than stacking
    /// duplicate sessions.
    ///
    /// Returns `(call_id, created)`.
    pub fn ring(&mut self, caller: UserId, callee: UserId) -> (CallId, bool) {
        if let Some(existing) = self.find_ring(caller, callee) {
            return (existing, false);
        }

        let id = CallId::new();
        self.sessions.insert(
            id,
            CallSession {
                id,
                caller,
                callee,
                state: CallState::Ringing,
            },
        );
        (id, true)
    }

    /// Finds the ringing session for an ordered (caller, callee) pair.
    pub fn find_ring(&self, caller: UserId, callee: UserId) -> Option<CallId> {
        self.sessions
            .values()
            .find(|s| s.state == CallState::Ringing && s.caller == caller && s.callee == callee)
            .map(|s| s.id)
    }

    /// Returns a session by id.
    pub fn get(&self, id: CallId) -> Option<&CallSession> {
        self.sessions.get(&id)
    }

    /// Whether a user is committed to an active call.
    pub fn is_in_call(&self, user: UserId) -> bool {
        self.active_by_user.contains_key(&user)
    }

    /// The active session a user participates in, if any.
    pub fn active_session_of(&self, user: UserId) -> Option<&CallSession> {
        self.active_by_user
            .get(&user)
            .and_then(|id| self.sessions.get(id))
    }

    /// Promotes a ringing session to active, committing both parties.
    ///
    /// Also drops a reverse-direction ring between the same pair, which a
    /// simultaneous mutual request would otherwise leave dangling. Returns
    /// `false` when the session is missing, not ringing, or either party is
    /// already committed elsewhere.
    pub fn promote(&mut self, id: CallId) -> bool {
        let (caller, callee) = match self.sessions.get(&id) {
            Some(s) if s.state == CallState::Ringing => (s.caller, s.callee),
            _ => return false,
        };
        if self.is_in_call(caller) || self.is_in_call(callee) {
            return false;
        }

        if let Some(reverse) = self.find_ring(callee, caller) {
            self.sessions.remove(&reverse);
        }

        if let Some(session) = self.sessions.get_mut(&id) {
            session.state = CallState::Active;
        }
        self.active_by_user.insert(caller, id);
        self.active_by_user.insert(callee, id);
        true
    }

    /// Removes a session, clearing the active index for its participants.
    /// The terminal outcome is not retained.
    pub fn remove(&mut self, id: CallId) -> Option<CallSession> {
        let session = self.sessions.remove(&id)?;
        if session.state == CallState::Active {
            self.active_by_user.remove(&session.caller);
            self.active_by_user.remove(&session.callee);
        }
        Some(session)
    }

    /// Ends the active session a user participates in, if any.
    pub fn end_active(&mut self, user: UserId) -> Option<CallSession> {
        let id = *self.active_by_user.get(&user)?;
        self.remove(id)
    }

    /// Drops every ringing session a user participates in, returning them
    /// so counterparts can be notified.
    pub fn drop_rings_involving(&mut self, user: UserId) -> Vec<CallSession> {
        let ids: Vec<CallId> = self
            .sessions
            .values()
            .filter(|s| s.state == CallState::Ringing && s.involves(user))
            .map(|s| s.id)
            .collect();

        ids.into_iter()
            .filter_map(|id| self.sessions.remove(&id))
            .collect()
    }

    /// Number of active (accepted) calls.
    pub fn active_count(&self) -> usize {
        self.active_by_user.len() / 2
    }

    /// Number of sessions of any non-terminal state.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_reuses_existing_session_for_same_pair() {
        let mut table = CallTable::new();
        let (x, y) = (UserId::new(), UserId::new());

        let (first, created) = table.ring(x, y);
        assert!(created);
        let (second, created_again) = table.ring(x, y);
        assert!(!created_again);
        assert_eq!(first, second);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_promote_commits_both_parties() {
        let mut table = CallTable::new();
        let (x, y) = (UserId::new(), UserId::new());

        let (id, _) = table.ring(x, y);
        assert!(!table.is_in_call(x));
        assert!(table.promote(id));

        assert!(table.is_in_call(x));
        assert!(table.is_in_call(y));
        assert_eq!(table.active_count(), 1);
    }

    #[test]
    fn test_promote_refuses_busy_party() {
        let mut table = CallTable::new();
        let (x, y, z) = (UserId::new(), UserId::new(), UserId::new());

        let (xy, _) = table.ring(x, y);
        let (zy, _) = table.ring(z, y);
        assert!(table.promote(xy));

        // y is committed to x; the second accept must lose the race.
        assert!(!table.promote(zy));
        assert!(!table.is_in_call(z));
        assert_eq!(table.active_session_of(y).expect("active").caller, x);
    }

    #[test]
    fn test_promote_drops_reverse_ring() {
        let mut table = CallTable::new();
        let (x, y) = (UserId::new(), UserId::new());

        let (xy, _) = table.ring(x, y);
        let (_yx, _) = table.ring(y, x);
        assert!(table.promote(xy));

        assert!(table.find_ring(y, x).is_none());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_end_active_is_idempotent() {
        let mut table = CallTable::new();
        let (x, y) = (UserId::new(), UserId::new());

        let (id, _) = table.ring(x, y);
        table.promote(id);

        assert!(table.end_active(x).is_some());
        assert!(table.end_active(x).is_none());
        assert!(table.end_active(y).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_drop_rings_involving_spares_active_sessions() {
        let mut table = CallTable::new();
        let (x, y, z) = (UserId::new(), UserId::new(), UserId::new());

        let (xy, _) = table.ring(x, y);
        table.promote(xy);
        table.ring(z, x);

        let dropped = table.drop_rings_involving(x);
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].caller, z);
        assert!(table.is_in_call(x));
    }
}
