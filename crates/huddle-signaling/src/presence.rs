//! Presence registry — the authoritative map of who is reachable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use huddle_core::types::id::UserId;
use huddle_core::types::profile::ProfileSummary;

use crate::connection::ConnectionId;

/// A user's availability for receiving calls.
///
/// Derived state: a user is `InCall` exactly when an active call session
/// references them. The registry itself never stores this flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    /// Reachable for a new call.
    Available,
    /// Committed to an active call.
    InCall,
}

/// One currently-connected, networking-eligible user.
#[derive(Debug, Clone)]
pub struct PresenceEntry {
    /// Stable user identity — the registry key.
    pub user_id: UserId,
    /// Opaque pass-through profile data.
    pub profile: ProfileSummary,
    /// The connection all targeted messages for this user go to.
    pub connection_id: ConnectionId,
}

/// Wire-visible view of a presence entry, as published in snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceSummary {
    /// User ID.
    pub user_id: UserId,
    /// Profile summary.
    #[serde(flatten)]
    pub profile: ProfileSummary,
    /// Current availability.
    pub availability: Availability,
}

/// The authoritative user-id → presence-entry map.
///
/// Plain data structure with no interior locking; the coordinator owns it
/// behind its single critical section.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: HashMap<UserId, PresenceEntry>,
}

impl PresenceRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Inserts or replaces the entry for a user.
    ///
    /// Returns the connection id of a replaced entry so the caller can
    /// invalidate the stale handle — after a reconnect, targeted messages
    /// must only ever reach the new connection.
    pub fn mark_available(
        &mut self,
        user_id: UserId,
        profile: ProfileSummary,
        connection_id: ConnectionId,
    ) -> Option<ConnectionId> {
        self.entries
            .insert(
                user_id,
                PresenceEntry {
                    user_id,
                    profile,
                    connection_id,
                },
            )
            .map(|old| old.connection_id)
    }

    /// Removes the entry for a user. Removing an absent entry is a no-op.
    pub fn mark_unavailable(&mut self, user_id: UserId) -> Option<PresenceEntry> {
        self.entries.remove(&user_id)
    }

    /// Resolves a user to their current connection.
    pub fn lookup(&self, user_id: UserId) -> Option<ConnectionId> {
        self.entries.get(&user_id).map(|entry| entry.connection_id)
    }

    /// Returns the full entry for a user.
    pub fn get(&self, user_id: UserId) -> Option<&PresenceEntry> {
        self.entries.get(&user_id)
    }

    /// Whether a user has a presence entry.
    pub fn contains(&self, user_id: UserId) -> bool {
        self.entries.contains_key(&user_id)
    }

    /// Whether the given connection still owns the user's entry.
    ///
    /// Used by disconnect cleanup so an old socket's close never evicts the
    /// entry a reconnect has since taken over.
    pub fn owns(&self, user_id: UserId, connection_id: ConnectionId) -> bool {
        self.lookup(user_id) == Some(connection_id)
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> impl Iterator<Item = &PresenceEntry> {
        self.entries.values()
    }

    /// Number of present users.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile(name: &str) -> ProfileSummary {
        ProfileSummary::named(name)
    }

    #[test]
    fn test_mark_available_then_lookup() {
        let mut registry = PresenceRegistry::new();
        let user = UserId::new();
        let conn = Uuid::new_v4();

        registry.mark_available(user, profile("Aiko"), conn);

        assert_eq!(registry.lookup(user), Some(conn));
        assert!(registry.contains(user));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_mark_unavailable_is_idempotent() {
        let mut registry = PresenceRegistry::new();
        let user = UserId::new();

        registry.mark_available(user, profile("Aiko"), Uuid::new_v4());
        assert!(registry.mark_unavailable(user).is_some());
        assert!(registry.mark_unavailable(user).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reconnect_replaces_entry_and_reports_stale_connection() {
        let mut registry = PresenceRegistry::new();
        let user = UserId::new();
        let old_conn = Uuid::new_v4();
        let new_conn = Uuid::new_v4();

        registry.mark_available(user, profile("Aiko"), old_conn);
        let replaced = registry.mark_available(user, profile("Aiko"), new_conn);

        assert_eq!(replaced, Some(old_conn));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup(user), Some(new_conn));
        assert!(!registry.owns(user, old_conn));
        assert!(registry.owns(user, new_conn));
    }
}
