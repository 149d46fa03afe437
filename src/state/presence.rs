//! Presence registry: which connections are online and under what name.
//!
//! Not independently synchronized — the registry is owned by [`RoomState`]
//! and only ever touched under its single mutex.
//!
//! [`RoomState`]: super::RoomState

use chrono::{DateTime, Utc};

/// One live, joined connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub connection_id: String,
    pub display_name: String,
    pub connected_at: DateTime<Utc>,
}

/// A connection id was registered twice. Connection ids are server-assigned
/// ULIDs, so this is unreachable under normal transport guarantees; the
/// gateway treats it as fatal to that connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateConnection;

/// Sessions in registration order. Duplicate display names are permitted —
/// two sessions may join under the same name and both appear in the roster.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    sessions: Vec<Session>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        connection_id: &str,
        display_name: &str,
    ) -> Result<(), DuplicateConnection> {
        if self.sessions.iter().any(|s| s.connection_id == connection_id) {
            return Err(DuplicateConnection);
        }
        self.sessions.push(Session {
            connection_id: connection_id.to_string(),
            display_name: display_name.to_string(),
            connected_at: Utc::now(),
        });
        Ok(())
    }

    /// Remove a session, returning its display name. Returns `None` when the
    /// connection never completed a join.
    pub fn unregister(&mut self, connection_id: &str) -> Option<String> {
        let idx = self
            .sessions
            .iter()
            .position(|s| s.connection_id == connection_id)?;
        Some(self.sessions.remove(idx).display_name)
    }

    /// The roster: display names in registration order, not alphabetical,
    /// so clients see names in observed join sequence.
    pub fn snapshot(&self) -> Vec<String> {
        self.sessions.iter().map(|s| s.display_name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_snapshot_in_join_order() {
        let mut reg = PresenceRegistry::new();
        reg.register("c1", "alice").unwrap();
        reg.register("c2", "bob").unwrap();
        reg.register("c3", "zed").unwrap();
        assert_eq!(reg.snapshot(), vec!["alice", "bob", "zed"]);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn duplicate_connection_id_is_rejected() {
        let mut reg = PresenceRegistry::new();
        reg.register("c1", "alice").unwrap();
        assert_eq!(reg.register("c1", "bob"), Err(DuplicateConnection));
        // The original registration is untouched.
        assert_eq!(reg.snapshot(), vec!["alice"]);
    }

    #[test]
    fn duplicate_display_names_are_permitted() {
        let mut reg = PresenceRegistry::new();
        reg.register("c1", "alice").unwrap();
        reg.register("c2", "alice").unwrap();
        assert_eq!(reg.snapshot(), vec!["alice", "alice"]);
    }

    #[test]
    fn unregister_returns_the_registered_name() {
        let mut reg = PresenceRegistry::new();
        reg.register("c1", "alice").unwrap();
        reg.register("c2", "bob").unwrap();
        assert_eq!(reg.unregister("c1"), Some("alice".to_string()));
        assert_eq!(reg.snapshot(), vec!["bob"]);
    }

    #[test]
    fn unregister_unknown_connection_returns_none() {
        let mut reg = PresenceRegistry::new();
        assert_eq!(reg.unregister("never-joined"), None);
        assert!(reg.is_empty());
    }

    #[test]
    fn roster_size_matches_live_session_count() {
        let mut reg = PresenceRegistry::new();
        reg.register("c1", "alice").unwrap();
        reg.register("c2", "bob").unwrap();
        reg.unregister("c1");
        assert_eq!(reg.snapshot().len(), reg.len());
    }
}
