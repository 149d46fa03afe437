//! Per-connection protocol state.
//!
//! A connection moves `Connected → Joined → Disconnected`, never backwards.
//! The event router consults this machine instead of probing for an
//! incidentally-present name field.

use chrono::{DateTime, Utc};
use ulid::Ulid;

/// Generate a server-assigned connection id.
pub fn connection_id() -> String {
    format!("conn_{}", Ulid::new())
}

/// Protocol phase of a single connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Transport open, no display name yet. Only `join` is meaningful.
    Connected,
    /// Display name registered; chat/typing/file-upload are accepted.
    Joined(String),
    /// Terminal.
    Disconnected,
}

/// State for a single WebSocket connection.
#[derive(Debug)]
pub struct Connection {
    pub id: String,
    pub connected_at: DateTime<Utc>,
    phase: Phase,
}

impl Connection {
    pub fn new() -> Self {
        Self {
            id: connection_id(),
            connected_at: Utc::now(),
            phase: Phase::Connected,
        }
    }

    /// Transition `Connected → Joined`. Returns `false` (no transition) from
    /// any other phase — a second join is dropped, not an error.
    pub fn join(&mut self, display_name: String) -> bool {
        match self.phase {
            Phase::Connected => {
                self.phase = Phase::Joined(display_name);
                true
            }
            _ => false,
        }
    }

    /// The registered display name, if this connection has joined.
    pub fn display_name(&self) -> Option<&str> {
        match &self.phase {
            Phase::Joined(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.phase, Phase::Joined(_))
    }

    /// Terminal transition, from any phase.
    pub fn disconnect(&mut self) {
        self.phase = Phase::Disconnected;
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}
