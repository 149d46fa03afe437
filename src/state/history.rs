//! Append-only message log, replayed to newcomers on join.
//!
//! Unbounded by design: no truncation, compaction, or eviction, and nothing
//! survives a restart. Owned by [`RoomState`] under its single mutex.
//!
//! [`RoomState`]: super::RoomState

use crate::message::Message;

#[derive(Debug, Default)]
pub struct History {
    log: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.log.push(message);
    }

    /// Snapshot of the entire log in arrival order. Called once per join.
    pub fn replay(&self) -> Vec<Message> {
        self.log.clone()
    }

    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replay_preserves_arrival_order() {
        let mut history = History::new();
        history.append(Message::text("alice", "one"));
        history.append(Message::text("bob", "two"));
        history.append(Message::text("alice", "three"));

        let replayed = history.replay();
        let bodies: Vec<&str> = replayed.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(bodies, vec!["one", "two", "three"]);
    }

    #[test]
    fn replay_is_a_snapshot() {
        let mut history = History::new();
        history.append(Message::text("alice", "one"));
        let snapshot = history.replay();
        history.append(Message::text("bob", "two"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn empty_history_replays_empty() {
        let history = History::new();
        assert!(history.replay().is_empty());
        assert!(history.is_empty());
    }
}
