//! Broadcast hub for dispatching events to connected sessions.
//!
//! Uses a single `tokio::sync::broadcast` channel. Every connection
//! subscribes once and filters frames locally by audience, so delivery is
//! best-effort per connection: a peer that disconnected mid-fan-out (or
//! lagged behind) never blocks delivery to the others.

use std::sync::Arc;

use tokio::sync::broadcast;

use super::events::ServerEvent;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip frames (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// Who a frame is for.
#[derive(Debug, Clone)]
pub enum Audience {
    /// Every connected session.
    All,
    /// Everyone but one connection (typing notices).
    Except(String),
    /// Exactly one connection (history replay on join).
    Only(String),
}

impl Audience {
    pub fn includes(&self, connection_id: &str) -> bool {
        match self {
            Audience::All => true,
            Audience::Except(excluded) => excluded != connection_id,
            Audience::Only(target) => target == connection_id,
        }
    }
}

/// An outbound event with its delivery target.
#[derive(Debug, Clone)]
pub struct Frame {
    pub audience: Audience,
    pub event: ServerEvent,
}

/// The global broadcast hub. Cloneable — store in AppState.
#[derive(Clone)]
pub struct ChatBroadcast {
    sender: broadcast::Sender<Arc<Frame>>,
}

impl ChatBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the hub. Each connection calls this once, before it can
    /// miss any frame addressed to it.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Frame>> {
        self.sender.subscribe()
    }

    pub fn broadcast_all(&self, event: ServerEvent) {
        self.dispatch(Audience::All, event);
    }

    pub fn broadcast_except(&self, event: ServerEvent, connection_id: &str) {
        self.dispatch(Audience::Except(connection_id.to_string()), event);
    }

    pub fn send_to(&self, connection_id: &str, event: ServerEvent) {
        self.dispatch(Audience::Only(connection_id.to_string()), event);
    }

    fn dispatch(&self, audience: Audience, event: ServerEvent) {
        // send() returns Err when there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(Frame { audience, event }));
    }
}

impl Default for ChatBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_all_includes_everyone() {
        assert!(Audience::All.includes("c1"));
        assert!(Audience::All.includes("c2"));
    }

    #[test]
    fn audience_except_excludes_only_the_sender() {
        let audience = Audience::Except("c1".to_string());
        assert!(!audience.includes("c1"));
        assert!(audience.includes("c2"));
    }

    #[test]
    fn audience_only_targets_a_single_connection() {
        let audience = Audience::Only("c1".to_string());
        assert!(audience.includes("c1"));
        assert!(!audience.includes("c2"));
    }

    #[test]
    fn subscribers_receive_dispatched_frames_in_order() {
        let hub = ChatBroadcast::new();
        let mut rx = hub.subscribe();

        hub.broadcast_all(ServerEvent::OnlineUsers(vec!["alice".to_string()]));
        hub.broadcast_except(ServerEvent::Typing("alice".to_string()), "c1");

        let first = rx.try_recv().unwrap();
        assert!(matches!(first.event, ServerEvent::OnlineUsers(_)));
        assert!(matches!(first.audience, Audience::All));

        let second = rx.try_recv().unwrap();
        assert!(matches!(second.event, ServerEvent::Typing(_)));
        assert!(!second.audience.includes("c1"));
    }

    #[test]
    fn dispatch_without_receivers_does_not_panic() {
        let hub = ChatBroadcast::new();
        hub.broadcast_all(ServerEvent::OnlineUsers(Vec::new()));
    }
}
