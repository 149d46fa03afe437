//! Single-writer owner of the room's shared mutable state.
//!
//! The presence registry and the history store are one unit behind one
//! mutex: every mutation composes its broadcasts and hands them to the
//! fan-out hub *before* releasing the lock, so no observer ever sees a
//! half-updated roster or a message appended without its broadcast.
//! Nothing blocks or awaits while the lock is held — `broadcast::Sender`
//! sends synchronously.

pub mod history;
pub mod presence;

use parking_lot::Mutex;

use crate::gateway::events::ServerEvent;
use crate::gateway::fanout::ChatBroadcast;
use crate::message::Message;

pub use presence::DuplicateConnection;

pub struct RoomState {
    broadcast: ChatBroadcast,
    inner: Mutex<RoomInner>,
}

struct RoomInner {
    presence: presence::PresenceRegistry,
    history: history::History,
}

impl RoomState {
    pub fn new(broadcast: ChatBroadcast) -> Self {
        Self {
            broadcast,
            inner: Mutex::new(RoomInner {
                presence: presence::PresenceRegistry::new(),
                history: history::History::new(),
            }),
        }
    }

    /// A connection claims a display name.
    ///
    /// Atomically: registers the session, pushes the new roster to everyone,
    /// appends and broadcasts the join announcement, and replays the full
    /// history (announcement included) to the joining connection only.
    pub fn join(&self, connection_id: &str, display_name: &str) -> Result<(), DuplicateConnection> {
        let mut inner = self.inner.lock();
        inner.presence.register(connection_id, display_name)?;
        self.broadcast
            .broadcast_all(ServerEvent::OnlineUsers(inner.presence.snapshot()));

        let announcement = Message::system(format!("{display_name} has joined the chat."));
        inner.history.append(announcement.clone());
        self.broadcast.broadcast_all(ServerEvent::Chat(announcement));

        self.broadcast
            .send_to(connection_id, ServerEvent::ChatHistory(inner.history.replay()));
        Ok(())
    }

    /// Append a text message from a joined user and push it to everyone,
    /// the sender included.
    pub fn append_chat(&self, sender: &str, body: &str) -> Message {
        let message = Message::text(sender, body);
        self.append_message(message.clone());
        message
    }

    /// Append an already-built message (inline images, processed uploads)
    /// and push it to everyone. The HTTP upload path rejoins the serialized
    /// event stream here.
    pub fn append_message(&self, message: Message) {
        let mut inner = self.inner.lock();
        inner.history.append(message.clone());
        self.broadcast.broadcast_all(ServerEvent::Chat(message));
    }

    /// A connection went away. If it had joined, pushes the shrunken roster
    /// and appends+broadcasts the leave announcement; returns the name that
    /// was registered.
    pub fn leave(&self, connection_id: &str) -> Option<String> {
        let mut inner = self.inner.lock();
        let display_name = inner.presence.unregister(connection_id)?;
        self.broadcast
            .broadcast_all(ServerEvent::OnlineUsers(inner.presence.snapshot()));

        let announcement = Message::system(format!("{display_name} has left the chat."));
        inner.history.append(announcement.clone());
        self.broadcast.broadcast_all(ServerEvent::Chat(announcement));
        Some(display_name)
    }

    /// Current roster, in join order.
    pub fn roster(&self) -> Vec<String> {
        self.inner.lock().presence.snapshot()
    }

    /// Number of messages appended so far.
    pub fn history_len(&self) -> usize {
        self.inner.lock().history.len()
    }
}
