//! Conversation store: the authoritative, ordered message log.
//!
//! The store is append-only during a conversation's lifetime. Every change
//! bumps a revision published on a [`watch`] channel so renderers can
//! subscribe instead of being poked by the controller.

use chrono::Utc;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::message::{Message, MessageId, MessageIdGenerator};
use crate::quick_action::QuickAction;

/// Ordered message log for one chat panel.
#[derive(Debug)]
pub struct ConversationStore {
    /// Session key for the current conversation lifetime.
    conversation_id: Uuid,
    /// Messages in insertion order.
    messages: Vec<Message>,
    /// Id source shared by local user and assistant messages.
    ids: MessageIdGenerator,
    /// Welcome content used to seed each lifetime.
    welcome: String,
    /// Change notifications (monotonic revision counter).
    revision: watch::Sender<u64>,
}

impl ConversationStore {
    /// Create a store seeded with the assistant welcome message.
    pub fn initialize(welcome: impl Into<String>) -> Self {
        let (revision, _) = watch::channel(0);
        let mut store = Self {
            conversation_id: Uuid::new_v4(),
            messages: Vec::new(),
            ids: MessageIdGenerator::new(),
            welcome: welcome.into(),
            revision,
        };
        store.seed();
        store
    }

    fn seed(&mut self) {
        let id = self.next_id();
        let welcome = Message::assistant(id, self.welcome.clone(), Utc::now())
            .with_quick_actions(QuickAction::ALL);
        self.messages.push(welcome);
        self.notify();
    }

    /// Issue a fresh message id for this conversation.
    ///
    /// Skips any id already in the log, including ones issued by the
    /// conversation service.
    pub fn next_id(&mut self) -> MessageId {
        loop {
            let id = self.ids.next_at(Utc::now());
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Append a message to the end of the log.
    pub fn append(&mut self, message: Message) {
        debug!(
            conversation_id = %self.conversation_id,
            message_id = %message.id(),
            role = %message.role(),
            "Appending message"
        );
        self.messages.push(message);
        self.notify();
    }

    /// End the current conversation and start a new, freshly seeded one.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.conversation_id = Uuid::new_v4();
        self.seed();
    }

    /// Messages in display order (oldest first).
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the log holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Whether a message with `id` is already in the log.
    pub fn contains(&self, id: &MessageId) -> bool {
        self.messages.iter().any(|m| m.id() == id)
    }

    /// Whether only the welcome message is present.
    pub fn is_fresh(&self) -> bool {
        self.messages.len() == 1
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    /// Subscribe to change notifications.
    ///
    /// The value is a revision counter; re-read [`messages`](Self::messages)
    /// when it changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Current revision.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}
