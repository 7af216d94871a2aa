use tracing::debug;

use super::agent_response::AgentResponse;
use super::message::{ConversationMessage, Message, now_millis};

/// Ordered display turns plus the minimal history replayed to the agent.
///
/// `history` gets one entry per turn except error turns, in the same order as
/// `messages`, so `history.len() <= messages.len()` always holds.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
    history: Vec<ConversationMessage>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn. The caller guarantees `text` is not blank.
    pub fn append_user(&mut self, text: impl Into<String>) -> &Message {
        let text = text.into();
        self.history.push(ConversationMessage::user(text.clone()));
        self.push(Message::user(text, now_millis()))
    }

    /// Append the assistant turn for a successful agent reply
    pub fn append_assistant(&mut self, agent_data: AgentResponse) -> &Message {
        self.history
            .push(ConversationMessage::assistant(agent_data.message.clone()));
        self.push(Message::assistant(agent_data, now_millis()))
    }

    /// Append an error turn. It is shown but never replayed to the agent.
    pub fn append_error(&mut self, text: impl Into<String>) -> &Message {
        self.push(Message::error(text, now_millis()))
    }

    /// Append prepared turns, deriving their history entries
    pub fn seed(&mut self, messages: Vec<Message>) {
        for message in messages {
            if let Some(entry) = message.history_entry() {
                self.history.push(entry);
            }
            self.messages.push(message);
        }
        debug!(
            messages = self.messages.len(),
            history = self.history.len(),
            "Conversation seeded"
        );
    }

    /// Drop every turn and the whole agent history
    pub fn reset(&mut self) {
        self.messages.clear();
        self.history.clear();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    fn push(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }
}
