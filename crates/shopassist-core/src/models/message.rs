use serde::{Deserialize, Serialize};

use super::agent_response::AgentResponse;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn as displayed in the chat.
///
/// Immutable once created: the conversation store only ever appends turns or
/// clears them all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    role: Role,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_data: Option<AgentResponse>,
    /// Unix timestamp in milliseconds
    timestamp: i64,
}

impl Message {
    pub fn user(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            agent_data: None,
            timestamp,
        }
    }

    /// Assistant turn for a successful agent reply. The bubble shows the
    /// reply's message, or the fallback text when it is empty.
    pub fn assistant(agent_data: AgentResponse, timestamp: i64) -> Self {
        Self {
            role: Role::Assistant,
            content: agent_data.display_message().to_string(),
            agent_data: Some(agent_data),
            timestamp,
        }
    }

    /// Assistant-role turn reporting a failed dispatch; carries no agent data
    pub fn error(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent_data: None,
            timestamp,
        }
    }

    /// Assistant turn whose bubble text differs from the reply message
    pub(crate) fn assistant_with_content(
        content: impl Into<String>,
        agent_data: AgentResponse,
        timestamp: i64,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            agent_data: Some(agent_data),
            timestamp,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn agent_data(&self) -> Option<&AgentResponse> {
        self.agent_data.as_ref()
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// The history entry the agent should see for this turn.
    ///
    /// Error turns have no entry; assistant turns replay the raw reply message
    /// rather than the bubble text.
    pub fn history_entry(&self) -> Option<ConversationMessage> {
        match (self.role, &self.agent_data) {
            (Role::User, _) => Some(ConversationMessage::user(self.content.clone())),
            (Role::Assistant, Some(data)) => {
                Some(ConversationMessage::assistant(data.message.clone()))
            }
            (Role::Assistant, None) => None,
        }
    }
}

/// Minimal `{role, content}` turn sent to the agent as context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
