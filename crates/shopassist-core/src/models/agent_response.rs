use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::product::{Product, non_empty, scalar_text};

/// Chat bubble text used when the agent replied without a message
pub const MESSAGE_FALLBACK: &str = "I found some recommendations for you.";

static NULL: Value = Value::Null;

/// Normalized reply envelope.
///
/// Only ever built through [`AgentResponse::normalize`] (or the fixed sample
/// conversation), so the rest of the crate can rely on this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub message: String,
    pub recommendations: Vec<Product>,
    pub suggestions: Vec<String>,
}

impl AgentResponse {
    /// Convert an untrusted agent payload into a well-formed response.
    ///
    /// Total: any JSON value is accepted. A non-string message becomes `""`
    /// (numbers and booleans are rendered as text), and a non-array
    /// `recommendations` or `suggestions` becomes empty.
    pub fn normalize(raw: &Value) -> Self {
        let message = raw.get("message").and_then(scalar_text).unwrap_or_default();

        let recommendations = raw
            .get("recommendations")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Product::from_value).collect())
            .unwrap_or_default();

        let suggestions = raw
            .get("suggestions")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(scalar_text).collect())
            .unwrap_or_default();

        Self {
            message,
            recommendations,
            suggestions,
        }
    }

    /// Normalize the full collaborator reply, reading `response.result`
    pub fn from_reply(reply: &Value) -> Self {
        Self::normalize(reply_result(reply))
    }

    /// Text for the chat bubble
    pub fn display_message(&self) -> &str {
        non_empty(Some(self.message.as_str())).unwrap_or(MESSAGE_FALLBACK)
    }

    pub fn has_recommendations(&self) -> bool {
        !self.recommendations.is_empty()
    }

    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }
}

/// The part of a collaborator reply that carries the recommendation payload.
/// Any other shape resolves to `null`.
pub fn reply_result(reply: &Value) -> &Value {
    reply.pointer("/response/result").unwrap_or(&NULL)
}
