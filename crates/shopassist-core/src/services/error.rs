use serde_json::Value;
use thiserror::Error;

/// Shown when a failure carries no message of its own
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failure of an external collaborator (agent or ingestion service).
///
/// The `Display` output is the human-readable message embedded in error
/// turns and upload status lines.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Failed(String),
}

impl ServiceError {
    /// Message for the user, never empty
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Extract a readable message from a non-2xx response body.
///
/// Looks for `error` (string or `{message}`) then `message`, falling back to
/// `"{service} returned status {code}"`.
pub(crate) fn rejection_message(body: &str, status: u16, service: &str) -> String {
    let from_body = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        let error = json.get("error");
        error
            .and_then(Value::as_str)
            .or_else(|| error.and_then(|e| e.get("message")).and_then(Value::as_str))
            .or_else(|| json.get("message").and_then(Value::as_str))
            .map(str::to_string)
    });

    match from_body {
        Some(message) if !message.trim().is_empty() => message,
        _ => format!("{} returned status {}", service, status),
    }
}
