use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{ServiceError, rejection_message};
use crate::models::ConversationMessage;
use crate::settings::AppSettings;

const USER_AGENT: &str = "ShopAssist/0.1 (Recommendation Client)";

/// Turns a message plus history into a structured recommendation reply.
///
/// The reply is returned as raw JSON; callers normalize it with
/// [`AgentResponse::from_reply`](crate::models::AgentResponse::from_reply).
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    async fn invoke(
        &self,
        agent_id: &str,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<Value, ServiceError>;
}

#[derive(Serialize)]
struct InvokeRequest<'a> {
    agent_id: &'a str,
    message: &'a str,
    conversation_history: &'a [ConversationMessage],
}

/// Agent collaborator reached over HTTP
pub struct HttpAgentClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAgentClient {
    pub fn new(settings: &AppSettings) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            endpoint: settings.agent_endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl AgentInvoker for HttpAgentClient {
    async fn invoke(
        &self,
        agent_id: &str,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<Value, ServiceError> {
        debug!(
            agent_id = %agent_id,
            history_len = history.len(),
            "Invoking agent"
        );

        let body = InvokeRequest {
            agent_id,
            message,
            conversation_history: history,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = rejection_message(&body, status.as_u16(), "Agent service");
            warn!(status = %status, error = %message, "Agent service rejected request");
            return Err(ServiceError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer, api_key: Option<&str>) -> AppSettings {
        AppSettings {
            agent_endpoint: format!("{}/v1/agent/invoke", server.uri()),
            api_key: api_key.map(str::to_string),
            request_timeout_secs: 5,
            ..AppSettings::default()
        }
    }

    #[tokio::test]
    async fn test_posts_message_and_history() {
        let server = MockServer::start().await;
        let reply = json!({
            "response": { "result": { "message": "Here are laptops" } }
        });

        Mock::given(method("POST"))
            .and(path("/v1/agent/invoke"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!({
                "agent_id": "agent-1",
                "message": "I need a laptop",
                "conversation_history": [
                    { "role": "user", "content": "I need a laptop" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpAgentClient::new(&settings_for(&server, Some("secret"))).unwrap();
        let history = vec![ConversationMessage::user("I need a laptop")];

        let result = client
            .invoke("agent-1", "I need a laptop", &history)
            .await
            .unwrap();

        assert_eq!(result, reply);
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected_with_body_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({ "error": "agent overloaded" })),
            )
            .mount(&server)
            .await;

        let client = HttpAgentClient::new(&settings_for(&server, None)).unwrap();
        let err = client.invoke("agent-1", "hi", &[]).await.unwrap_err();

        match &err {
            ServiceError::Rejected { status, .. } => assert_eq!(*status, 503),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.user_message(), "agent overloaded");
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = HttpAgentClient::new(&settings_for(&server, None)).unwrap();
        let err = client.invoke("agent-1", "hi", &[]).await.unwrap_err();

        assert!(matches!(err, ServiceError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_any_json_shape_is_passed_through() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([1, 2, 3])))
            .mount(&server)
            .await;

        let client = HttpAgentClient::new(&settings_for(&server, None)).unwrap();
        let result = client.invoke("agent-1", "hi", &[]).await.unwrap();

        assert_eq!(result, json!([1, 2, 3]));
    }
}
