use super::{ApiError, ApiResult};
use crate::config::TwinConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub response: String,
}

/// The two calls the conversation controller needs from the remote twin.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait ChatBackend {
    /// Readiness probe. The response body is not inspected.
    async fn health(&self) -> ApiResult<()>;

    async fn chat(&self, request: &ChatRequest) -> ApiResult<ChatReply>;
}

/// reqwest-backed client for the twin HTTP API
#[derive(Clone)]
pub struct TwinApi {
    client: Client,
    config: TwinConfig,
}

impl TwinApi {
    pub fn new(config: TwinConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(TwinConfig::from_env())
    }
}

impl PartialEq for TwinApi {
    fn eq(&self, other: &Self) -> bool {
        self.config == other.config
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl ChatBackend for TwinApi {
    async fn health(&self) -> ApiResult<()> {
        let response = self
            .client
            .get(self.config.health_url())
            .header(API_KEY_HEADER, &self.config.health_api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::Status { status, body })
        }
    }

    async fn chat(&self, request: &ChatRequest) -> ApiResult<ChatReply> {
        tracing::debug!(
            has_session = request.session_id.is_some(),
            "posting chat message"
        );
        let response = self
            .client
            .post(self.config.chat_url())
            .header(API_KEY_HEADER, &self.config.chat_api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status, body });
        }

        Ok(serde_json::from_str::<ChatReply>(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_session_id_until_assigned() {
        let first = ChatRequest {
            message: "hi".to_string(),
            session_id: None,
        };
        assert_eq!(serde_json::to_value(&first).unwrap(), json!({"message": "hi"}));

        let later = ChatRequest {
            message: "again".to_string(),
            session_id: Some("abc".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&later).unwrap(),
            json!({"message": "again", "session_id": "abc"})
        );
    }

    #[test]
    fn reply_ignores_extra_fields() {
        let reply: ChatReply = serde_json::from_value(json!({
            "session_id": "abc",
            "response": "hello",
            "latency_ms": 12
        }))
        .unwrap();
        assert_eq!(reply.session_id, "abc");
        assert_eq!(reply.response, "hello");
    }
}
