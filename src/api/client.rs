//! HTTP implementation of the backend gateway

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::{ApiError, ChatReply, ChatRequest, Gateway, HistoryResponse};
use crate::types::config::GatewayConfig;

/// Talks to the news bot backend over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, base })
    }

    /// Base URL joined with path segments; segments are percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        let body = response.text().await?;
        tracing::debug!("Backend response ({}): {}", status, body);
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send_message(&self, session_id: &str, message: &str) -> Result<ChatReply, ApiError> {
        let url = self.endpoint(&["api", "chat"])?;
        let result: Result<ChatReply, ApiError> = async {
            let response = self
                .client
                .post(url)
                .json(&ChatRequest {
                    session_id,
                    message,
                })
                .send()
                .await?;
            Self::read_json(response).await
        }
        .await;

        if let Err(e) = &result {
            tracing::error!("Error sending message: {}", e);
        }
        result
    }

    async fn get_session_history(&self, session_id: &str) -> Result<HistoryResponse, ApiError> {
        let url = self.endpoint(&["api", "session", session_id, "history"])?;
        let result: Result<HistoryResponse, ApiError> = async {
            let response = self.client.get(url).send().await?;
            Self::read_json(response).await
        }
        .await;

        if let Err(e) = &result {
            tracing::error!("Error fetching session history: {}", e);
        }
        result
    }

    async fn reset_session(&self, session_id: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(&["api", "session", session_id])?;
        let result: Result<Value, ApiError> = async {
            let response = self.client.delete(url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ApiError::Status(status));
            }
            // Some backends answer DELETE with an empty body
            let body = response.text().await?;
            if body.trim().is_empty() {
                Ok(Value::Null)
            } else {
                Ok(serde_json::from_str(&body)?)
            }
        }
        .await;

        if let Err(e) = &result {
            tracing::error!("Error resetting session: {}", e);
        }
        result
    }

    async fn check_health(&self) -> bool {
        let url = match self.endpoint(&["health"]) {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Health check failed: {}", e);
                return false;
            }
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::error!("Health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let gateway = HttpGateway::new(&GatewayConfig::new("http://localhost:3001")).unwrap();
        let url = gateway
            .endpoint(&["api", "session", "session_abc_1", "history"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/session/session_abc_1/history");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let gateway = HttpGateway::new(&GatewayConfig::new("http://host/newsbot/")).unwrap();
        let url = gateway.endpoint(&["api", "chat"]).unwrap();
        assert_eq!(url.as_str(), "http://host/newsbot/api/chat");
    }

    #[test]
    fn test_session_id_is_encoded() {
        let gateway = HttpGateway::new(&GatewayConfig::new("http://host")).unwrap();
        let url = gateway.endpoint(&["api", "session", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/session/a%2Fb%20c");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpGateway::new(&GatewayConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
