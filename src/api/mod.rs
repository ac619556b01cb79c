//! Backend gateway
//!
//! The four remote operations the chat needs, behind a trait so the
//! conversation core can run against a fake in tests.

pub mod client;

use crate::types::message::{loose_string, Citation};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use client::HttpGateway;

/// Gateway errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP error! status: {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
}

/// Response of `POST /api/chat`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default, deserialize_with = "loose_reply")]
    pub reply: Option<String>,
    #[serde(default, deserialize_with = "loose_citations")]
    pub citations: Option<Vec<Citation>>,
}

impl ChatReply {
    pub fn text(&self) -> &str {
        self.reply.as_deref().unwrap_or_default()
    }
}

/// Response of `GET /api/session/{id}/history`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default, deserialize_with = "loose_records")]
    pub messages: Option<Vec<HistoryRecord>>,
}

/// One stored message as the backend returns it
///
/// Fields are loosely typed; the conversation layer repairs them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub role: Option<Value>,
    #[serde(default)]
    pub text: Option<Value>,
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default, deserialize_with = "loose_citations")]
    pub citations: Option<Vec<Citation>>,
}

fn loose_reply<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Some(loose_string(&value)),
        _ => None,
    })
}

fn loose_citations<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<Citation>>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(items.into_iter().map(Citation::from).collect()),
        _ => None,
    })
}

/// A record that is not an object becomes an empty record
fn loose_records<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<HistoryRecord>>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    })
}

/// Remote operations of the news bot backend
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Send a user message and get the bot's reply
    async fn send_message(&self, session_id: &str, message: &str) -> Result<ChatReply, ApiError>;

    /// Fetch previously exchanged messages for a session
    async fn get_session_history(&self, session_id: &str) -> Result<HistoryResponse, ApiError>;

    /// Ask the backend to forget a session
    async fn reset_session(&self, session_id: &str) -> Result<Value, ApiError>;

    /// Whether the backend answers its health endpoint; never fails
    async fn check_health(&self) -> bool;
}
