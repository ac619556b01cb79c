//! Message types
//!
//! Defines chat message records, roles, and citation sources.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Text shown when a record carries no usable content
pub const CONTENT_PLACEHOLDER: &str = "Message content not available";

/// Text of the synthetic bubble appended when a send fails
pub const SEND_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Displayed in place of a missing or unparsable timestamp
pub const JUST_NOW: &str = "Just now";

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Message typed by the user
    User,
    /// Reply from the news bot
    Assistant,
}

/// Unique message identifier, also used to build citation anchor ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A source reference attached to an assistant reply
///
/// Decoding never fails: a field of the wrong type is replaced by its default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct Citation {
    pub number: Option<u32>,
    pub title: String,
    pub url: String,
    pub score: Option<f64>,
}

impl From<Value> for Citation {
    fn from(value: Value) -> Self {
        Self {
            number: value.get("number").and_then(loose_number).and_then(whole_u32),
            title: value.get("title").map(loose_string).unwrap_or_default(),
            url: value.get("url").map(loose_string).unwrap_or_default(),
            score: value.get("score").and_then(loose_number),
        }
    }
}

/// Numbers, and strings holding a number
fn loose_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn whole_u32(n: f64) -> Option<u32> {
    (n.fract() == 0.0 && n >= 0.0 && n <= u32::MAX as f64).then_some(n as u32)
}

/// Strings as-is, other scalars in their JSON form, null and containers empty
pub fn loose_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

impl Citation {
    /// Number shown for this source: its own number, or its 1-based position.
    /// A zero number counts as absent.
    pub fn display_number(&self, index: usize) -> u32 {
        match self.number {
            Some(n) if n != 0 => n,
            _ => index as u32 + 1,
        }
    }

    /// Relevance as a whole percentage, hidden when missing or zero
    pub fn match_percent(&self) -> Option<i64> {
        self.score
            .filter(|s| *s != 0.0 && s.is_finite())
            .map(|s| (s * 100.0).round() as i64)
    }
}

/// A single chat message
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub role: Role,
    /// ISO-8601 instant; may be empty or garbage for repaired records
    pub timestamp: String,
    pub citations: Vec<Citation>,
    pub is_error: bool,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(id: MessageId, role: Role, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            role,
            timestamp: now_iso(),
            citations: Vec::new(),
            is_error: false,
        }
    }

    pub fn with_citations(mut self, citations: Vec<Citation>) -> Self {
        self.citations = citations;
        self
    }

    /// The fixed apology bubble shown when a send fails
    pub fn send_error(id: MessageId) -> Self {
        Self {
            is_error: true,
            ..Self::new(id, Role::Assistant, SEND_ERROR_TEXT)
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    /// Text to render, substituting the placeholder for empty content
    pub fn display_text(&self) -> &str {
        if self.text.is_empty() {
            CONTENT_PLACEHOLDER
        } else {
            &self.text
        }
    }

    /// Short local time for the bubble footer
    pub fn display_time(&self) -> String {
        format_time(&self.timestamp)
    }

    /// Anchor id of the source numbered `number`, if this message has one
    pub fn citation_anchor(&self, number: u32) -> Option<String> {
        self.citations
            .iter()
            .enumerate()
            .any(|(i, c)| c.display_number(i) == number)
            .then(|| citation_anchor_id(self.id, number))
    }
}

/// DOM id of a source link, unique per message
pub fn citation_anchor_id(message_id: MessageId, number: u32) -> String {
    format!("citation-{}-{}", message_id, number)
}

/// Current instant as an RFC 3339 string with millisecond precision
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Render an ISO-8601 timestamp as `hh:mm AM` local time, or "Just now".
/// Timestamps without an offset are taken as local time.
pub fn format_time(timestamp: &str) -> String {
    parse_local(timestamp.trim())
        .map(|dt| dt.format("%I:%M %p").to_string())
        .unwrap_or_else(|| JUST_NOW.to_string())
}

fn parse_local(timestamp: &str) -> Option<DateTime<Local>> {
    if timestamp.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local.from_local_datetime(&naive).earliest()
}
