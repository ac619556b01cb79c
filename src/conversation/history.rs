//! Repair of history records fetched from the backend

use crate::api::HistoryRecord;
use crate::conversation::log::MessageLog;
use crate::types::message::{now_iso, Message, MessageId, Role, CONTENT_PLACEHOLDER};
use chrono::{TimeZone, Utc};
use serde_json::Value;

/// Turn loosely typed history records into messages, filling gaps with
/// defaults instead of rejecting them.
pub fn normalize_history(records: Vec<HistoryRecord>, log: &mut MessageLog) -> Vec<Message> {
    records
        .into_iter()
        .map(|record| normalize_record(record, log))
        .collect()
}

fn normalize_record(record: HistoryRecord, log: &mut MessageLog) -> Message {
    let id = record
        .id
        .as_ref()
        .and_then(id_from_value)
        .unwrap_or_else(|| log.next_id());

    let role = match record.role.as_ref().and_then(Value::as_str) {
        Some("user") => Role::User,
        _ => Role::Assistant,
    };

    let text = [&record.text, &record.content, &record.message]
        .into_iter()
        .find_map(|field| field.as_ref().and_then(non_empty_str))
        .unwrap_or(CONTENT_PLACEHOLDER)
        .to_string();

    let timestamp = record
        .timestamp
        .as_ref()
        .and_then(timestamp_from_value)
        .unwrap_or_else(now_iso);

    Message {
        id,
        text,
        role,
        timestamp,
        citations: record.citations.unwrap_or_default(),
        is_error: false,
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn id_from_value(value: &Value) -> Option<MessageId> {
    match value {
        Value::Number(n) => n.as_u64().map(MessageId),
        Value::String(s) => s.trim().parse().ok().map(MessageId),
        _ => None,
    }
}

/// Strings are kept as-is (bad ones render as "Just now"); numbers are unix millis
fn timestamp_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        _ => None,
    }
}
