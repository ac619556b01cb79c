//! Conversation controller
//!
//! Owns the session id, the message log, and the pending/typing flags. Each
//! remote call is split into a `begin_*` step that mutates state and hands out
//! a ticket, the ticket's `run` that talks to the gateway without borrowing
//! the controller, and a `finish_*` step that applies the outcome. The UI can
//! then hold the controller in a signal and only lock it around the sync parts.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::api::{ApiError, ChatReply, Gateway, HistoryResponse};
use crate::conversation::history::normalize_history;
use crate::conversation::log::MessageLog;
use crate::storage::session::{SessionStart, SessionStore};
use crate::types::config::ReplyDelay;
use crate::types::message::{Message, Role};

/// Identity of one remote call, used to discard completions that arrive after
/// a reset made them irrelevant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// An accepted send waiting for the backend
#[derive(Debug, Clone)]
pub struct SendTicket {
    request: RequestId,
    session_id: String,
    text: String,
    delay: Duration,
}

impl SendTicket {
    /// Call the backend, then hold a successful reply for the cosmetic delay
    pub async fn run(self, gateway: &dyn Gateway) -> SendCompletion {
        let result = gateway.send_message(&self.session_id, &self.text).await;
        if result.is_ok() && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        SendCompletion {
            request: self.request,
            result,
        }
    }
}

/// Outcome of a `SendTicket`
#[derive(Debug)]
pub struct SendCompletion {
    request: RequestId,
    result: Result<ChatReply, ApiError>,
}

/// A history fetch for a restored session
#[derive(Debug, Clone)]
pub struct HistoryTicket {
    request: RequestId,
    session_id: String,
}

impl HistoryTicket {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn run(self, gateway: &dyn Gateway) -> HistoryCompletion {
        let result = gateway.get_session_history(&self.session_id).await;
        HistoryCompletion {
            request: self.request,
            result,
        }
    }
}

/// Outcome of a `HistoryTicket`
#[derive(Debug)]
pub struct HistoryCompletion {
    request: RequestId,
    result: Result<HistoryResponse, ApiError>,
}

/// A backend reset for the current session
#[derive(Debug, Clone)]
pub struct ResetTicket {
    request: RequestId,
    session_id: String,
}

impl ResetTicket {
    pub async fn run(self, gateway: &dyn Gateway) -> ResetCompletion {
        let result = gateway.reset_session(&self.session_id).await;
        ResetCompletion {
            request: self.request,
            result,
        }
    }
}

/// Outcome of a `ResetTicket`
#[derive(Debug)]
pub struct ResetCompletion {
    request: RequestId,
    result: Result<Value, ApiError>,
}

pub struct ConversationController {
    gateway: Arc<dyn Gateway>,
    sessions: SessionStore,
    log: MessageLog,
    reply_delay: ReplyDelay,
    pending: bool,
    typing: bool,
    next_request: u64,
    send_in_flight: Option<RequestId>,
    history_in_flight: Option<RequestId>,
    reset_in_flight: Option<RequestId>,
}

impl ConversationController {
    pub fn new(gateway: Arc<dyn Gateway>, sessions: SessionStore, reply_delay: ReplyDelay) -> Self {
        Self {
            gateway,
            sessions,
            log: MessageLog::new(),
            reply_delay,
            pending: false,
            typing: false,
            next_request: 0,
            send_in_flight: None,
            history_in_flight: None,
            reset_in_flight: None,
        }
    }

    pub fn gateway(&self) -> Arc<dyn Gateway> {
        Arc::clone(&self.gateway)
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.sessions.current()
    }

    /// A send or reset is in flight
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The assistant reply is being "typed"
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    fn allocate_request(&mut self) -> RequestId {
        self.next_request += 1;
        RequestId(self.next_request)
    }

    /// Restore the stored session or create one. A restored session comes
    /// back with a ticket for loading its history.
    pub fn start(&mut self) -> Option<HistoryTicket> {
        match self.sessions.restore_or_create() {
            SessionStart::Restored(session_id) => {
                let request = self.allocate_request();
                self.history_in_flight = Some(request);
                Some(HistoryTicket {
                    request,
                    session_id,
                })
            }
            SessionStart::Created(_) => None,
        }
    }

    /// Replace the log with the fetched history. Failures are logged only.
    pub fn finish_history(&mut self, completion: HistoryCompletion) -> bool {
        if self.history_in_flight != Some(completion.request) {
            tracing::debug!("Dropping stale history load {:?}", completion.request);
            return false;
        }
        self.history_in_flight = None;

        let records = match completion.result {
            Ok(history) => history.messages.unwrap_or_default(),
            Err(e) => {
                tracing::error!("Failed to load session history: {}", e);
                return false;
            }
        };
        if records.is_empty() {
            return false;
        }

        tracing::debug!("Loaded {} messages from history", records.len());
        let messages = normalize_history(records, &mut self.log);
        self.log.replace_all(messages);
        true
    }

    /// Append the user's message and hand out a ticket for the backend call.
    /// Blank text or an in-flight operation makes this a no-op.
    pub fn begin_send(&mut self, text: &str) -> Option<SendTicket> {
        let text = text.trim();
        if text.is_empty() || self.pending {
            return None;
        }
        let session_id = self.sessions.current()?.to_string();

        let id = self.log.next_id();
        self.log.push(Message::new(id, Role::User, text));
        self.pending = true;
        self.typing = true;

        let request = self.allocate_request();
        self.send_in_flight = Some(request);
        tracing::info!("Sending message in session {}", session_id);

        Some(SendTicket {
            request,
            session_id,
            text: text.to_string(),
            delay: self.reply_delay.sample(),
        })
    }

    /// Append the reply, or the apology bubble on failure, and clear the flags
    pub fn finish_send(&mut self, completion: SendCompletion) -> bool {
        if self.send_in_flight != Some(completion.request) {
            tracing::debug!("Dropping stale reply {:?}", completion.request);
            return false;
        }
        self.send_in_flight = None;

        let id = self.log.next_id();
        let message = match completion.result {
            Ok(reply) => {
                let text = reply.text().to_string();
                Message::new(id, Role::Assistant, text)
                    .with_citations(reply.citations.unwrap_or_default())
            }
            Err(e) => {
                tracing::error!("Error sending message: {}", e);
                Message::send_error(id)
            }
        };
        self.log.push(message);

        self.typing = false;
        self.pending = self.reset_in_flight.is_some();
        true
    }

    /// Start a backend reset of the current session
    pub fn begin_reset(&mut self) -> Option<ResetTicket> {
        if self.reset_in_flight.is_some() {
            return None;
        }
        let session_id = self.sessions.current()?.to_string();

        let request = self.allocate_request();
        self.reset_in_flight = Some(request);
        self.pending = true;
        tracing::info!("Resetting session {}", session_id);

        Some(ResetTicket {
            request,
            session_id,
        })
    }

    /// Clear the log and switch to a new session id, whatever the backend said.
    /// In-flight sends and history loads for the old session are invalidated.
    pub fn finish_reset(&mut self, completion: ResetCompletion) -> Option<String> {
        if self.reset_in_flight != Some(completion.request) {
            return None;
        }
        self.reset_in_flight = None;

        if let Err(e) = completion.result {
            tracing::error!("Error resetting session: {}", e);
        }

        self.log.clear();
        self.send_in_flight = None;
        self.history_in_flight = None;
        self.pending = false;
        self.typing = false;

        Some(self.sessions.reset())
    }

    /// Run `start` and the history load to completion
    pub async fn restore(&mut self) {
        if let Some(ticket) = self.start() {
            let gateway = self.gateway();
            let completion = ticket.run(gateway.as_ref()).await;
            self.finish_history(completion);
        }
    }

    /// Run a whole send. Returns false when the send was a no-op.
    pub async fn send(&mut self, text: &str) -> bool {
        let Some(ticket) = self.begin_send(text) else {
            return false;
        };
        let gateway = self.gateway();
        let completion = ticket.run(gateway.as_ref()).await;
        self.finish_send(completion)
    }

    /// Run a whole reset, returning the new session id
    pub async fn reset(&mut self) -> Option<String> {
        let ticket = self.begin_reset()?;
        let gateway = self.gateway();
        let completion = ticket.run(gateway.as_ref()).await;
        self.finish_reset(completion)
    }
}
