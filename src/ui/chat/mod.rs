//! Chat interface components
//!
//! Contains the chat screen, message display, and input components. All
//! conversation state lives in the `ConversationController` held by `AppState`;
//! these components only read it and forward user actions.

pub mod input;
pub mod message;
pub mod message_list;
pub mod typing;

use dioxus::prelude::*;
use input::ChatInput;
use message_list::MessageList;
use typing::TypingIndicator;

use crate::app::{AppState, BackendStatus};
use crate::ui::components::reset_button::ResetButton;

const SCROLL_TO_BOTTOM_JS: &str = r#"
    const el = document.getElementById('messages-end');
    if (el) { el.scrollIntoView({ behavior: 'smooth' }); }
"#;

#[component]
fn StatusBadge(status: BackendStatus) -> Element {
    let (class, label) = match status {
        BackendStatus::Unknown => ("status-dot unknown", "Connecting..."),
        BackendStatus::Online => ("status-dot online", "Online"),
        BackendStatus::Offline => ("status-dot offline", "Offline"),
    };

    rsx! {
        span { class: "status-badge", title: "Backend status",
            span { class: "{class}" }
            "{label}"
        }
    }
}

#[component]
pub fn ChatScreen() -> Element {
    let app_state = use_context::<AppState>();
    let mut controller = app_state.controller;

    // Keep the newest message in view
    use_effect(move || {
        let _ = controller.read().messages().len();
        let _ = controller.read().is_typing();
        spawn(async move {
            let _ = document::eval(SCROLL_TO_BOTTOM_JS).await;
        });
    });

    let handle_send = move |text: String| {
        let Some(ticket) = controller.write().begin_send(&text) else {
            return;
        };
        let gateway = controller.peek().gateway();
        spawn(async move {
            let completion = ticket.run(gateway.as_ref()).await;
            controller.write().finish_send(completion);
        });
    };

    let handle_reset = move |_: ()| {
        let Some(ticket) = controller.write().begin_reset() else {
            return;
        };
        let gateway = controller.peek().gateway();
        spawn(async move {
            let completion = ticket.run(gateway.as_ref()).await;
            if let Some(session_id) = controller.write().finish_reset(completion) {
                tracing::info!("Conversation reset, now in session {}", session_id);
            }
        });
    };

    let (messages, is_pending, is_typing) = {
        let state = controller.read();
        (state.messages().to_vec(), state.is_pending(), state.is_typing())
    };
    let status = *app_state.backend_status.read();

    rsx! {
        div { class: "chat-screen",
            div { class: "chat-header",
                div { class: "chat-title",
                    h1 { "News Bot" }
                    p { "Ask me anything about the latest news!" }
                }
                StatusBadge { status }
                ResetButton { on_reset: handle_reset }
            }

            div { class: "chat-messages",
                MessageList {
                    messages,
                    on_suggestion: handle_send,
                    disabled: is_pending,
                }
                if is_typing {
                    TypingIndicator {}
                }
                div { id: "messages-end" }
            }

            div { class: "chat-input",
                ChatInput { on_send: handle_send, disabled: is_pending }
            }
        }
    }
}
