//! Conversation thread and its empty state

use super::message::MessageBubble;
use crate::types::message::Message;
use dioxus::prelude::*;

/// Topics offered on an empty conversation
pub const SUGGESTIONS: [&str; 3] = ["Latest tech news", "Stock market updates", "World events"];

#[component]
fn EmptyState(on_suggestion: EventHandler<String>, disabled: bool) -> Element {
    rsx! {
        div { class: "empty-state",
            div { class: "empty-state-icon", "💬" }
            h3 { "Welcome to News Bot!" }
            p { "Ask me anything about the latest news and I'll help you find relevant information." }
            div { class: "suggestions",
                for suggestion in SUGGESTIONS {
                    button {
                        key: "{suggestion}",
                        class: "suggestion-tag",
                        disabled,
                        onclick: move |_| on_suggestion.call(suggestion.to_string()),
                        "{suggestion}"
                    }
                }
            }
        }
    }
}

#[component]
pub fn MessageList(
    messages: Vec<Message>,
    on_suggestion: EventHandler<String>,
    disabled: bool,
) -> Element {
    if messages.is_empty() {
        return rsx! {
            EmptyState { on_suggestion, disabled }
        };
    }

    rsx! {
        div { class: "message-list",
            for message in messages {
                MessageBubble { key: "{message.id}", message: message.clone() }
            }
        }
    }
}
