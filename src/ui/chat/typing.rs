//! "Bot is typing..." indicator

use dioxus::prelude::*;

#[component]
pub fn TypingIndicator() -> Element {
    rsx! {
        div { class: "typing-indicator",
            div { class: "typing-dots",
                span {}
                span {}
                span {}
            }
            span { class: "typing-text", "Bot is typing..." }
        }
    }
}
