//! Chat input component - textarea with the send button inside

use dioxus::prelude::*;

/// Estimate how many rows the textarea needs based on content
fn compute_rows(text: &str) -> usize {
    let newlines = text.chars().filter(|&c| c == '\n').count();
    // Each visual line ~ 70 chars for our input width
    let wrap_lines: usize = text
        .lines()
        .map(|line| {
            let chars = line.chars().count();
            if chars == 0 { 0 } else { (chars - 1) / 70 }
        })
        .sum();
    let total = newlines + wrap_lines + 1;
    total.clamp(1, 8)
}

/// Trimmed text if it is worth sending
fn submission(text: &str, disabled: bool) -> Option<String> {
    let trimmed = text.trim();
    (!disabled && !trimmed.is_empty()).then(|| trimmed.to_string())
}

#[component]
pub fn ChatInput(on_send: EventHandler<String>, disabled: bool) -> Element {
    let mut text = use_signal(String::new);

    let mut submit = move || {
        if let Some(message) = submission(&text(), disabled) {
            on_send.call(message);
            text.set(String::new());
        }
    };

    let handle_keydown = move |evt: KeyboardEvent| {
        if evt.key() == Key::Enter && !evt.modifiers().contains(Modifiers::SHIFT) {
            evt.prevent_default();
            submit();
        }
    };

    let can_send = submission(&text(), disabled).is_some();
    let rows = compute_rows(&text());
    let rows_str = format!("{}", rows);

    let send_class = if can_send {
        "send-button"
    } else {
        "send-button cursor-not-allowed opacity-30"
    };

    rsx! {
        form {
            class: "message-input",
            onsubmit: move |evt| {
                evt.prevent_default();
                submit();
            },

            div { class: "input-container",
                textarea {
                    class: "message-textarea",
                    placeholder: "Ask me anything about the news...",
                    value: "{text}",
                    oninput: move |evt| text.set(evt.value()),
                    onkeydown: handle_keydown,
                    disabled,
                    rows: "{rows_str}",
                }

                button {
                    r#type: "submit",
                    disabled: !can_send,
                    class: "{send_class}",
                    title: "Send (Enter)",
                    svg {
                        width: "20",
                        height: "20",
                        view_box: "0 0 24 24",
                        fill: "none",
                        path { d: "M2.01 21L23 12 2.01 3 2 10l15 2-15 2z", fill: "currentColor" }
                    }
                }
            }

            p { class: "input-hint", "Enter to send, Shift+Enter for a new line" }
        }
    }
}
