//! Message display components with clickable citation markers

use crate::app::{AppState, Highlight};
use crate::conversation::citations::{parse_segments, Segment};
use crate::types::message::{citation_anchor_id, Message, MessageId};
use dioxus::prelude::*;
use std::time::Duration;

/// How long a source link stays highlighted after its marker is clicked
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);

/// Highlight to show after a click, newer than `current`
fn next_highlight(current: Option<Highlight>, message_id: MessageId, number: u32) -> Highlight {
    Highlight {
        message_id,
        number,
        generation: current.map(|h| h.generation + 1).unwrap_or(0),
    }
}

/// Whether a timer started for `fired` may clear the highlight
fn should_clear(current: Option<Highlight>, fired: Highlight) -> bool {
    current == Some(fired)
}

/// Scroll the source link into view and flash it
fn flash_citation(mut highlight: Signal<Option<Highlight>>, message_id: MessageId, number: u32, anchor: String) {
    let flashed = next_highlight(*highlight.peek(), message_id, number);
    highlight.set(Some(flashed));

    spawn(async move {
        let js = format!(
            r#"document.getElementById("{anchor}")?.scrollIntoView({{ behavior: "smooth", block: "center" }});"#
        );
        let _ = document::eval(&js).await;

        expire_highlight(HIGHLIGHT_DURATION, flashed, move || *highlight.peek(), move || {
            highlight.set(None)
        })
        .await;
    });
}

/// Wait out `window`, then clear `fired` unless a newer click replaced it
async fn expire_highlight(
    window: Duration,
    fired: Highlight,
    current: impl Fn() -> Option<Highlight>,
    mut clear: impl FnMut(),
) {
    tokio::time::sleep(window).await;
    if should_clear(current(), fired) {
        clear();
    }
}

/// One rendered piece of assistant text
#[derive(Clone, PartialEq, Debug)]
enum TextPart {
    Plain(String),
    Marker {
        label: String,
        target: Option<u32>,
        /// Present only when the target resolves to a source of this message
        anchor: Option<String>,
    },
}

fn text_parts(message: &Message) -> Vec<TextPart> {
    if message.is_user() || message.text.is_empty() {
        return vec![TextPart::Plain(message.display_text().to_string())];
    }

    parse_segments(&message.text)
        .into_iter()
        .filter_map(|segment| match segment {
            Segment::Text(text) if text.is_empty() => None,
            Segment::Text(text) => Some(TextPart::Plain(text)),
            Segment::Marker(marker) => {
                let target = marker.target();
                Some(TextPart::Marker {
                    label: marker.display(),
                    target,
                    anchor: target.and_then(|n| message.citation_anchor(n)),
                })
            }
        })
        .collect()
}

#[component]
fn MessageText(message: Message) -> Element {
    let app_state = use_context::<AppState>();
    let message_id = message.id;
    let parts = text_parts(&message);

    rsx! {
        div { class: "message-text",
            for part in parts {
                {match part {
                    TextPart::Plain(text) => rsx! { "{text}" },
                    TextPart::Marker { label, target, anchor } => {
                        let title = target
                            .map(|n| format!("Click to view source {}", n))
                            .unwrap_or_default();
                        rsx! {
                            span {
                                class: "citation-number",
                                title: "{title}",
                                onclick: move |_| {
                                    if let (Some(number), Some(anchor)) = (target, anchor.clone()) {
                                        flash_citation(app_state.highlight, message_id, number, anchor);
                                    }
                                },
                                "{label}"
                            }
                        }
                    }
                }}
            }
        }
    }
}

#[component]
fn CitationList(message: Message) -> Element {
    let app_state = use_context::<AppState>();
    let highlighted = *app_state.highlight.read();

    rsx! {
        div { class: "citations",
            div { class: "citations-header", "Sources:" }
            for (index, citation) in message.citations.iter().enumerate() {
                {
                    let number = citation.display_number(index);
                    let is_highlighted = highlighted
                        .map(|h| h.message_id == message.id && h.number == number)
                        .unwrap_or(false);
                    let class = if is_highlighted {
                        "citation-link citation-highlight"
                    } else {
                        "citation-link"
                    };
                    rsx! {
                        a {
                            key: "{index}",
                            id: citation_anchor_id(message.id, number),
                            href: "{citation.url}",
                            target: "_blank",
                            rel: "noopener noreferrer",
                            class: "{class}",
                            span { class: "citation-index", "[{number}]" }
                            "{citation.title}"
                            {citation.match_percent().map(|percent| rsx! {
                                span { class: "citation-score", "({percent}% match)" }
                            })}
                        }
                    }
                }
            }
        }
    }
}

#[component]
pub fn MessageBubble(message: Message) -> Element {
    let side = if message.is_user() { "user" } else { "bot" };
    let error = if message.is_error { " error" } else { "" };
    let show_sources = !message.is_user() && !message.citations.is_empty();
    let time = message.display_time();

    rsx! {
        div { class: "message {side}{error} animate-fade-in-up",
            div { class: "message-content",
                MessageText { message: message.clone() }

                if show_sources {
                    CitationList { message: message.clone() }
                }

                div { class: "message-time", "{time}" }
            }
        }
    }
}
