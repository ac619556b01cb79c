//! Conversation core
//!
//! Session lifecycle, the message log, history repair, and inline citation
//! parsing. Nothing in here depends on the UI.

pub mod citations;
pub mod controller;
pub mod history;
pub mod log;

pub use controller::ConversationController;
