//! UI components for News Bot
//!
//! This module contains all user interface components built with Dioxus.

pub mod chat;
pub mod components;

pub use chat::ChatScreen;
