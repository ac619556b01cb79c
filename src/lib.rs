//! News Bot Library
//!
//! Core library for the News Bot desktop chat client.

pub mod api;
pub mod app;
pub mod conversation;
pub mod storage;
pub mod types;
pub mod ui;
