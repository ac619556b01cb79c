//! Shared type definitions
//!
//! This module contains the data types shared by the conversation core and the UI.

pub mod config;
pub mod message;
