//! Reusable UI components

pub mod reset_button;
