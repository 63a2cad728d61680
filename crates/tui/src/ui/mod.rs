//! UI rendering module for the TUI application.

pub mod components;
pub mod runtime;
pub mod theme;
pub mod utils;
