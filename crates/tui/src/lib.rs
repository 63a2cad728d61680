//! # Conform TUI Library
//!
//! Terminal front end for the Conform admin console forms, built on
//! Ratatui. Each run opens exactly one [`Screen`]:
//!
//! - the dynamic connector form for a connection configuration
//! - the starter message editor
//! - the tenant impersonation page
//!
//! and returns the [`ScreenOutcome`] the user left it with. Callers decide
//! what to do with the result (print it, write it back, and so on).

mod app;
mod cmd;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use conform_api::ConsoleApi;

pub use app::{Screen, ScreenOutcome};
pub use cmd::{read_starter_file, write_starter_file};

/// Runs the TUI on `screen` until the user finishes or cancels it.
///
/// # Errors
///
/// Returns an error when the terminal cannot be set up, drawn to, or
/// restored.
pub async fn run(api: Arc<dyn ConsoleApi>, screen: Screen) -> Result<ScreenOutcome> {
    ui::runtime::run_app(api, screen).await
}
