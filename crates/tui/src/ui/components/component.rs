//! Component system for the Conform TUI.
//!
//! Components are self-contained screens that own their state, react to
//! keys and messages, and render themselves. They never perform I/O; side
//! effects are reported back to the runtime as [`Effect`]s.

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Effect, Msg};

/// A trait representing a UI component with its own state and behavior.
///
/// # Component Lifecycle
///
/// 1. `init()` runs once when the component is created.
/// 2. `on_route_enter()` runs once before the first frame and may request
///    data loads.
/// 3. `handle_key_events()` and `update()` react to input and messages.
/// 4. `render()` draws the component into the provided frame area.
pub trait Component {
    /// Initialize any internal state.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Effects to run when the screen becomes active.
    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle key events; the active screen always has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Update internal state based on an application message.
    fn update(&mut self, _app: &mut App, _msg: &Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into the given area.
    ///
    /// Rendering may update per-frame bookkeeping but must not perform I/O.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}
