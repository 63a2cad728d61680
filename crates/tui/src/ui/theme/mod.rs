//! Theme styling for the TUI.
//!
//! Components ask the active [`Theme`] for semantic styles instead of
//! hard-coding colors. `NO_COLOR` switches to the terminal's own palette.

use std::env;

use ratatui::style::Color;
use tracing::debug;

pub mod nord;
pub mod roles;

pub use nord::NordTheme;
pub use roles::{Theme, ThemeRoles};

/// Theme that defers every color to the terminal.
#[derive(Debug, Clone)]
pub struct PlainTheme {
    roles: ThemeRoles,
}

impl Default for PlainTheme {
    fn default() -> Self {
        Self {
            roles: ThemeRoles {
                background: Color::Reset,
                surface: Color::Reset,
                border: Color::Reset,
                text: Color::Reset,
                text_secondary: Color::Reset,
                text_muted: Color::DarkGray,
                accent_primary: Color::Reset,
                info: Color::Reset,
                success: Color::Reset,
                warning: Color::Reset,
                error: Color::Reset,
                selection_bg: Color::Reset,
                selection_fg: Color::Reset,
                focus: Color::Reset,
            },
        }
    }
}

impl Theme for PlainTheme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}

/// Picks the theme for this session.
pub fn load_from_env() -> Box<dyn Theme> {
    if env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()) {
        debug!("NO_COLOR set; using plain theme");
        return Box::new(PlainTheme::default());
    }
    Box::new(NordTheme::new())
}
