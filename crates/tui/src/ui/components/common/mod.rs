pub mod text_input;

pub use text_input::TextInputState;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Applies a plain editing key to `input`.
///
/// Returns `true` when the text changed. Cursor movement returns `false`;
/// keys with Ctrl or Alt held are never consumed.
pub fn edit_text(input: &mut TextInputState, key: KeyEvent) -> bool {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return false;
    }
    match key.code {
        KeyCode::Char(c) => {
            input.insert_char(c);
            true
        }
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => {
            input.move_left();
            false
        }
        KeyCode::Right => {
            input.move_right();
            false
        }
        KeyCode::Home => {
            input.move_home();
            false
        }
        KeyCode::End => {
            input.move_end();
            false
        }
        _ => false,
    }
}
