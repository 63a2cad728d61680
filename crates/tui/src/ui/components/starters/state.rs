use std::path::PathBuf;

use conform_engine::{StarterMessageList, StarterPart};
use conform_types::StarterMessage;

use crate::ui::components::common::TextInputState;

/// Editing position and buffer for the starter message editor.
#[derive(Debug)]
pub struct StartersState {
    pub list: StarterMessageList,
    /// File the list is reloaded from.
    pub path: PathBuf,
    selected: usize,
    part: StarterPart,
    editor: TextInputState,
    pub notice: Option<String>,
    pub scroll: usize,
}

impl StartersState {
    pub fn new(path: PathBuf, messages: Vec<StarterMessage>) -> Self {
        Self {
            list: StarterMessageList::new(messages),
            path,
            selected: 0,
            part: StarterPart::Name,
            editor: TextInputState::default(),
            notice: None,
            scroll: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn part(&self) -> StarterPart {
        self.part
    }

    pub fn editor(&self) -> &TextInputState {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut TextInputState {
        &mut self.editor
    }

    /// Loads the focused part into the editor.
    pub fn load_editor(&mut self) {
        let text = self
            .list
            .messages()
            .get(self.selected)
            .map(|message| self.part.get(message).to_string())
            .unwrap_or_default();
        self.editor.set_input(text);
    }

    /// Writes the editor text into the focused part.
    pub fn commit_editor(&mut self) -> bool {
        self.list.set_part(self.selected, self.part, self.editor.input())
    }

    /// Moves through parts in reading order, wrapping across messages.
    pub fn step_part(&mut self, delta: isize) {
        let parts = StarterPart::ALL.len();
        let total = (self.list.len() * parts) as isize;
        if total == 0 {
            return;
        }
        let position = StarterPart::ALL.iter().position(|part| *part == self.part).unwrap_or(0);
        let current = (self.selected * parts + position) as isize;
        let next = (current + delta).rem_euclid(total) as usize;
        self.selected = next / parts;
        self.part = StarterPart::ALL[next % parts];
        self.load_editor();
    }

    /// Selects another message, keeping the focused part.
    pub fn step_message(&mut self, delta: isize) {
        let len = self.list.len() as isize;
        if len == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, len - 1) as usize;
        self.load_editor();
    }

    /// Blanks the selected message and reloads the editor.
    pub fn clear_selected(&mut self) -> bool {
        let cleared = self.list.clear(self.selected);
        self.load_editor();
        cleared
    }

    /// Keeps the selection inside the list after it shrank.
    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.list.len().saturating_sub(1));
        self.load_editor();
    }
}
