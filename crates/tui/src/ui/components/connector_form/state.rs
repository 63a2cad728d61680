//! Focus, editor buffer, and status bookkeeping for the connector form.

use conform_engine::{ConnectorForm, FieldControl, FieldEdit, FieldRow, FormStatusListener};
use conform_types::FieldKind;
use conform_util::expand_tilde;
use tracing::warn;

use crate::ui::components::common::TextInputState;

/// Focusable element of the connector form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// Index into [`ConnectorForm::rows`]; 0 is the connector name.
    Field(usize),
    PublicToggle,
    /// Index into the loaded groups.
    Group(usize),
    Submit,
}

/// Latest completability signal reported by the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormStatus {
    pub submittable: bool,
    pub advanced_allowed: bool,
}

impl FormStatusListener for FormStatus {
    fn form_status_changed(&mut self, submittable: bool) {
        self.submittable = submittable;
    }

    fn allow_advanced(&mut self, allowed: bool) {
        self.advanced_allowed = allowed;
    }
}

#[derive(Debug)]
pub struct ConnectorFormState {
    form: ConnectorForm,
    focus: FocusTarget,
    /// Focused item when a list field has focus.
    list_cursor: usize,
    editor: TextInputState,
    pub status: FormStatus,
    pub notice: Option<String>,
    pub scroll: usize,
}

impl ConnectorFormState {
    pub fn new(form: ConnectorForm) -> Self {
        let mut state = Self {
            form,
            focus: FocusTarget::Field(0),
            list_cursor: 0,
            editor: TextInputState::default(),
            status: FormStatus::default(),
            notice: None,
            scroll: 0,
        };
        state.load_editor();
        state
    }

    pub fn form(&self) -> &ConnectorForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ConnectorForm {
        &mut self.form
    }

    pub fn focus(&self) -> FocusTarget {
        self.focus
    }

    pub fn list_cursor(&self) -> usize {
        self.list_cursor
    }

    pub fn editor(&self) -> &TextInputState {
        &self.editor
    }

    /// Every focusable element currently on screen.
    pub fn focus_targets(&self) -> Vec<FocusTarget> {
        let mut targets: Vec<FocusTarget> = (0..self.form.rows().len()).map(FocusTarget::Field).collect();
        if self.form.shows_public_toggle() {
            targets.push(FocusTarget::PublicToggle);
        }
        if self.form.shows_group_section() {
            let count = self.form.access().groups().map_or(0, <[_]>::len);
            targets.extend((0..count).map(FocusTarget::Group));
        }
        targets.push(FocusTarget::Submit);
        targets
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, delta: isize) {
        let targets = self.focus_targets();
        let len = targets.len() as isize;
        let next = match targets.iter().position(|target| *target == self.focus) {
            Some(current) => (current as isize + delta).rem_euclid(len) as usize,
            None => 0,
        };
        self.set_focus(targets[next]);
    }

    pub fn set_focus(&mut self, target: FocusTarget) {
        self.focus = target;
        self.list_cursor = 0;
        self.load_editor();
    }

    /// Re-homes focus when the element it pointed at disappeared.
    pub fn ensure_focus_valid(&mut self) {
        if !self.focus_targets().contains(&self.focus) {
            self.set_focus(FocusTarget::Field(0));
        }
    }

    pub fn focused_row(&self) -> Option<FieldRow> {
        match self.focus {
            FocusTarget::Field(index) => self.form.rows().into_iter().nth(index),
            _ => None,
        }
    }

    /// Loads the editor with the focused value, or clears it.
    fn load_editor(&mut self) {
        let text = match self.focused_row().map(|row| row.control) {
            Some(FieldControl::SingleValue { kind, value }) if kind != FieldKind::Checkbox => {
                value.as_text().unwrap_or_default().to_string()
            }
            Some(FieldControl::List { items }) => items.get(self.list_cursor).cloned().unwrap_or_default(),
            _ => String::new(),
        };
        self.editor.set_input(text);
    }

    pub fn editor_mut(&mut self) -> &mut TextInputState {
        &mut self.editor
    }

    /// Applies an edit to the named field, logging rejected edits.
    pub fn apply(&mut self, field: &str, edit: FieldEdit) -> bool {
        match self.form.edit(field, edit) {
            Ok(changed) => changed,
            Err(error) => {
                warn!(%error, "edit rejected");
                false
            }
        }
    }

    /// Writes the editor text into the focused text field or list item.
    pub fn commit_editor(&mut self) -> bool {
        let Some(row) = self.focused_row() else {
            return false;
        };
        let text = self.editor.input().to_string();
        match row.control {
            FieldControl::SingleValue { kind, .. } if kind != FieldKind::Checkbox => {
                self.apply(&row.name, FieldEdit::SetText(text))
            }
            FieldControl::List { items } => {
                if items.is_empty() {
                    self.apply(&row.name, FieldEdit::ListPush);
                    self.list_cursor = 0;
                }
                self.apply(&row.name, FieldEdit::ListSet(self.list_cursor, text))
            }
            _ => false,
        }
    }

    /// Moves the list cursor; returns `false` at either end of the list.
    pub fn move_list_cursor(&mut self, delta: isize) -> bool {
        let Some(FieldControl::List { items }) = self.focused_row().map(|row| row.control) else {
            return false;
        };
        let target = self.list_cursor as isize + delta;
        if target < 0 || target >= items.len() as isize {
            return false;
        }
        self.list_cursor = target as usize;
        self.load_editor();
        true
    }

    /// Appends a blank item to the focused list and focuses it.
    pub fn push_list_item(&mut self) -> bool {
        let Some(row) = self.focused_row() else {
            return false;
        };
        let FieldControl::List { items } = &row.control else {
            return false;
        };
        let new_index = items.len();
        if !self.apply(&row.name, FieldEdit::ListPush) {
            return false;
        }
        self.list_cursor = new_index;
        self.load_editor();
        true
    }

    /// Removes the focused list item.
    pub fn remove_list_item(&mut self) -> bool {
        let Some(row) = self.focused_row() else {
            return false;
        };
        if !matches!(row.control, FieldControl::List { .. }) {
            return false;
        }
        if !self.apply(&row.name, FieldEdit::ListRemove(self.list_cursor)) {
            return false;
        }
        if let Some(FieldControl::List { items }) = self.focused_row().map(|row| row.control) {
            self.list_cursor = self.list_cursor.min(items.len().saturating_sub(1));
        }
        self.load_editor();
        true
    }

    /// Steps the focused select control, wrapping around the choices.
    pub fn cycle_select(&mut self, delta: isize) -> bool {
        let Some(row) = self.focused_row() else {
            return false;
        };
        let FieldControl::Select { choices, selected } = &row.control else {
            return false;
        };
        let len = choices.len() as isize;
        let next = (*selected as isize + delta).rem_euclid(len) as usize;
        self.apply(&row.name, FieldEdit::Select(next))
    }

    /// Flips the focused checkbox.
    pub fn toggle_checkbox(&mut self) -> bool {
        match self.focused_row() {
            Some(FieldRow {
                name,
                control: FieldControl::SingleValue { kind: FieldKind::Checkbox, .. },
                ..
            }) => self.apply(&name, FieldEdit::Toggle),
            _ => false,
        }
    }

    /// Adds the path typed into the editor to the file selection.
    pub fn add_typed_file(&mut self) -> bool {
        if self.editor.is_blank() {
            return false;
        }
        let path = expand_tilde(self.editor.input().trim());
        let added = self.form.add_file(path);
        self.editor.clear();
        added
    }

    pub fn remove_last_file(&mut self) -> bool {
        let count = self.form.selected_files().len();
        count > 0 && self.form.remove_file(count - 1).is_some()
    }

    pub fn toggle_public(&mut self) -> bool {
        let public = self.form.access().is_public();
        self.form.set_public(!public)
    }

    pub fn toggle_group_at(&mut self, index: usize) -> bool {
        let Some(group_id) = self
            .form
            .access()
            .groups()
            .and_then(|groups| groups.get(index))
            .map(|group| group.id)
        else {
            return false;
        };
        self.form.toggle_group(group_id)
    }

    /// Runs the per-frame form bookkeeping and records the status.
    pub fn render_pass(&mut self) -> bool {
        self.form.render_pass(&mut self.status)
    }
}
