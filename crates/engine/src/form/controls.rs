//! Dynamic field controls.
//!
//! Every visible [`FieldSchema`] maps to exactly one [`FieldControl`]. Front
//! ends paint rows from [`field_rows`] and report interactions as
//! [`FieldEdit`]s; [`apply_edit`] converts an edit into the field's complete
//! new value and routes it through [`FormState::update`], so list edits
//! always synchronize the whole sequence rather than a delta.

use conform_types::{FieldKind, FieldSchema, FieldValue};
use tracing::debug;

use crate::error::FormError;
use crate::form::synchronizer::FormState;

/// Label of the empty choice every select control offers first.
pub const SELECT_SENTINEL_LABEL: &str = "Select an option";

/// One choice in a select control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectChoice {
    pub label: String,
    /// Value propagated when chosen; empty for the sentinel.
    pub value: String,
}

/// Control rendered for a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldControl {
    /// File selection; chosen files live outside the form values.
    FileUpload {
        /// `zip` fields render their label and description, `file` fields do not.
        show_label: bool,
    },
    /// Growable list of text inputs.
    List { items: Vec<String> },
    /// Single choice among the schema options, sentinel first.
    Select { choices: Vec<SelectChoice>, selected: usize },
    /// Single-value editor for text, numeric, password, and checkbox kinds.
    SingleValue { kind: FieldKind, value: FieldValue },
}

/// Paintable description of one form row.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub optional: bool,
    pub control: FieldControl,
    pub error: Option<String>,
}

/// Interaction reported by a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    /// Replace a single-value field's text.
    SetText(String),
    /// Set a checkbox.
    SetChecked(bool),
    /// Flip a checkbox.
    Toggle,
    /// Choose the select choice at this index (0 is the sentinel).
    Select(usize),
    /// Append a blank list entry.
    ListPush,
    /// Remove the list entry at this index.
    ListRemove(usize),
    /// Replace the list entry at this index.
    ListSet(usize, String),
}

/// Choices for a select field: the sentinel followed by the schema options.
pub fn select_choices(field: &FieldSchema) -> Vec<SelectChoice> {
    let mut choices = vec![SelectChoice {
        label: SELECT_SENTINEL_LABEL.to_string(),
        value: String::new(),
    }];
    if let Some(options) = &field.options {
        choices.extend(options.iter().map(|option| SelectChoice {
            label: option.name.clone(),
            value: option.name.clone(),
        }));
    }
    choices
}

/// Builds the control for a field given its current value.
pub fn control_for(field: &FieldSchema, value: Option<&FieldValue>) -> FieldControl {
    match field.kind {
        FieldKind::File => FieldControl::FileUpload { show_label: false },
        FieldKind::Zip => FieldControl::FileUpload { show_label: true },
        FieldKind::List => FieldControl::List {
            items: value.and_then(FieldValue::as_list).map(<[String]>::to_vec).unwrap_or_default(),
        },
        FieldKind::Select => {
            let choices = select_choices(field);
            let current = value.and_then(FieldValue::as_text).unwrap_or_default();
            let selected = choices
                .iter()
                .position(|choice| choice.value == current)
                .unwrap_or(0);
            FieldControl::Select { choices, selected }
        }
        FieldKind::Checkbox => FieldControl::SingleValue {
            kind: field.kind,
            value: value.cloned().unwrap_or(FieldValue::Bool(false)),
        },
        FieldKind::Text | FieldKind::Number | FieldKind::Password | FieldKind::Other => FieldControl::SingleValue {
            kind: field.kind,
            value: value.cloned().unwrap_or_else(FieldValue::empty_text),
        },
    }
}

/// One row per visible schema, in schema order.
pub fn field_rows(schemas: &[FieldSchema], state: &FormState) -> Vec<FieldRow> {
    schemas
        .iter()
        .filter(|field| !field.hidden)
        .map(|field| FieldRow {
            name: field.name.clone(),
            label: field.label.clone(),
            description: field.description.clone(),
            optional: field.optional,
            control: control_for(field, state.value(&field.name)),
            error: state.field_error(&field.name).map(str::to_string),
        })
        .collect()
}

/// Full sequence after appending a blank entry.
pub fn list_pushed(items: &[String]) -> Vec<String> {
    let mut next = items.to_vec();
    next.push(String::new());
    next
}

/// Full sequence without the entry at `index`; unchanged when out of range.
pub fn list_removed(items: &[String], index: usize) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != index)
        .map(|(_, item)| item.clone())
        .collect()
}

/// Full sequence with the entry at `index` replaced; unchanged when out of range.
pub fn list_replaced(items: &[String], index: usize, text: String) -> Vec<String> {
    let mut next = items.to_vec();
    if let Some(slot) = next.get_mut(index) {
        *slot = text;
    }
    next
}

/// Applies a control interaction to a field.
///
/// Returns `Ok(false)` when the edit leaves the value unchanged (for example
/// removing an out-of-range list index), in which case nothing is
/// synchronized.
pub fn apply_edit(state: &mut FormState, field: &FieldSchema, edit: FieldEdit) -> Result<bool, FormError> {
    let current = state.value(&field.name).cloned();
    let next = match (field.kind, edit) {
        (FieldKind::File | FieldKind::Zip, _) => return Err(FormError::wrong_kind(&field.name, "value-bearing")),
        (FieldKind::List, edit) => {
            let items = current.as_ref().and_then(FieldValue::as_list).unwrap_or_default();
            let next = match edit {
                FieldEdit::ListPush => list_pushed(items),
                FieldEdit::ListRemove(index) => list_removed(items, index),
                FieldEdit::ListSet(index, text) => list_replaced(items, index, text),
                _ => return Err(FormError::wrong_kind(&field.name, "single-value")),
            };
            if next.as_slice() == items && current.is_some() {
                debug!(field = %field.name, "list edit left the sequence unchanged");
                return Ok(false);
            }
            FieldValue::List(next)
        }
        (FieldKind::Select, FieldEdit::Select(index)) => {
            let choices = select_choices(field);
            let Some(choice) = choices.get(index) else {
                return Ok(false);
            };
            FieldValue::Text(choice.value.clone())
        }
        (FieldKind::Select, FieldEdit::SetText(text)) => FieldValue::Text(text),
        (FieldKind::Checkbox, FieldEdit::SetChecked(checked)) => FieldValue::Bool(checked),
        (FieldKind::Checkbox, FieldEdit::Toggle) => {
            let checked = current.as_ref().and_then(FieldValue::as_bool).unwrap_or(false);
            FieldValue::Bool(!checked)
        }
        (FieldKind::Text | FieldKind::Number | FieldKind::Password | FieldKind::Other, FieldEdit::SetText(text)) => {
            FieldValue::Text(text)
        }
        (FieldKind::Select, _) => return Err(FormError::wrong_kind(&field.name, "list or checkbox")),
        (FieldKind::Checkbox, _) => return Err(FormError::wrong_kind(&field.name, "text, list, or select")),
        (FieldKind::Text | FieldKind::Number | FieldKind::Password | FieldKind::Other, _) => {
            return Err(FormError::wrong_kind(&field.name, "list, select, or checkbox"));
        }
    };
    state.update(&field.name, next)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::synchronizer::SharedValues;
    use conform_types::FieldValue;

    fn schemas() -> Vec<FieldSchema> {
        vec![
            FieldSchema::new("urls", "URLs", FieldKind::List).with_description("Pages to index"),
            FieldSchema::new("mode", "Mode", FieldKind::Select).with_options(["space", "page"]),
            FieldSchema::new("bare", "Bare", FieldKind::Select),
            FieldSchema::new("recursive", "Recursive", FieldKind::Checkbox),
            FieldSchema::new("archive", "Archive", FieldKind::Zip).optional(),
            FieldSchema::new("upload", "Upload", FieldKind::File),
            FieldSchema::new("hidden", "Hidden", FieldKind::Text).hidden_with_default(serde_json::json!("x")),
        ]
    }

    fn field<'a>(schemas: &'a [FieldSchema], name: &str) -> &'a FieldSchema {
        schemas.iter().find(|f| f.name == name).expect("field present")
    }

    #[test]
    fn one_row_per_visible_field() {
        let schemas = schemas();
        let state = FormState::from_schemas(&schemas, None, Box::new(SharedValues::new()));
        let rows = field_rows(&schemas, &state);
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["urls", "mode", "bare", "recursive", "archive", "upload"]);
        assert_eq!(rows[4].control, FieldControl::FileUpload { show_label: true });
        assert_eq!(rows[5].control, FieldControl::FileUpload { show_label: false });
        assert_eq!(rows[0].description.as_deref(), Some("Pages to index"));
    }

    #[test]
    fn select_without_options_has_only_sentinel() {
        let schemas = schemas();
        let choices = select_choices(field(&schemas, "bare"));
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].label, SELECT_SENTINEL_LABEL);
        assert_eq!(choices[0].value, "");
    }

    #[test]
    fn select_propagates_option_name() {
        let schemas = schemas();
        let store = SharedValues::new();
        let mut state = FormState::from_schemas(&schemas, None, Box::new(store.clone()));
        let mode = field(&schemas, "mode");
        assert!(apply_edit(&mut state, mode, FieldEdit::Select(2)).expect("select"));
        assert_eq!(store.get("mode"), Some(FieldValue::Text("page".into())));
        match control_for(mode, state.value("mode")) {
            FieldControl::Select { selected, .. } => assert_eq!(selected, 2),
            other => panic!("unexpected control {other:?}"),
        }
        assert!(apply_edit(&mut state, mode, FieldEdit::Select(0)).expect("sentinel"));
        assert_eq!(store.get("mode"), Some(FieldValue::empty_text()));
    }

    #[test]
    fn list_remove_syncs_full_sequence() {
        let schemas = schemas();
        let store = SharedValues::new();
        let mut state = FormState::from_schemas(&schemas, None, Box::new(store.clone()));
        let urls = field(&schemas, "urls");
        apply_edit(&mut state, urls, FieldEdit::ListSet(0, "a".into())).expect("set");
        apply_edit(&mut state, urls, FieldEdit::ListPush).expect("push");
        apply_edit(&mut state, urls, FieldEdit::ListSet(1, "b".into())).expect("set");
        apply_edit(&mut state, urls, FieldEdit::ListPush).expect("push");
        apply_edit(&mut state, urls, FieldEdit::ListSet(2, "c".into())).expect("set");
        assert!(apply_edit(&mut state, urls, FieldEdit::ListRemove(1)).expect("remove"));
        assert_eq!(store.get("urls"), Some(FieldValue::List(vec!["a".into(), "c".into()])));
        assert_eq!(state.value("urls"), store.get("urls").as_ref());
    }

    #[test]
    fn list_remove_out_of_range_is_noop() {
        let schemas = schemas();
        let store = SharedValues::new();
        let mut state = FormState::from_schemas(&schemas, None, Box::new(store.clone()));
        let urls = field(&schemas, "urls");
        assert!(!apply_edit(&mut state, urls, FieldEdit::ListRemove(9)).expect("remove"));
        assert!(store.get("urls").is_none());
        assert_eq!(state.value("urls"), Some(&FieldValue::List(vec![String::new()])));
    }

    #[test]
    fn checkbox_toggle_flips_value() {
        let schemas = schemas();
        let mut state = FormState::from_schemas(&schemas, None, Box::new(SharedValues::new()));
        let recursive = field(&schemas, "recursive");
        apply_edit(&mut state, recursive, FieldEdit::Toggle).expect("toggle");
        assert_eq!(state.value("recursive"), Some(&FieldValue::Bool(true)));
        apply_edit(&mut state, recursive, FieldEdit::Toggle).expect("toggle");
        assert_eq!(state.value("recursive"), Some(&FieldValue::Bool(false)));
    }

    #[test]
    fn file_fields_reject_value_edits() {
        let schemas = schemas();
        let mut state = FormState::from_schemas(&schemas, None, Box::new(SharedValues::new()));
        let upload = field(&schemas, "upload");
        let error = apply_edit(&mut state, upload, FieldEdit::SetText("x".into())).expect_err("file edit");
        assert!(matches!(error, FormError::WrongKind { .. }));
    }

    #[test]
    fn list_helpers_preserve_order() {
        let items = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(list_removed(&items, 0), vec!["b", "c"]);
        assert_eq!(list_removed(&items, 3), items);
        assert_eq!(list_replaced(&items, 1, "x".into()), vec!["a", "x", "c"]);
        assert_eq!(list_pushed(&items).len(), 4);
    }
}
