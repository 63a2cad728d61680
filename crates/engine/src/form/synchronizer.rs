//! Form state synchronization.
//!
//! [`FormState`] owns the values a renderer paints from and is the only
//! writer to the caller's external store. Every mutation goes through
//! [`FormState::update`], which updates the local copy and forwards the same
//! field name and value to the [`ValueSink`] before anything else can
//! observe the change.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use conform_types::{CONNECTOR_NAME_FIELD, FieldKind, FieldSchema, FieldValue, FormValues};
use indexmap::IndexSet;
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::error::FormError;
use crate::form::ruleset::{FieldErrors, ValidationRuleset};

/// Receives every value change made through a [`FormState`].
pub trait ValueSink {
    fn update_value(&mut self, field: &str, value: &FieldValue);
}

impl<F> ValueSink for F
where
    F: FnMut(&str, &FieldValue),
{
    fn update_value(&mut self, field: &str, value: &FieldValue) {
        self(field, value)
    }
}

/// External store shared between the caller and the form.
#[derive(Debug, Clone, Default)]
pub struct SharedValues(Rc<RefCell<FormValues>>);

impl SharedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the caller's starting values.
    pub fn with_values(values: FormValues) -> Self {
        Self(Rc::new(RefCell::new(values)))
    }

    /// Copy of the values currently held by the store.
    pub fn snapshot(&self) -> FormValues {
        self.0.borrow().clone()
    }

    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.0.borrow().get(name).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

impl ValueSink for SharedValues {
    fn update_value(&mut self, field: &str, value: &FieldValue) {
        self.0.borrow_mut().insert(field.to_string(), value.clone());
    }
}

/// Sink that discards updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSink;

impl ValueSink for DetachedSink {
    fn update_value(&mut self, _field: &str, _value: &FieldValue) {}
}

/// Initial value for a field when no external default is available.
///
/// Hidden fields take their schema default; list fields start with a single
/// blank entry, checkboxes unchecked, and everything else as empty text.
pub fn derived_initial_value(field: &FieldSchema) -> FieldValue {
    if field.hidden {
        return field
            .default
            .clone()
            .map(FieldValue::from_json)
            .unwrap_or(FieldValue::Raw(JsonValue::Null));
    }
    match field.kind {
        FieldKind::List => FieldValue::List(vec![String::new()]),
        FieldKind::Checkbox => FieldValue::Bool(false),
        FieldKind::Text
        | FieldKind::Number
        | FieldKind::Password
        | FieldKind::Select
        | FieldKind::File
        | FieldKind::Zip
        | FieldKind::Other => FieldValue::empty_text(),
    }
}

/// Builds the initial values for a set of schemas.
///
/// External defaults win verbatim for any field they mention; other fields
/// fall back to [`derived_initial_value`].
pub fn initial_values(schemas: &[FieldSchema], external: Option<&FormValues>) -> FormValues {
    schemas
        .iter()
        .map(|field| {
            let value = external
                .and_then(|defaults| defaults.get(&field.name))
                .cloned()
                .unwrap_or_else(|| derived_initial_value(field));
            (field.name.clone(), value)
        })
        .collect()
}

/// Initial values for a connector form: the connector name first, then the
/// schema fields. A name among the external defaults wins over `initial_name`.
pub fn connector_initial_values(schemas: &[FieldSchema], initial_name: Option<&str>, external: Option<&FormValues>) -> FormValues {
    let mut values = FormValues::with_capacity(schemas.len() + 1);
    let name = external
        .and_then(|defaults| defaults.get(CONNECTOR_NAME_FIELD))
        .cloned()
        .unwrap_or_else(|| FieldValue::Text(initial_name.unwrap_or_default().to_string()));
    values.insert(CONNECTOR_NAME_FIELD.to_string(), name);
    values.extend(initial_values(schemas, external));
    values
}

/// Local form values, validation state, and the external store they mirror.
pub struct FormState {
    values: FormValues,
    ruleset: ValidationRuleset,
    errors: FieldErrors,
    touched: IndexSet<String>,
    sink: Box<dyn ValueSink>,
}

impl fmt::Debug for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("values", &self.values)
            .field("ruleset", &self.ruleset)
            .field("errors", &self.errors)
            .field("touched", &self.touched)
            .finish_non_exhaustive()
    }
}

impl FormState {
    /// Creates form state from prepared values and rules.
    pub fn new(values: FormValues, ruleset: ValidationRuleset, sink: Box<dyn ValueSink>) -> Self {
        let errors = ruleset.validate(&values);
        Self {
            values,
            ruleset,
            errors,
            touched: IndexSet::new(),
            sink,
        }
    }

    /// Creates form state for plain schemas, without a connector name.
    pub fn from_schemas(schemas: &[FieldSchema], external: Option<&FormValues>, sink: Box<dyn ValueSink>) -> Self {
        Self::new(initial_values(schemas, external), ValidationRuleset::from_schemas(schemas), sink)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn ruleset(&self) -> &ValidationRuleset {
        &self.ruleset
    }

    /// All current validation errors, touched or not.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Error to show inline for a field; only reported once it was edited.
    pub fn field_error(&self, name: &str) -> Option<&str> {
        if self.touched.contains(name) {
            self.errors.get(name).map(String::as_str)
        } else {
            None
        }
    }

    /// Marks every field touched so all errors become visible.
    pub fn touch_all(&mut self) {
        self.touched.extend(self.values.keys().cloned());
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Sets a field's value locally and in the external store.
    ///
    /// Unknown fields are rejected before either copy changes.
    pub fn update(&mut self, name: &str, value: FieldValue) -> Result<(), FormError> {
        if !self.values.contains_key(name) && !self.ruleset.contains(name) {
            return Err(FormError::unknown_field(name));
        }
        trace!(field = name, "form value updated");
        self.sink.update_value(name, &value);
        self.values.insert(name.to_string(), value);
        self.touched.insert(name.to_string());
        self.revalidate();
        Ok(())
    }

    fn revalidate(&mut self) {
        let errors = self.ruleset.validate(&self.values);
        if errors.len() != self.errors.len() {
            debug!(error_count = errors.len(), "form validation changed");
        }
        self.errors = errors;
    }
}
