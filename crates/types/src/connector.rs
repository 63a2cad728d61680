//! Connector configuration schemas and form values.
//!
//! A [`ConnectionConfiguration`] is the declarative description a connector
//! source hands to the console. Each [`FieldSchema`] describes one
//! configurable value; the form engine turns the ordered sequence into
//! initial [`FormValues`], a validation ruleset, and one control per visible
//! field.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Reserved key under which every connector form stores the connector name.
pub const CONNECTOR_NAME_FIELD: &str = "name";

/// Current values of a form keyed by field name, in schema order.
pub type FormValues = IndexMap<String, FieldValue>;

/// Top-level description of a connector's configurable values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ConnectionConfiguration {
    /// Heading rendered above the form.
    #[serde(default)]
    pub description: String,
    /// Optional supporting copy rendered beneath the heading.
    #[serde(default)]
    pub subtext: Option<String>,
    /// Ordered field schemas; authoring order is rendering order.
    #[serde(default)]
    pub values: Vec<FieldSchema>,
}

impl ConnectionConfiguration {
    /// Looks up the schema for a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.values.iter().find(|field| field.name == name)
    }

    /// Iterates the fields that produce a control.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.values.iter().filter(|field| !field.hidden)
    }
}

/// Declarative description of one configurable value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct FieldSchema {
    /// Unique key within a form.
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// Kind of control used to edit the value.
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    /// When true the field does not block submission.
    #[serde(default)]
    pub optional: bool,
    /// Hidden fields render no control and take their schema default.
    #[serde(default)]
    pub hidden: bool,
    /// Default used for hidden fields.
    #[serde(default)]
    pub default: Option<JsonValue>,
    /// Help text shown beneath the label.
    #[serde(default)]
    pub description: Option<String>,
    /// Choices for `select` fields.
    #[serde(default)]
    pub options: Option<Vec<SelectOption>>,
}

impl FieldSchema {
    /// Builds a visible, required field of the given kind.
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            optional: false,
            hidden: false,
            default: None,
            description: None,
            options: None,
        }
    }

    /// Marks the field optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Marks the field hidden with the provided default.
    pub fn hidden_with_default(mut self, default: JsonValue) -> Self {
        self.hidden = true;
        self.default = Some(default);
        self
    }

    /// Attaches select options by name.
    pub fn with_options<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(names.into_iter().map(|name| SelectOption { name: name.into() }).collect());
        self
    }

    /// Attaches help text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns true when a value must be supplied before submission.
    pub fn is_required(&self) -> bool {
        !self.optional
    }
}

/// One choice of a `select` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct SelectOption {
    pub name: String,
}

/// Control kinds a field schema may request.
///
/// Unknown kinds deserialize to [`FieldKind::Other`] and are edited as plain
/// text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Password,
    Checkbox,
    Select,
    List,
    File,
    Zip,
    #[serde(other)]
    Other,
}

impl FieldKind {
    /// Returns true for kinds whose selection lives outside the form values.
    pub fn is_file_upload(self) -> bool {
        matches!(self, FieldKind::File | FieldKind::Zip)
    }
}

/// Value held by a single form field.
///
/// The shape depends on the field kind: checkboxes hold booleans, list
/// fields an ordered sequence of strings, and everything else text. Hidden
/// fields may carry an arbitrary JSON default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
    Raw(JsonValue),
}

impl FieldValue {
    /// Empty text value.
    pub fn empty_text() -> Self {
        FieldValue::Text(String::new())
    }

    /// Returns true only for the empty string; other shapes never count.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Normalizes a JSON value into the closest typed variant.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Bool(flag) => FieldValue::Bool(flag),
            JsonValue::String(text) => FieldValue::Text(text),
            JsonValue::Array(items) if items.iter().all(JsonValue::is_string) => FieldValue::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        JsonValue::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
            ),
            other => FieldValue::Raw(other),
        }
    }

    /// Converts into a JSON value for payload assembly.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Bool(flag) => JsonValue::Bool(*flag),
            FieldValue::Text(text) => JsonValue::String(text.clone()),
            FieldValue::List(items) => JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect()),
            FieldValue::Raw(value) => value.clone(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}
