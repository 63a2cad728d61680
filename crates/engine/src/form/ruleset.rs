//! Validation ruleset derived from field schemas.
//!
//! Each field gets a rule describing the value shape it accepts and, for
//! non-optional fields, the message shown when no value is present. The
//! connector name always carries a required text rule.

use conform_types::{CONNECTOR_NAME_FIELD, FieldKind, FieldSchema, FieldValue, FormValues};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;

/// Label used for the connector name rule.
pub const CONNECTOR_NAME_LABEL: &str = "Connector Name";

/// Per-field validation messages keyed by field name.
pub type FieldErrors = IndexMap<String, String>;

/// Value shape a rule accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Text,
    Boolean,
    StringList,
}

impl ValueShape {
    fn for_kind(kind: FieldKind) -> Self {
        match kind {
            FieldKind::List => ValueShape::StringList,
            FieldKind::Checkbox => ValueShape::Boolean,
            FieldKind::Text
            | FieldKind::Number
            | FieldKind::Password
            | FieldKind::Select
            | FieldKind::File
            | FieldKind::Zip
            | FieldKind::Other => ValueShape::Text,
        }
    }
}

/// Validation rule for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub label: String,
    pub shape: ValueShape,
    /// Present when the field is required.
    pub required_message: Option<String>,
}

impl FieldRule {
    fn from_schema(schema: &FieldSchema) -> Self {
        Self {
            label: schema.label.clone(),
            shape: ValueShape::for_kind(schema.kind),
            required_message: schema.is_required().then(|| format!("{} is required", schema.label)),
        }
    }

    /// Checks a value against the rule, returning the message to show inline.
    pub fn check(&self, value: Option<&FieldValue>) -> Option<String> {
        let missing = || self.required_message.clone();
        let Some(value) = value else {
            return missing();
        };
        match (self.shape, value) {
            (_, FieldValue::Raw(JsonValue::Null)) => missing(),
            (ValueShape::Text, FieldValue::Text(text)) if text.is_empty() => missing(),
            (ValueShape::Text, FieldValue::Text(_) | FieldValue::Raw(_)) => None,
            (ValueShape::Text, _) => Some(format!("{} must be text", self.label)),
            (ValueShape::Boolean, FieldValue::Bool(_)) => None,
            (ValueShape::Boolean, FieldValue::Text(text)) if matches!(text.as_str(), "true" | "false") => None,
            (ValueShape::Boolean, _) => Some(format!("{} must be true or false", self.label)),
            (ValueShape::StringList, FieldValue::List(items)) if items.is_empty() => missing(),
            (ValueShape::StringList, FieldValue::List(_)) => None,
            (ValueShape::StringList, _) => Some(format!("{} must be a list of text values", self.label)),
        }
    }
}

/// Rules for every field of a form, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRuleset {
    rules: IndexMap<String, FieldRule>,
}

impl ValidationRuleset {
    /// Builds the ruleset for a connector form: the connector name followed by
    /// one rule per schema.
    pub fn for_connector(schemas: &[FieldSchema]) -> Self {
        let mut rules = IndexMap::with_capacity(schemas.len() + 1);
        rules.insert(
            CONNECTOR_NAME_FIELD.to_string(),
            FieldRule {
                label: CONNECTOR_NAME_LABEL.to_string(),
                shape: ValueShape::Text,
                required_message: Some(format!("{CONNECTOR_NAME_LABEL} is required")),
            },
        );
        for schema in schemas {
            rules.insert(schema.name.clone(), FieldRule::from_schema(schema));
        }
        Self { rules }
    }

    /// Builds a ruleset from schemas alone.
    pub fn from_schemas(schemas: &[FieldSchema]) -> Self {
        let rules = schemas
            .iter()
            .map(|schema| (schema.name.clone(), FieldRule::from_schema(schema)))
            .collect();
        Self { rules }
    }

    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validates one field; unknown names pass.
    pub fn validate_field(&self, name: &str, value: Option<&FieldValue>) -> Option<String> {
        self.rules.get(name).and_then(|rule| rule.check(value))
    }

    /// Validates every ruled field against the provided values.
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        self.rules
            .iter()
            .filter_map(|(name, rule)| rule.check(values.get(name)).map(|message| (name.clone(), message)))
            .collect()
    }

    pub fn is_valid(&self, values: &FormValues) -> bool {
        self.validate(values).is_empty()
    }
}
