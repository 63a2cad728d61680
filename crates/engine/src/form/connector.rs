//! Connector creation form.
//!
//! [`ConnectorForm`] composes the pieces of the engine for one connector:
//! the schema-driven [`FormState`], the caller-owned file selection, and the
//! [`GroupAccess`] section shown when enterprise features are enabled. A
//! front end calls [`ConnectorForm::render_pass`] once per frame; that pass
//! applies render-time group auto-selection and reports completability to
//! the parent.

use std::fmt;
use std::path::PathBuf;

use conform_types::{CONNECTOR_NAME_FIELD, ConnectionConfiguration, FieldKind, FieldSchema, FieldValue, FormValues, UserGroup};
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::access::{GroupAccess, Visibility};
use crate::error::FormError;
use crate::form::controls::{FieldControl, FieldEdit, FieldRow, apply_edit, field_rows};
use crate::form::gate::{FormStatusListener, is_form_submittable};
use crate::form::ruleset::{CONNECTOR_NAME_LABEL, ValidationRuleset};
use crate::form::synchronizer::{FormState, ValueSink, connector_initial_values};
use crate::session::SessionState;

pub const CONNECTOR_NAME_DESCRIPTION: &str =
    "A descriptive name for the connector. This will be used to identify the connector in the Admin UI.";
pub const PUBLIC_TOGGLE_LABEL: &str = "Documents are Public?";
pub const PUBLIC_TOGGLE_DESCRIPTION: &str = "If set, then documents indexed by this connector will be visible to all users. \
     If turned off, then only users who explicitly have been given access to the documents (e.g. through a User Group) will have access";
pub const GROUP_SECTION_TITLE: &str = "Assign group access for this Connector";
const ADMIN_GROUP_HINT: &str = "This Connector will be visible/accessible by the groups selected below";
const CURATOR_GROUP_HINT: &str = "Curators must select one or more groups to give access to this Connector";

/// Inputs a parent supplies when opening a connector form.
#[derive(Debug, Clone, Default)]
pub struct ConnectorFormOptions {
    /// Prefilled connector name.
    pub initial_name: Option<String>,
    /// External defaults; any field they mention is taken verbatim.
    pub defaults: Option<FormValues>,
    /// Starting public flag and group selection.
    pub visibility: Visibility,
    /// Shows the public flag and group section.
    pub enterprise_features: bool,
}

/// Everything a parent needs to create the connector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorSubmission {
    pub name: String,
    pub connector_specific_config: IndexMap<String, JsonValue>,
    pub is_public: bool,
    pub groups: Vec<i64>,
    pub files: Vec<PathBuf>,
}

type NameObserver = Box<dyn FnMut(&str)>;

/// Model behind the dynamic connector form.
pub struct ConnectorForm {
    config: ConnectionConfiguration,
    state: FormState,
    access: GroupAccess,
    selected_files: Vec<PathBuf>,
    enterprise_features: bool,
    name_observer: Option<NameObserver>,
}

impl fmt::Debug for ConnectorForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorForm")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("access", &self.access)
            .field("selected_files", &self.selected_files)
            .field("enterprise_features", &self.enterprise_features)
            .finish_non_exhaustive()
    }
}

/// Rejects configurations with duplicate field names or a field that
/// collides with the connector name.
pub fn validate_configuration(config: &ConnectionConfiguration) -> Result<(), FormError> {
    let mut seen = IndexSet::with_capacity(config.values.len());
    for field in &config.values {
        if field.name == CONNECTOR_NAME_FIELD {
            return Err(FormError::ReservedField { name: field.name.clone() });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(FormError::DuplicateField { name: field.name.clone() });
        }
    }
    Ok(())
}

impl ConnectorForm {
    pub fn new(config: ConnectionConfiguration, options: ConnectorFormOptions, sink: Box<dyn ValueSink>) -> Result<Self, FormError> {
        validate_configuration(&config)?;
        let values = connector_initial_values(&config.values, options.initial_name.as_deref(), options.defaults.as_ref());
        let ruleset = ValidationRuleset::for_connector(&config.values);
        debug!(fields = config.values.len(), "connector form created");
        Ok(Self {
            state: FormState::new(values, ruleset, sink),
            config,
            access: GroupAccess::new(options.visibility),
            selected_files: Vec::new(),
            enterprise_features: options.enterprise_features,
            name_observer: None,
        })
    }

    /// Registers a callback invoked with the connector name on every change.
    pub fn with_name_observer(mut self, observer: impl FnMut(&str) + 'static) -> Self {
        self.name_observer = Some(Box::new(observer));
        self
    }

    pub fn config(&self) -> &ConnectionConfiguration {
        &self.config
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn values(&self) -> &FormValues {
        self.state.values()
    }

    pub fn access(&self) -> &GroupAccess {
        &self.access
    }

    pub fn enterprise_features(&self) -> bool {
        self.enterprise_features
    }

    pub fn name(&self) -> &str {
        self.state
            .value(CONNECTOR_NAME_FIELD)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
    }

    /// Row for the connector name input, always first.
    pub fn name_row(&self) -> FieldRow {
        FieldRow {
            name: CONNECTOR_NAME_FIELD.to_string(),
            label: CONNECTOR_NAME_LABEL.to_string(),
            description: Some(CONNECTOR_NAME_DESCRIPTION.to_string()),
            optional: false,
            control: FieldControl::SingleValue {
                kind: FieldKind::Text,
                value: FieldValue::Text(self.name().to_string()),
            },
            error: self.state.field_error(CONNECTOR_NAME_FIELD).map(str::to_string),
        }
    }

    /// Connector name followed by one row per visible field.
    pub fn rows(&self) -> Vec<FieldRow> {
        let mut rows = vec![self.name_row()];
        rows.extend(field_rows(&self.config.values, &self.state));
        rows
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), FormError> {
        let name = name.into();
        self.state.update(CONNECTOR_NAME_FIELD, FieldValue::Text(name.clone()))?;
        if let Some(observer) = self.name_observer.as_mut() {
            observer(&name);
        }
        Ok(())
    }

    /// Applies a control interaction to the named field.
    pub fn edit(&mut self, field: &str, edit: FieldEdit) -> Result<bool, FormError> {
        if field == CONNECTOR_NAME_FIELD {
            return match edit {
                FieldEdit::SetText(text) => self.set_name(text).map(|()| true),
                _ => Err(FormError::wrong_kind(field, "list, select, or checkbox")),
            };
        }
        let schema = self.schema(field)?.clone();
        apply_edit(&mut self.state, &schema, edit)
    }

    fn schema(&self, field: &str) -> Result<&FieldSchema, FormError> {
        self.config
            .values
            .iter()
            .find(|schema| schema.name == field && !schema.hidden)
            .ok_or_else(|| FormError::unknown_field(field))
    }

    /// Reveals every validation error, as on a submit attempt.
    pub fn touch_all(&mut self) {
        self.state.touch_all();
    }

    pub fn selected_files(&self) -> &[PathBuf] {
        &self.selected_files
    }

    /// Adds a file to the selection; already selected paths are ignored.
    pub fn add_file(&mut self, path: PathBuf) -> bool {
        if self.selected_files.contains(&path) {
            return false;
        }
        self.selected_files.push(path);
        true
    }

    pub fn remove_file(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.selected_files.len()).then(|| self.selected_files.remove(index))
    }

    /// Whether any visible field accepts file uploads.
    pub fn accepts_files(&self) -> bool {
        self.config.visible_fields().any(|field| field.kind.is_file_upload())
    }

    /// Records the resolved session; role-dependent rules apply from here on.
    pub fn apply_session(&mut self, session: &SessionState) {
        self.access.apply_session(session);
    }

    pub fn set_groups(&mut self, groups: Vec<UserGroup>) {
        self.access.set_groups(groups);
    }

    pub fn set_public(&mut self, public: bool) -> bool {
        self.enterprise_features && self.access.set_public(public)
    }

    pub fn toggle_group(&mut self, group_id: i64) -> bool {
        self.enterprise_features && self.access.toggle(group_id)
    }

    pub fn shows_public_toggle(&self) -> bool {
        self.enterprise_features && self.access.public_toggle_visible()
    }

    pub fn shows_group_section(&self) -> bool {
        self.enterprise_features && self.access.section_visible()
    }

    pub fn group_section_hint(&self) -> &'static str {
        if self.access.is_admin() { ADMIN_GROUP_HINT } else { CURATOR_GROUP_HINT }
    }

    /// True when the ruleset passes and the submission gate is open.
    pub fn is_submittable(&self) -> bool {
        self.state.is_valid() && is_form_submittable(self.state.values(), &self.config.values)
    }

    /// Per-frame bookkeeping: auto-selects the only group where the rules
    /// call for it, then reports completability to the parent.
    pub fn render_pass(&mut self, listener: &mut dyn FormStatusListener) -> bool {
        if self.shows_group_section() && self.access.auto_select() {
            info!(groups = ?self.access.selected_group_ids(), "group selection defaulted");
        }
        let submittable = self.is_submittable();
        listener.form_status_changed(submittable);
        listener.allow_advanced(submittable);
        submittable
    }

    /// Payload for connector creation, or `None` while the form is incomplete.
    pub fn submission(&self) -> Option<ConnectorSubmission> {
        self.submission_from(self.state.values())
    }

    /// Like [`ConnectorForm::submission`], but takes the connector config from
    /// `values`, typically the store the form has been writing to.
    pub fn submission_from(&self, values: &FormValues) -> Option<ConnectorSubmission> {
        if !self.is_submittable() {
            return None;
        }
        let connector_specific_config = values
            .iter()
            .filter(|(key, _)| key.as_str() != CONNECTOR_NAME_FIELD)
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        Some(ConnectorSubmission {
            name: self.name().trim().to_string(),
            connector_specific_config,
            is_public: self.access.is_public(),
            groups: self.access.selected_group_ids(),
            files: self.selected_files.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::synchronizer::{DetachedSink, SharedValues};
    use conform_types::{User, UserRole};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn config() -> ConnectionConfiguration {
        ConnectionConfiguration {
            description: "Configure Web connector".into(),
            subtext: None,
            values: vec![
                FieldSchema::new("base_url", "Base URL", FieldKind::Text),
                FieldSchema::new("scrape", "Scrape Type", FieldKind::Select).with_options(["recursive", "single"]),
                FieldSchema::new("source", "Source", FieldKind::Text).hidden_with_default(serde_json::json!("web")),
            ],
        }
    }

    fn form(enterprise_features: bool) -> ConnectorForm {
        let options = ConnectorFormOptions {
            enterprise_features,
            ..ConnectorFormOptions::default()
        };
        ConnectorForm::new(config(), options, Box::new(DetachedSink)).expect("form")
    }

    #[test]
    fn rejects_reserved_and_duplicate_names() {
        let mut config = config();
        config.values.push(FieldSchema::new("name", "Name", FieldKind::Text));
        let error = ConnectorForm::new(config, ConnectorFormOptions::default(), Box::new(DetachedSink)).expect_err("reserved");
        assert_eq!(error, FormError::ReservedField { name: "name".into() });

        let mut config = self::config();
        config.values.push(FieldSchema::new("base_url", "Again", FieldKind::Text));
        let error = validate_configuration(&config).expect_err("duplicate");
        assert_eq!(error, FormError::DuplicateField { name: "base_url".into() });
    }

    #[test]
    fn rows_start_with_name_and_skip_hidden_fields() {
        let form = form(false);
        let names: Vec<_> = form.rows().into_iter().map(|row| row.name).collect();
        assert_eq!(names, vec!["name", "base_url", "scrape"]);
    }

    #[test]
    fn name_changes_reach_observer_and_store() {
        let store = SharedValues::new();
        let seen = Rc::new(RefCell::new(String::new()));
        let observed = seen.clone();
        let mut form = ConnectorForm::new(config(), ConnectorFormOptions::default(), Box::new(store.clone()))
            .expect("form")
            .with_name_observer(move |name| *observed.borrow_mut() = name.to_string());
        form.edit("name", FieldEdit::SetText("Docs".into())).expect("set name");
        assert_eq!(*seen.borrow(), "Docs");
        assert_eq!(store.get("name"), Some(FieldValue::Text("Docs".into())));
    }

    #[test]
    fn hidden_fields_are_not_editable() {
        let mut form = form(false);
        let error = form.edit("source", FieldEdit::SetText("x".into())).expect_err("hidden");
        assert_eq!(error, FormError::unknown_field("source"));
    }

    #[test]
    fn submission_requires_gate_and_ruleset() {
        let mut form = form(false);
        assert!(form.submission().is_none());
        form.set_name("  Web  ").expect("name");
        form.edit("base_url", FieldEdit::SetText("https://docs.example.com".into())).expect("url");
        assert!(form.submission().is_none());
        form.edit("scrape", FieldEdit::Select(1)).expect("scrape");
        let submission = form.submission().expect("complete");
        assert_eq!(submission.name, "Web");
        assert_eq!(submission.connector_specific_config["scrape"], serde_json::json!("recursive"));
        assert_eq!(submission.connector_specific_config["source"], serde_json::json!("web"));
        assert!(!submission.connector_specific_config.contains_key("name"));
    }

    #[test]
    fn render_pass_notifies_parent_each_time() {
        let mut form = form(false);
        let mut statuses = Vec::new();
        let mut listener = |ok: bool| statuses.push(ok);
        form.render_pass(&mut listener);
        form.set_name("Web").expect("name");
        form.edit("base_url", FieldEdit::SetText("u".into())).expect("url");
        form.edit("scrape", FieldEdit::Select(2)).expect("scrape");
        form.render_pass(&mut listener);
        assert_eq!(statuses, vec![false, true]);
    }

    #[test]
    fn group_rules_apply_only_with_enterprise_features() {
        let member = SessionState::SignedIn(User::new("c@example.com", UserRole::Curator));

        let mut plain = form(false);
        plain.apply_session(&member);
        plain.set_groups(vec![UserGroup::new(4, "eng")]);
        plain.render_pass(&mut |_: bool| {});
        assert!(plain.access().selected_group_ids().is_empty());
        assert!(!plain.shows_group_section());

        let mut enterprise = form(true);
        enterprise.apply_session(&member);
        enterprise.set_groups(vec![UserGroup::new(4, "eng")]);
        enterprise.render_pass(&mut |_: bool| {});
        assert_eq!(enterprise.access().selected_group_ids(), vec![4]);
        assert!(!enterprise.toggle_group(4));
        assert!(!enterprise.shows_public_toggle());
        assert_eq!(enterprise.group_section_hint(), CURATOR_GROUP_HINT);
    }

    #[test]
    fn file_selection_is_kept_outside_values() {
        let mut config = config();
        config.values.push(FieldSchema::new("archive", "Archive", FieldKind::Zip));
        let mut form = ConnectorForm::new(config, ConnectorFormOptions::default(), Box::new(DetachedSink)).expect("form");
        assert!(form.accepts_files());
        assert!(form.add_file(PathBuf::from("/tmp/a.zip")));
        assert!(!form.add_file(PathBuf::from("/tmp/a.zip")));
        assert_eq!(form.selected_files().len(), 1);
        assert_eq!(form.values()["archive"], FieldValue::empty_text());
        assert_eq!(form.remove_file(0), Some(PathBuf::from("/tmp/a.zip")));
        assert_eq!(form.remove_file(0), None);
    }

    #[test]
    fn submission_can_be_built_from_the_parent_store() {
        let options = ConnectorFormOptions::default();
        let store = SharedValues::with_values(connector_initial_values(&config().values, None, None));
        let mut form = ConnectorForm::new(config(), options, Box::new(store.clone())).expect("form");
        form.set_name("Docs").expect("name");
        form.edit("base_url", FieldEdit::SetText("https://docs.example.com".into())).expect("url");
        assert!(form.submission_from(&store.snapshot()).is_none());

        form.edit("scrape", FieldEdit::Select(1)).expect("scrape");
        let submission = form.submission_from(&store.snapshot()).expect("submission");
        assert_eq!(Some(submission.clone()), form.submission());
        assert_eq!(submission.connector_specific_config["source"], serde_json::json!("web"));
        assert_eq!(submission.connector_specific_config["scrape"], serde_json::json!("recursive"));
        assert!(!submission.connector_specific_config.contains_key("name"));
    }
}
