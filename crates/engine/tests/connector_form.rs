use conform_engine::form::{DetachedSink, SharedValues, initial_values};
use conform_engine::{
    ConnectorForm, ConnectorFormOptions, FieldEdit, FormState, SessionState, StarterMessageList, Visibility, is_form_submittable,
};
use conform_types::{ConnectionConfiguration, FieldKind, FieldSchema, FieldValue, StarterMessage, User, UserGroup, UserRole};

fn load_fixture() -> ConnectionConfiguration {
    let yaml = include_str!("data/web_connector.yaml");
    serde_yaml::from_str(yaml).expect("parse connector fixture")
}

#[test]
fn host_and_optional_port_scenario() {
    let schemas = vec![
        FieldSchema::new("host", "Host", FieldKind::Text),
        FieldSchema::new("port", "Port", FieldKind::Text).optional(),
    ];
    let store = SharedValues::new();
    let mut state = FormState::from_schemas(&schemas, None, Box::new(store.clone()));
    let mut values = state.values().clone();
    values.insert("name".into(), "connector".into());
    assert_eq!(values["host"], FieldValue::empty_text());
    assert_eq!(values["port"], FieldValue::empty_text());
    assert!(!is_form_submittable(&values, &schemas));

    state.update("host", "example.com".into()).expect("set host");
    let mut values = state.values().clone();
    values.insert("name".into(), "connector".into());
    assert!(is_form_submittable(&values, &schemas));
    assert_eq!(store.get("host"), Some(FieldValue::Text("example.com".into())));
}

#[test]
fn fixture_form_becomes_submittable_once_required_fields_are_filled() {
    let store = SharedValues::new();
    let mut form = ConnectorForm::new(load_fixture(), ConnectorFormOptions::default(), Box::new(store.clone()))
        .expect("build form");

    let mut statuses = Vec::new();
    form.render_pass(&mut |ok: bool| statuses.push(ok));

    form.edit("name", FieldEdit::SetText("Docs".into())).expect("name");
    form.edit("base_url", FieldEdit::SetText("https://docs.example.com".into()))
        .expect("base url");
    form.edit("allowed_paths", FieldEdit::ListSet(0, "/guides".into())).expect("path");
    form.edit("follow_redirects", FieldEdit::Toggle).expect("redirects");
    form.render_pass(&mut |ok: bool| statuses.push(ok));

    assert_eq!(statuses, vec![false, true]);
    assert_eq!(
        store.get("allowed_paths"),
        Some(FieldValue::List(vec!["/guides".into()]))
    );
    let submission = form.submission().expect("submission");
    assert_eq!(submission.connector_specific_config["source"], serde_json::json!("web"));
    assert_eq!(submission.connector_specific_config["web_connector_type"], serde_json::json!(""));
}

#[test]
fn list_remove_keeps_external_store_in_step() {
    let schemas = vec![FieldSchema::new("urls", "URLs", FieldKind::List)];
    let mut external = conform_types::FormValues::new();
    external.insert(
        "urls".into(),
        FieldValue::List(vec!["a".into(), "b".into(), "c".into(), "d".into()]),
    );
    for index in 0..4 {
        let store = SharedValues::new();
        let mut state = FormState::from_schemas(&schemas, Some(&external), Box::new(store.clone()));
        conform_engine::form::apply_edit(&mut state, &schemas[0], FieldEdit::ListRemove(index)).expect("remove");
        let mut expected = vec!["a".to_string(), "b".into(), "c".into(), "d".into()];
        expected.remove(index);
        assert_eq!(store.get("urls"), Some(FieldValue::List(expected)));
    }
}

#[test]
fn curator_with_one_group_gets_it_selected_and_keeps_it() {
    let options = ConnectorFormOptions {
        enterprise_features: true,
        visibility: Visibility::Public,
        ..ConnectorFormOptions::default()
    };
    let mut form = ConnectorForm::new(load_fixture(), options, Box::new(DetachedSink)).expect("build form");
    form.set_groups(vec![UserGroup::new(11, "support")]);

    // No auto-selection before the viewer is known.
    form.render_pass(&mut |_: bool| {});
    assert!(form.access().is_public());

    form.apply_session(&SessionState::SignedIn(User::new("curator@example.com", UserRole::Curator)));
    assert!(!form.access().is_public());
    form.render_pass(&mut |_: bool| {});
    assert_eq!(form.access().selected_group_ids(), vec![11]);
    assert!(!form.toggle_group(11));
    assert!(!form.set_public(true));
    assert_eq!(form.access().selected_group_ids(), vec![11]);
}

#[test]
fn admin_going_public_clears_groups() {
    let options = ConnectorFormOptions {
        enterprise_features: true,
        ..ConnectorFormOptions::default()
    };
    let mut form = ConnectorForm::new(load_fixture(), options, Box::new(DetachedSink)).expect("build form");
    form.apply_session(&SessionState::SignedIn(User::new("admin@example.com", UserRole::Admin)));
    form.set_groups(vec![UserGroup::new(1, "eng"), UserGroup::new(2, "ops")]);
    assert!(form.shows_public_toggle());
    assert!(form.toggle_group(1));
    assert!(form.toggle_group(2));
    assert!(form.set_public(true));
    assert!(form.access().selected_group_ids().is_empty());
    assert!(!form.shows_group_section());
}

#[test]
fn initial_values_prefer_external_defaults() {
    let config = load_fixture();
    let mut external = conform_types::FormValues::new();
    external.insert("follow_redirects".into(), FieldValue::Bool(true));
    let values = initial_values(&config.values, Some(&external));
    assert_eq!(values["follow_redirects"], FieldValue::Bool(true));
    assert_eq!(values["allowed_paths"], FieldValue::List(vec![String::new()]));
    assert_eq!(values["source"], FieldValue::Text("web".into()));
}

#[test]
fn starter_list_normalizes_once() {
    let mut list = StarterMessageList::new(vec![StarterMessage::new("Hi", "Say hi", "Hello there")]);
    assert!(list.initialize());
    assert_eq!(list.len(), 4);
    assert_eq!(list.messages()[0].name, "Hi");
    list.replace(Vec::new());
    assert!(!list.initialize());
    assert!(list.is_empty());
}
