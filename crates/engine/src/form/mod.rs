//! Schema-driven forms.

pub mod connector;
pub mod controls;
pub mod gate;
pub mod ruleset;
pub mod synchronizer;

pub use connector::{ConnectorForm, ConnectorFormOptions, ConnectorSubmission, validate_configuration};
pub use controls::{FieldControl, FieldEdit, FieldRow, SELECT_SENTINEL_LABEL, SelectChoice, apply_edit, control_for, field_rows};
pub use gate::{FormStatusListener, is_form_submittable};
pub use ruleset::{FieldErrors, FieldRule, ValidationRuleset, ValueShape};
pub use synchronizer::{DetachedSink, FormState, SharedValues, ValueSink, connector_initial_values, initial_values};
