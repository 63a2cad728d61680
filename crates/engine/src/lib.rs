//! # Conform form engine
//!
//! Headless model behind the admin console's connector and assistant forms.
//! Rendering front ends (the terminal UI, or any other) drive it through a
//! small set of entry points:
//!
//! - [`form::FormState`] derives initial values and a validation ruleset
//!   from field schemas and is the single writer to the caller's store.
//! - [`form::controls`] maps each visible schema to exactly one control and
//!   turns control interactions into full-value updates.
//! - [`form::is_form_submittable`] is the submission gate.
//! - [`access::GroupAccess`] owns the public flag and selected groups.
//! - [`starters`] normalizes an assistant's starter messages once.
//! - [`session`] carries the signed-in user explicitly and decides route
//!   access for the impersonation screen.

pub mod access;
pub mod error;
pub mod form;
pub mod session;
pub mod starters;

pub use access::{GroupAccess, Viewer, Visibility};
pub use error::FormError;
pub use form::{
    ConnectorForm, ConnectorFormOptions, ConnectorSubmission, DetachedSink, FieldControl, FieldEdit, FieldRow, FormState,
    FormStatusListener, SharedValues, ValidationRuleset, ValueSink, is_form_submittable,
};
pub use session::{DEFAULT_ROUTE, LOGIN_ROUTE, RouteDecision, SessionState, impersonation_access};
pub use starters::{StarterMessageList, StarterPart, normalize_starter_messages, starter_generation_prompt};
