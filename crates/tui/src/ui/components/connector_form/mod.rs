mod connector_form_component;
mod state;

pub use connector_form_component::ConnectorFormComponent;
pub use state::{ConnectorFormState, FocusTarget, FormStatus};
