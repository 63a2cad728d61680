mod impersonate_component;
mod state;

pub use impersonate_component::ImpersonateComponent;
pub use state::{ImpersonateFocus, ImpersonateState};
