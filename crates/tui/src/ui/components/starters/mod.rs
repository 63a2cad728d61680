mod starters_component;
mod state;

pub use starters_component::StartersComponent;
pub use state::StartersState;
