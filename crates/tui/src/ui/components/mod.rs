//! UI components: connector form, starter editor, impersonation page.

pub mod common;
pub mod component;
pub mod connector_form;
pub mod impersonate;
pub mod starters;

pub use component::*;
pub use connector_form::ConnectorFormComponent;
pub use impersonate::ImpersonateComponent;
pub use starters::StartersComponent;

use anyhow::{Context, Result};

use crate::app::Screen;

/// Builds the component for the screen the TUI opens on.
pub fn for_screen(screen: Screen) -> Result<Box<dyn Component>> {
    let component: Box<dyn Component> = match screen {
        Screen::ConnectorForm { config, options } => {
            Box::new(ConnectorFormComponent::new(config, options).context("building connector form")?)
        }
        Screen::Starters { path, messages } => Box::new(StartersComponent::new(path, messages)),
        Screen::Impersonate => Box::new(ImpersonateComponent::default()),
    };
    Ok(component)
}
