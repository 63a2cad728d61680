use conform_types::ImpersonateRequest;

use crate::ui::components::common::TextInputState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImpersonateFocus {
    #[default]
    Email,
    ApiKey,
    Button,
}

impl ImpersonateFocus {
    pub fn next(self) -> Self {
        match self {
            ImpersonateFocus::Email => ImpersonateFocus::ApiKey,
            ImpersonateFocus::ApiKey => ImpersonateFocus::Button,
            ImpersonateFocus::Button => ImpersonateFocus::Email,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ImpersonateFocus::Email => ImpersonateFocus::Button,
            ImpersonateFocus::ApiKey => ImpersonateFocus::Email,
            ImpersonateFocus::Button => ImpersonateFocus::ApiKey,
        }
    }
}

#[derive(Debug, Default)]
pub struct ImpersonateState {
    pub email: TextInputState,
    pub api_key: TextInputState,
    pub focus: ImpersonateFocus,
    /// A request is in flight.
    pub sending: bool,
}

impl ImpersonateState {
    /// Input under focus, if the focus is on an input.
    pub fn focused_input(&mut self) -> Option<&mut TextInputState> {
        match self.focus {
            ImpersonateFocus::Email => Some(&mut self.email),
            ImpersonateFocus::ApiKey => Some(&mut self.api_key),
            ImpersonateFocus::Button => None,
        }
    }

    /// Request body built from the inputs as typed.
    pub fn request(&self) -> ImpersonateRequest {
        ImpersonateRequest {
            email: self.email.input().to_string(),
            api_key: self.api_key.input().to_string(),
        }
    }
}
