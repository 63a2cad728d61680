//! Starter messages shown to end users of a configured assistant.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of starter messages an assistant exposes.
pub const STARTER_MESSAGE_COUNT: usize = 4;

/// A named example initial message.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct StarterMessage {
    /// Title of the starter, for example "Write an email".
    #[serde(default)]
    pub name: String,
    /// What the user might use this starter for.
    #[serde(default)]
    pub description: String,
    /// Message sent as the initial user message.
    #[serde(default)]
    pub message: String,
}

impl StarterMessage {
    pub fn new(name: impl Into<String>, description: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            message: message.into(),
        }
    }

    /// Returns true when every part is blank.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && self.description.trim().is_empty() && self.message.trim().is_empty()
    }
}
