//! Assistant starter messages.
//!
//! An assistant exposes exactly [`STARTER_MESSAGE_COUNT`] starters. The
//! owning editor calls [`StarterMessageList::initialize`] once before its
//! first render to pad or truncate whatever list it was handed; the list is
//! not re-normalized when it later changes length.

use conform_types::{STARTER_MESSAGE_COUNT, StarterMessage};
use tracing::debug;

/// Pads with blank entries or drops trailing entries until the list holds
/// exactly [`STARTER_MESSAGE_COUNT`] messages. Returns whether it changed.
pub fn normalize_starter_messages(messages: &mut Vec<StarterMessage>) -> bool {
    let original = messages.len();
    if original == STARTER_MESSAGE_COUNT {
        return false;
    }
    messages.resize_with(STARTER_MESSAGE_COUNT, StarterMessage::default);
    debug!(original, target = STARTER_MESSAGE_COUNT, "normalized starter messages");
    true
}

/// Part of a starter message the editor exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterPart {
    Name,
    Description,
    Message,
}

impl StarterPart {
    pub const ALL: [StarterPart; 3] = [StarterPart::Name, StarterPart::Description, StarterPart::Message];

    pub fn label(self) -> &'static str {
        match self {
            StarterPart::Name => "Name",
            StarterPart::Description => "Description",
            StarterPart::Message => "Message",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            StarterPart::Name => "Shows up as the \"title\" for this Starter Message. For example, \"Write an email.\"",
            StarterPart::Description => "A description which tells the user what they might want to use this Starter Message for.",
            StarterPart::Message => "The actual message to be sent as the initial user message.",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            StarterPart::Name => "Enter a name...",
            StarterPart::Description => "Enter a description...",
            StarterPart::Message => "Enter the message...",
        }
    }

    /// Message text is multi-line; the other parts are single-line.
    pub fn is_multiline(self) -> bool {
        !matches!(self, StarterPart::Name)
    }

    pub fn get(self, message: &StarterMessage) -> &str {
        match self {
            StarterPart::Name => &message.name,
            StarterPart::Description => &message.description,
            StarterPart::Message => &message.message,
        }
    }

    fn get_mut(self, message: &mut StarterMessage) -> &mut String {
        match self {
            StarterPart::Name => &mut message.name,
            StarterPart::Description => &mut message.description,
            StarterPart::Message => &mut message.message,
        }
    }
}

/// Editor state for an assistant's starter messages.
#[derive(Debug, Clone, Default)]
pub struct StarterMessageList {
    messages: Vec<StarterMessage>,
    initialized: bool,
    refreshing: bool,
}

impl StarterMessageList {
    pub fn new(messages: Vec<StarterMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    /// Normalizes the list on the first call only.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;
        normalize_starter_messages(&mut self.messages)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn messages(&self) -> &[StarterMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<StarterMessage> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// While refreshing, the editor shows placeholders instead of inputs.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn set_refreshing(&mut self, refreshing: bool) {
        self.refreshing = refreshing;
    }

    /// Replaces one part of a message; out-of-range indexes are ignored.
    pub fn set_part(&mut self, index: usize, part: StarterPart, text: impl Into<String>) -> bool {
        match self.messages.get_mut(index) {
            Some(message) => {
                *part.get_mut(message) = text.into();
                true
            }
            None => false,
        }
    }

    /// Replaces the whole list, for example with generated starters. The list
    /// is not normalized again.
    pub fn replace(&mut self, messages: Vec<StarterMessage>) {
        self.messages = messages;
    }

    /// Blanks one message in place; the list keeps its length.
    pub fn clear(&mut self, index: usize) -> bool {
        match self.messages.get_mut(index) {
            Some(message) => {
                *message = StarterMessage::default();
                true
            }
            None => false,
        }
    }
}

const STARTER_GENERATION_PROMPT: &str = "
Create a starter message for a chatbot. The response should include three parts:

1. Name: A short, clear title for the prompt (e.g. 'Open Discussion', 'Project Planning')
2. Description: A short explanation of what this prompt is for without full sentences (no more than a line)
3. Message: The actual conversation starter that will be sent to the chatbot. This should be natural and engaging.

Make each part concise but inviting for user interaction.
Context about the assistant - Name: {name}
Description: {description}
";

/// Prompt used to ask a model for one starter message for an assistant.
pub fn starter_generation_prompt(name: &str, description: &str) -> String {
    STARTER_GENERATION_PROMPT
        .replace("{name}", name)
        .replace("{description}", description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(count: usize) -> Vec<StarterMessage> {
        (0..count)
            .map(|i| StarterMessage::new(format!("n{i}"), format!("d{i}"), format!("m{i}")))
            .collect()
    }

    #[test]
    fn normalizes_to_exactly_four_preserving_prefix() {
        for count in [0, 1, 4, 7] {
            let original = numbered(count);
            let mut messages = original.clone();
            let changed = normalize_starter_messages(&mut messages);
            assert_eq!(messages.len(), STARTER_MESSAGE_COUNT, "from {count}");
            assert_eq!(changed, count != STARTER_MESSAGE_COUNT);
            let kept = count.min(STARTER_MESSAGE_COUNT);
            assert_eq!(&messages[..kept], &original[..kept]);
            assert!(messages[kept..].iter().all(StarterMessage::is_blank));
        }
    }

    #[test]
    fn initialize_runs_once() {
        let mut list = StarterMessageList::new(numbered(1));
        assert!(list.initialize());
        assert_eq!(list.len(), 4);
        list.replace(numbered(5));
        assert!(!list.initialize());
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn clear_blanks_without_shrinking() {
        let mut list = StarterMessageList::new(numbered(4));
        list.initialize();
        assert!(list.clear(1));
        assert!(!list.clear(4));
        assert_eq!(list.len(), 4);
        assert!(list.messages()[1].is_blank());
        assert_eq!(list.messages()[2].name, "n2");
    }

    #[test]
    fn set_part_edits_in_place() {
        let mut list = StarterMessageList::new(Vec::new());
        list.initialize();
        assert!(list.set_part(2, StarterPart::Message, "Summarize this week"));
        assert_eq!(StarterPart::Message.get(&list.messages()[2]), "Summarize this week");
        assert!(!list.set_part(9, StarterPart::Name, "x"));
    }

    #[test]
    fn generation_prompt_substitutes_context() {
        let prompt = starter_generation_prompt("Support Bot", "Answers billing questions");
        assert!(prompt.contains("Name: Support Bot"));
        assert!(prompt.ends_with("Description: Answers billing questions\n"));
        assert!(!prompt.contains('{'));
        assert!(prompt.starts_with("\nCreate a starter message for a chatbot."));
    }
}
