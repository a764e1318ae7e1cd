//! Append-only conversation history.

use super::message::{Message, ToolCall};

/// Ordered history of the conversation, resent in full on every query.
///
/// Entries can only be appended. There is no API to edit or remove one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    ///
    /// System messages are rejected: the instruction is injected per request instead.
    pub fn push(&mut self, message: Message) {
        if matches!(message, Message::System { .. }) {
            tracing::warn!("ignoring attempt to persist a system message in the transcript");
            return;
        }
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Tool calls of the most recent assistant message that have no result yet.
    pub fn pending_tool_calls(&self) -> Vec<&ToolCall> {
        let Some(idx) = self
            .messages
            .iter()
            .rposition(|m| matches!(m, Message::Assistant { .. }))
        else {
            return Vec::new();
        };

        let answered: Vec<&str> = self.messages[idx + 1..]
            .iter()
            .filter_map(|m| match m {
                Message::ToolResult(result) => Some(result.call_id.as_str()),
                _ => None,
            })
            .collect();

        self.messages[idx]
            .tool_calls()
            .iter()
            .filter(|call| !answered.contains(&call.id.as_str()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
