//! Event-to-message reconciliation.
//!
//! [`ChatState::apply`] is the only way the conversation changes. Each call folds
//! exactly one event into the state, in arrival order:
//!
//! - `status` sets the process-wide `generating` flag and nothing else. Its id is
//!   never upserted into the message list.
//! - `function_output` and `error` resolve their target through `source` and never
//!   create a message under their own id.
//! - `user`, `assistant` and `function_call` create a message on first sight of an
//!   id (delta or not), merge deltas in place, and replace wholesale otherwise.
//!
//! References that cannot be resolved are dropped without buffering.

use crate::core::event::{Event, EventKind};
use crate::core::message::{seconds_to_millis, FunctionOutput, Message, MessageBody};

/// Authoritative in-memory conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    messages: Vec<Message>,
    generating: bool,
}

/// Which rule an applied event triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    StatusChanged { generating: bool },
    Created { index: usize },
    Replaced { index: usize },
    Merged { index: usize },
    OutputCreated { index: usize, output: usize },
    OutputExtended { index: usize, output: usize },
    OutputReplaced { index: usize, output: usize },
    ErrorAttached { index: usize },
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// No message carries the event's `source` id.
    UnknownSource,
    /// `function_output` whose source is not a function call.
    SourceNotFunctionCall,
    /// Delta payload that cannot merge into the existing message's variant.
    KindMismatch,
}

impl ApplyOutcome {
    /// Index of the message this outcome touched, if any.
    pub fn message_index(&self) -> Option<usize> {
        match *self {
            Self::Created { index }
            | Self::Replaced { index }
            | Self::Merged { index }
            | Self::OutputCreated { index, .. }
            | Self::OutputExtended { index, .. }
            | Self::OutputReplaced { index, .. }
            | Self::ErrorAttached { index } => Some(index),
            Self::StatusChanged { .. } | Self::Ignored(_) => None,
        }
    }

    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored(_))
    }
}

impl ChatState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn generating(&self) -> bool {
        self.generating
    }

    /// Last message with `id`; the defined tie-break if duplicates ever exist.
    pub fn find(&self, id: &str) -> Option<&Message> {
        self.last_index_of(id).map(|index| &self.messages[index])
    }

    pub fn apply(&mut self, event: &Event) -> ApplyOutcome {
        match &event.kind {
            EventKind::Status { generating, .. } => {
                self.generating = *generating;
                ApplyOutcome::StatusChanged {
                    generating: *generating,
                }
            }
            EventKind::FunctionOutput {
                source, content, ..
            } => self.apply_function_output(source, &event.id, content, event.delta),
            EventKind::Error { source, content } => self.attach_error(source.as_deref(), content),
            EventKind::User { .. } | EventKind::Assistant { .. } | EventKind::FunctionCall { .. } => {
                self.upsert(event)
            }
        }
    }

    fn upsert(&mut self, event: &Event) -> ApplyOutcome {
        let existing = self.last_index_of(&event.id);

        if let Some(index) = existing.filter(|_| event.delta) {
            return if merge_delta(&mut self.messages[index].body, &event.kind) {
                ApplyOutcome::Merged { index }
            } else {
                ApplyOutcome::Ignored(IgnoreReason::KindMismatch)
            };
        }

        let Some(message) = fresh_message(event) else {
            return ApplyOutcome::Ignored(IgnoreReason::KindMismatch);
        };
        match existing {
            Some(index) => {
                self.messages[index] = message;
                ApplyOutcome::Replaced { index }
            }
            None => {
                self.messages.push(message);
                ApplyOutcome::Created {
                    index: self.messages.len() - 1,
                }
            }
        }
    }

    fn apply_function_output(
        &mut self,
        source: &str,
        output_id: &str,
        content: &str,
        delta: bool,
    ) -> ApplyOutcome {
        let Some(index) = self.first_index_of(source) else {
            return ApplyOutcome::Ignored(IgnoreReason::UnknownSource);
        };
        let MessageBody::FunctionCall { outputs, .. } = &mut self.messages[index].body else {
            return ApplyOutcome::Ignored(IgnoreReason::SourceNotFunctionCall);
        };

        match outputs.iter().position(|output| output.id == output_id) {
            Some(output) if delta => {
                outputs[output].content.push_str(content);
                ApplyOutcome::OutputExtended { index, output }
            }
            Some(output) => {
                outputs[output].content = content.to_string();
                ApplyOutcome::OutputReplaced { index, output }
            }
            None => {
                outputs.push(FunctionOutput {
                    id: output_id.to_string(),
                    content: content.to_string(),
                });
                ApplyOutcome::OutputCreated {
                    index,
                    output: outputs.len() - 1,
                }
            }
        }
    }

    fn attach_error(&mut self, source: Option<&str>, content: &str) -> ApplyOutcome {
        let Some(index) = source.and_then(|source| self.first_index_of(source)) else {
            return ApplyOutcome::Ignored(IgnoreReason::UnknownSource);
        };
        self.messages[index].errors.push(content.to_string());
        ApplyOutcome::ErrorAttached { index }
    }

    fn last_index_of(&self, id: &str) -> Option<usize> {
        self.messages.iter().rposition(|message| message.id == id)
    }

    fn first_index_of(&self, id: &str) -> Option<usize> {
        self.messages.iter().position(|message| message.id == id)
    }
}

/// Build a message from scratch: empty `errors`, and empty `outputs` for calls.
/// Only `user`, `assistant` and `function_call` events describe a message.
fn fresh_message(event: &Event) -> Option<Message> {
    let body = match &event.kind {
        EventKind::User { content } => MessageBody::User {
            content: content.clone(),
        },
        EventKind::Assistant { content, .. } => MessageBody::Assistant {
            content: content.clone(),
        },
        EventKind::FunctionCall {
            name, arguments, ..
        } => MessageBody::FunctionCall {
            name: name.clone(),
            arguments: arguments.clone(),
            outputs: Vec::new(),
        },
        EventKind::FunctionOutput { .. } | EventKind::Status { .. } | EventKind::Error { .. } => {
            return None;
        }
    };
    Some(Message::new(
        event.id.clone(),
        seconds_to_millis(event.created_at),
        body,
    ))
}

/// Text deltas append; argument deltas carry the full accumulated string and replace.
fn merge_delta(body: &mut MessageBody, kind: &EventKind) -> bool {
    match (body, kind) {
        (
            MessageBody::User { content } | MessageBody::Assistant { content },
            EventKind::User { content: fragment } | EventKind::Assistant { content: fragment, .. },
        ) => {
            content.push_str(fragment);
            true
        }
        (
            MessageBody::FunctionCall { arguments, .. },
            EventKind::FunctionCall {
                arguments: latest, ..
            },
        ) => {
            arguments.clone_from(latest);
            true
        }
        _ => false,
    }
}
