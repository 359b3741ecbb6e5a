use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write;
use std::sync::Arc;

use hexe_chat::{ChatObserver, ChatSnapshot, Message, MessageBody};
use time::format_description::well_known::Rfc3339;

/// Prints messages as plain text once the conversation goes idle.
///
/// While the server is generating nothing is printed; when the flag drops,
/// every message that is new or differs from what was last printed is
/// written out in list order.
pub struct TranscriptPrinter<W> {
    out: W,
    printed: HashMap<String, Message>,
    last_revision: u64,
}

impl<W: Write + Send> TranscriptPrinter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: HashMap::new(),
            last_revision: 0,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write pending messages from `snapshot`. Returns how many were printed.
    pub fn print(&mut self, snapshot: &ChatSnapshot) -> std::io::Result<usize> {
        if snapshot.generating || snapshot.revision <= self.last_revision {
            return Ok(0);
        }
        self.last_revision = snapshot.revision;

        let mut printed = 0usize;
        for message in snapshot.messages.iter() {
            if self.printed.get(&message.id) == Some(message) {
                continue;
            }
            self.out.write_all(render_message(message).as_bytes())?;
            self.printed.insert(message.id.clone(), message.clone());
            printed += 1;
        }
        if printed > 0 {
            self.out.flush()?;
        }
        Ok(printed)
    }
}

impl<W: Write + Send> ChatObserver for TranscriptPrinter<W> {
    fn on_change(&mut self, snapshot: &Arc<ChatSnapshot>) {
        if let Err(error) = self.print(snapshot) {
            tracing::warn!(%error, "failed to write transcript");
        }
    }
}

/// Render one message as a block of text terminated by a blank line.
pub fn render_message(message: &Message) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[{}] {}",
        message.role().as_str(),
        format_timestamp(message)
    );

    match &message.body {
        MessageBody::User { content } | MessageBody::Assistant { content } => {
            let _ = writeln!(out, "{content}");
        }
        MessageBody::FunctionCall {
            name,
            arguments,
            outputs,
        } => {
            let _ = writeln!(out, "{name}({arguments})");
            for (index, output) in outputs.iter().enumerate() {
                let _ = writeln!(out, "  output {}: {}", index + 1, output.content);
            }
        }
    }

    for error in &message.errors {
        let _ = writeln!(out, "  error: {error}");
    }
    out.push('\n');
    out
}

fn format_timestamp(message: &Message) -> String {
    message
        .created_at()
        .and_then(|at| at.format(&Rfc3339).ok())
        .unwrap_or_else(|| format!("{}ms", message.created_at_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexe_chat::FunctionOutput;

    #[test]
    fn function_call_lists_numbered_outputs_and_errors() {
        let mut message = Message::new(
            "f1",
            1_700_000_000_000,
            MessageBody::FunctionCall {
                name: "search".to_string(),
                arguments: "{\"q\":\"rust\"}".to_string(),
                outputs: vec![
                    FunctionOutput {
                        id: "o1".to_string(),
                        content: "first".to_string(),
                    },
                    FunctionOutput {
                        id: "o2".to_string(),
                        content: "second".to_string(),
                    },
                ],
            },
        );
        message.errors.push("timeout".to_string());

        assert_eq!(
            render_message(&message),
            concat!(
                "[function_call] 2023-11-14T22:13:20Z\n",
                "search({\"q\":\"rust\"})\n",
                "  output 1: first\n",
                "  output 2: second\n",
                "  error: timeout\n",
                "\n",
            )
        );
    }

    #[test]
    fn text_message_renders_role_time_and_content() {
        let message = Message::new(
            "u1",
            1_700_000_000_500,
            MessageBody::User {
                content: "hello".to_string(),
            },
        );

        assert_eq!(
            render_message(&message),
            "[user] 2023-11-14T22:13:20.5Z\nhello\n\n"
        );
    }
}
