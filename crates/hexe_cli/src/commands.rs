use crate::runtime::StreamRuntime;

pub const HELP_TEXT: &str = "\
Commands:
  /help    show this help
  /status  show message count and whether a reply is being generated
  /quit    exit
Any other line is sent as a message.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Status,
    Quit,
    Unknown(String),
}

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/status" => SlashCommand::Status,
        "/quit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}

/// Result of one line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Nothing to do (blank line).
    Ignored,
    /// Text to show the user.
    Reply(String),
    /// The message was handed to the server.
    Submitted,
    Quit,
}

pub fn handle_input(input: &str, runtime: &StreamRuntime) -> InputOutcome {
    if input.trim().is_empty() {
        return InputOutcome::Ignored;
    }

    match parse_slash_command(input) {
        Some(SlashCommand::Help) => InputOutcome::Reply(HELP_TEXT.to_string()),
        Some(SlashCommand::Status) => InputOutcome::Reply(status_line(runtime)),
        Some(SlashCommand::Quit) => InputOutcome::Quit,
        Some(SlashCommand::Unknown(command)) => {
            InputOutcome::Reply(format!("Unknown command {command}. Try /help."))
        }
        None => submit(input, runtime),
    }
}

fn submit(content: &str, runtime: &StreamRuntime) -> InputOutcome {
    if runtime.snapshot().generating {
        return InputOutcome::Reply(
            "A reply is still being generated; wait for it to finish.".to_string(),
        );
    }

    match runtime.submit(content) {
        Ok(()) => InputOutcome::Submitted,
        Err(error) => {
            tracing::warn!(%error, "message submission failed");
            InputOutcome::Reply(format!("Send failed: {error}"))
        }
    }
}

fn status_line(runtime: &StreamRuntime) -> String {
    let snapshot = runtime.snapshot();
    format!(
        "{} message(s), {}, connection #{}",
        snapshot.messages.len(),
        if snapshot.generating {
            "generating"
        } else {
            "idle"
        },
        runtime.connection_count()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_and_unknown_commands() {
        assert_eq!(parse_slash_command("/help"), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("  /status now"), Some(SlashCommand::Status));
        assert_eq!(parse_slash_command("/quit"), Some(SlashCommand::Quit));
        assert_eq!(
            parse_slash_command("/clear"),
            Some(SlashCommand::Unknown("/clear".to_string()))
        );
        assert_eq!(parse_slash_command("hello /quit"), None);
    }
}
