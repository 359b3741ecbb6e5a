#![allow(dead_code)]

use hexe_chat::{Event, EventKind};

pub const T0: f64 = 1_700_000_000.0;

pub fn user(id: &str, content: &str) -> Event {
    Event::new(
        id,
        T0,
        EventKind::User {
            content: content.to_string(),
        },
    )
}

pub fn assistant(id: &str, content: &str) -> Event {
    Event::new(
        id,
        T0,
        EventKind::Assistant {
            source: None,
            content: content.to_string(),
        },
    )
}

pub fn function_call(id: &str, name: &str, arguments: &str) -> Event {
    Event::new(
        id,
        T0,
        EventKind::FunctionCall {
            source: None,
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    )
}

pub fn function_output(source: &str, id: &str, content: &str) -> Event {
    Event::new(
        id,
        T0,
        EventKind::FunctionOutput {
            source: source.to_string(),
            name: None,
            content: content.to_string(),
        },
    )
}

pub fn status(id: &str, generating: bool) -> Event {
    Event::new(
        id,
        T0,
        EventKind::Status {
            source: None,
            generating,
        },
    )
}

pub fn error(id: &str, source: &str, content: &str) -> Event {
    Event::new(
        id,
        T0,
        EventKind::Error {
            source: Some(source.to_string()),
            content: content.to_string(),
        },
    )
}

pub fn at(mut event: Event, created_at: f64) -> Event {
    event.created_at = created_at;
    event
}

pub fn delta(event: Event) -> Event {
    event.with_delta(true)
}
