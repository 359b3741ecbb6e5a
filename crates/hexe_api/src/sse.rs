use hexe_chat::Event;

use crate::error::HexeApiError;
use crate::events::StreamItem;

const HEARTBEAT_EVENT: &str = "heartbeat";

/// Incremental parser for SSE byte streams.
///
/// Frames are only decoded once their terminating blank line has arrived, so
/// multi-byte characters split across chunks survive intact. Carriage returns
/// are dropped on input; JSON payloads cannot contain raw ones.
#[derive(Debug, Default)]
pub struct SseStreamParser {
    buffer: Vec<u8>,
}

impl SseStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete frames.
    ///
    /// A payload that does not decode into a known event yields an `Err` in its
    /// arrival position; callers are expected to stop there.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Result<StreamItem, HexeApiError>> {
        self.buffer
            .extend(bytes.iter().copied().filter(|byte| *byte != b'\r'));
        let mut items = Vec::new();

        while let Some(split) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..split + 2).collect();
            let frame = String::from_utf8_lossy(&frame[..split]);

            if let Some(item) = parse_frame(&frame) {
                items.push(item);
            }
        }

        items
    }

    /// Parse a complete SSE payload string in one shot.
    pub fn parse_frames(input: &str) -> Vec<Result<StreamItem, HexeApiError>> {
        let mut parser = Self::default();
        parser.feed(input.as_bytes())
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.iter().all(u8::is_ascii_whitespace)
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|window| window == b"\n\n")
}

fn parse_frame(frame: &str) -> Option<Result<StreamItem, HexeApiError>> {
    let mut data_lines = Vec::new();
    let mut event_name = None;
    let mut saw_comment = false;

    for line in frame.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event_name = Some(value.trim());
        } else if line.starts_with(':') {
            saw_comment = true;
        }
    }

    let payload = data_lines.join("\n");
    if payload.trim().is_empty() {
        let keep_alive = event_name == Some(HEARTBEAT_EVENT) || saw_comment;
        return keep_alive.then_some(Ok(StreamItem::Heartbeat));
    }

    Some(
        Event::from_json(&payload)
            .map(StreamItem::Event)
            .map_err(HexeApiError::from),
    )
}
