use hexe_chat::Event;

/// One decoded SSE frame.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamItem {
    /// A conversation event, in arrival order.
    Event(Event),
    /// Keep-alive frame with no payload (`event: heartbeat` or a comment line).
    Heartbeat,
}

/// Counters reported when the server closes the stream cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamEnd {
    pub events: usize,
    pub heartbeats: usize,
}

impl StreamEnd {
    pub(crate) fn record(&mut self, item: &StreamItem) {
        match item {
            StreamItem::Event(_) => self.events += 1,
            StreamItem::Heartbeat => self.heartbeats += 1,
        }
    }
}
