use hexe_chat::Event;

use crate::client::CancellationSignal;
use crate::error::HexeApiError;
use crate::events::StreamEnd;

/// Where events come from and where user messages go.
///
/// Implementations are blocking; the stream worker owns a thread per source.
pub trait EventSource: Send + Sync {
    /// Follow one connection until it ends, delivering events in arrival order.
    fn stream(
        &self,
        cancel: &CancellationSignal,
        on_event: &mut dyn FnMut(Event),
    ) -> Result<StreamEnd, HexeApiError>;

    fn submit(&self, content: &str) -> Result<(), HexeApiError>;
}
