use pmos_core::RealtimeEvent;
use tokio::sync::broadcast;

/// Default capacity of the realtime broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Fan an event out to realtime subscribers. Having none is not an error.
pub(crate) fn publish(tx: &broadcast::Sender<RealtimeEvent>, event: RealtimeEvent) {
    let name = event.name();
    match tx.send(event) {
        Ok(receivers) => tracing::debug!(event = name, receivers, "published realtime event"),
        Err(_) => tracing::trace!(event = name, "no realtime subscribers"),
    }
}
