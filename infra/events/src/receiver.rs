use crate::bus::Event;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Lag-tolerant receive for event subscribers.
///
/// The broadcast buffer keeps a bounded history; a subscriber that falls
/// behind is moved forward to the oldest retained message. Receive loops
/// built on [`EventRecv::recv_event`] therefore survive bursts instead of
/// erroring out, at the cost of the skipped messages.
pub trait EventRecv<T> {
    /// Next event, or `None` once the channel has closed.
    fn recv_event(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;
}

impl<T: Event> EventRecv<T> for broadcast::Receiver<Arc<T>> {
    async fn recv_event(&mut self) -> Option<Arc<T>> {
        loop {
            match self.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        event = std::any::type_name::<T>(),
                        skipped, "Subscriber lagged behind the event buffer"
                    );
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
