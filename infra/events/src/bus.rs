use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Default broadcast buffer. 128 events of headroom comfortably covers the
/// publish bursts the feature slices produce.
const DEFAULT_CAPACITY: usize = 128;
const MIN_CAPACITY: usize = 1;

/// Marker for payloads the [`EventBus`] can carry.
///
/// Blanket-implemented for every `Send + Sync + 'static` type.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

#[derive(Debug)]
struct ChannelState {
    capacity: usize,
    sender: Box<dyn Any + Send + Sync>,
}

/// A thread-safe broadcast event bus.
///
/// Channels are indexed by the [`TypeId`] of the event type; every active
/// subscriber of a type sees every event published for that type.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, ChannelState>>>,
}

impl EventBus {
    /// An empty bus; channels appear lazily on first subscribe or publish.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to events of type `T` with the default buffer capacity.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry entry for `T`
    /// holds an unexpected sender type.
    ///
    /// # Examples
    /// ```rust
    /// use slms_event_bus::EventBus;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct CommentPosted(u64);
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), slms_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// let mut rx = bus.subscribe::<CommentPosted>()?;
    /// bus.publish(CommentPosted(1))?;
    /// assert_eq!(rx.recv().await.unwrap().0, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to events of type `T` with a specific buffer capacity.
    ///
    /// The capacity only takes effect when this call creates the channel;
    /// a mismatch against an existing channel is logged and the existing
    /// capacity wins.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] if `capacity` is zero.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        let sender = self.ensure_channel::<T>(capacity)?;
        Ok(sender.subscribe())
    }

    /// Publishes an event, returning the number of subscribers that saw it.
    ///
    /// Events published with no active subscribers are dropped silently.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry entry for `T`
    /// holds an unexpected sender type.
    ///
    /// # Examples
    /// ```rust
    /// use slms_event_bus::EventBus;
    ///
    /// #[derive(Clone, Debug, PartialEq)]
    /// struct Ping;
    ///
    /// # fn main() -> Result<(), slms_event_bus::EventBusError> {
    /// let bus = EventBus::new();
    /// bus.publish(Ping)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes a shared event instance without re-wrapping.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry entry for `T`
    /// holds an unexpected sender type.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.ensure_channel::<T>(DEFAULT_CAPACITY)?;

        sender.send(event).map_or_else(
            |_| {
                trace!(event = std::any::type_name::<T>(), "No subscribers, event discarded");
                Ok(0)
            },
            |count| {
                trace!(event = std::any::type_name::<T>(), count, "Event delivered");
                Ok(count)
            },
        )
    }

    /// Drops every channel so receivers observe end-of-stream.
    ///
    /// Reports how many channels were torn down.
    #[must_use]
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn ensure_channel<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        let id = TypeId::of::<T>();

        {
            let channels = self.channels.read();
            if let Some(existing) = channels.get(&id) {
                return downcast_sender::<T>(existing, capacity);
            }
        }

        let mut channels = self.channels.write();
        let entry = channels.entry(id).or_insert_with(|| {
            trace!(event = std::any::type_name::<T>(), capacity, "Opening event channel");
            let (tx, _) = broadcast::channel::<Arc<T>>(capacity);
            ChannelState { capacity, sender: Box::new(tx) }
        });
        downcast_sender::<T>(entry, capacity)
    }
}

fn downcast_sender<T: Event>(
    state: &ChannelState,
    requested_capacity: usize,
) -> Result<broadcast::Sender<Arc<T>>, EventBusError> {
    if state.capacity != requested_capacity {
        warn!(
            event = std::any::type_name::<T>(),
            existing_capacity = state.capacity,
            requested_capacity,
            "Channel exists with another capacity, keeping the original"
        );
    }
    let sender =
        state.sender.downcast_ref::<broadcast::Sender<Arc<T>>>().ok_or_else(|| {
            EventBusError::TypeMismatch {
                message: std::any::type_name::<T>().into(),
                context: Some("Registered sender has another event type".into()),
            }
        })?;
    Ok(sender.clone())
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity < MIN_CAPACITY {
        return Err(EventBusError::InvalidCapacity {
            message: format!("capacity must be >= {MIN_CAPACITY}").into(),
            context: None,
        });
    }
    Ok(capacity)
}
