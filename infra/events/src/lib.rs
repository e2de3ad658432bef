//! # In-process event bus
//!
//! A type-safe, asynchronous broadcast bus connecting decoupled feature
//! slices.
//!
//! ## Shape
//!
//! Provides a centralized [`EventBus`] with fan-out semantics: every
//! subscriber of an event type observes every event published for that
//! type. Built on `tokio::sync::broadcast` with a `FxHashMap` +
//! `parking_lot::RwLock` registry keyed by [`std::any::TypeId`].
//!
//! # Example
//!
//! ```rust
//! use slms_event_bus::{EventBus, EventBusError};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct UserRegistered { id: i64 }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!
//!     let mut rx = bus.subscribe::<UserRegistered>()?;
//!     bus.publish(UserRegistered { id: 42 })?;
//!
//!     if let Ok(event) = rx.recv().await {
//!         assert_eq!(event.id, 42);
//!     }
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventRecv;
