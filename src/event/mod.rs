//! Event system: event types, listener registry, bubbling dispatch.

pub mod handler;
pub mod kind;
pub mod listener;

pub use handler::EventDispatcher;
pub use kind::{Event, EventType};
pub use listener::{Handler, ListenerId, ListenerRegistry};
