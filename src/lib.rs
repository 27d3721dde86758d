//! # sapling
//!
//! A declarative widget framework: widgets build themselves into a retained
//! surface tree, look up ancestors through a [`BuildContext`], and rebuild
//! when inherited data or their own state changes.
//!
//! ## Core Systems
//!
//! - **[`dom`]**: slotmap-backed surface arena with tree operations, queries and event listeners
//! - **[`binding`]**: one lazily realized node per widget, with props and build-scoped listeners
//! - **[`schedule`]**: virtual frame clock, frame/idle/timeout callbacks, transform transitions
//! - **[`widget`]**: Widget trait, BuildContext, inherited widgets, stateful widgets
//! - **[`widgets`]**: Theme, MediaQuery, Navigator, PromiseBuilder, ScaffoldMessenger and leaf widgets
//! - **[`event`]**: event kinds, listener registry, bubbling dispatch
//! - **[`app`]**: root composition and the tokio-driven run loop
//! - **[`cookies`]**: cookie jar for deep-link bootstrap values
//! - **[`memory`]**: per-thread key/value store for session values
//! - **[`testing`]**: headless Pilot and outline snapshots
//! - **[`geometry`]** and **[`color`]**: value types for metrics, transforms and theme tokens

// Foundation
pub mod color;
pub mod error;
pub mod geometry;

// Surface
pub mod binding;
pub mod dom;
pub mod event;
pub mod schedule;

// Widget system
pub mod widget;
pub mod widgets;

// Application
pub mod app;
pub mod cookies;
pub mod memory;
pub mod testing;

pub use app::{App, AppConfig};
pub use binding::{Element, Props};
pub use color::Color;
pub use cookies::CookieJar;
pub use dom::{Document, NodeId, Style};
pub use error::{Error, Result};
pub use memory::Memory;
pub use event::{Event, EventType};
pub use schedule::{spawn_local, CancelToken, Curve};
pub use widget::{
    BuildContext, Child, InheritedWidget, State, StateHandle, StatefulWidget, Widget, WidgetExt,
    WidgetRef,
};
