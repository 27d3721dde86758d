//! Headless testing helpers: Pilot, snapshot outlines.
//!
//! Use the [`Pilot`] to drive a mounted [`App`](crate::app::App) frame by
//! frame. Use [`render_to_string`] and related helpers to capture a surface
//! subtree as plain text for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{body_to_string, render_to_string, render_with_styles};
