//! Annotation rendering module
//!
//! This module contains:
//! - Dimension-line geometry shared by the renderer
//! - The annotation-event renderer and its hover state

pub mod events;
pub mod geometry;

pub use events::{HoverState, LayerFlags, render_events};
