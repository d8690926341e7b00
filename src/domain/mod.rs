//! Pure domain types with minimal dependencies
//!
//! This module contains core types used throughout the crate. Types here
//! carry no component logic, so every component can depend on them without
//! cycles.

pub mod annotation;
pub mod geometry;
pub mod tag;
pub mod target;

pub use annotation::*;
pub use geometry::*;
pub use tag::*;
pub use target::*;
