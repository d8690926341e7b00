//! Seamark — overlay geometry and coordinate transforms for stereo video
//! annotation
//!
//! Each camera side runs one [`session::OverlaySession`] that owns the
//! coordinate frame, target points, magnify window, and event rendering for
//! that side. Sessions exchange target positions over a channel so the two
//! sides stay in step, and surface host work (opening dialogs, deleting
//! annotations) as [`session::HostRequest`] values.
//!
//! Drawing is expressed as tagged [`surface::DrawCommand`]s against a
//! [`surface::DrawSurface`], so the host toolkit decides how shapes reach
//! the screen while this crate decides what to draw and where.

pub mod config;
pub mod coords;
pub mod domain;
pub mod epipolar;
pub mod error;
pub mod frame;
pub mod magnifier;
pub mod render;
pub mod session;
pub mod surface;
pub mod targets;

pub use config::{OverlayConfig, OverlayPalette, ShapeColor};
pub use coords::CoordinateFrame;
pub use domain::{AnnotationEvent, CameraSide, EventId, Point, Rect, TargetRole};
pub use epipolar::{EpipolarSpec, LineEq};
pub use error::OverlayError;
pub use frame::FrameSource;
pub use magnifier::MagnifierController;
pub use session::{HostRequest, Msg, OverlaySession, SyncMessage};
pub use surface::{DrawCommand, DrawSurface, RecordingSurface};
pub use targets::TargetPointModel;
