//! Error taxonomy for the overlay core
//!
//! Geometry and rendering failures are recoverable: callers skip the draw,
//! log, and continue. `NotReady` in particular is routine during startup,
//! before the first frame and viewport sizes have both been seen.

use thiserror::Error;

/// Errors surfaced by overlay components
#[derive(Debug, Error, PartialEq)]
pub enum OverlayError {
    /// A conversion or draw was requested before the coordinate frame saw
    /// both a viewport size and a frame size.
    #[error("coordinate frame not ready: viewport or frame size not yet established")]
    NotReady,

    /// A line with `a == 0 && b == 0` does not define a direction.
    #[error("degenerate line: a and b are both zero")]
    GeometryDegenerate,

    /// The configured magnifier does not fit the canvas even after stepping
    /// the size down.
    #[error("magnifier {requested_w}x{requested_h} exceeds canvas {canvas_w}x{canvas_h} after shrink attempts")]
    OversizedMagnifier {
        requested_w: i32,
        requested_h: i32,
        canvas_w: i32,
        canvas_h: i32,
    },

    /// A sibling-reported target position fell outside plausible source
    /// bounds; the message is ignored.
    #[error("sibling position ({x}, {y}) outside source bounds {width}x{height}")]
    SyncOutOfRange {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },
}
