//! Message types for an overlay session
//!
//! This module contains:
//! - Msg enum with nested sub-enums for the host-facing entry points
//! - SyncMessage carried between the two camera-side instances
//! - HostRequest sent upward from an instance to the host

use serde::{Deserialize, Serialize};

use crate::domain::{AnnotationEvent, EventId, Point, TargetRole};
use crate::epipolar::LineEq;

// ============================================================================
// Cross-instance synchronization
// ============================================================================

/// Target-point synchronization message between sibling instances
///
/// Carries the owning role and the new position, or `None` when the role was
/// cleared. Delivery must preserve emission order; the crate uses one FIFO
/// channel per instance pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncMessage {
    pub role: TargetRole,
    pub position: Option<Point>,
}

impl SyncMessage {
    pub fn new(role: TargetRole, position: Option<Point>) -> Self {
        Self { role, position }
    }
}

// ============================================================================
// Requests sent up to the host
// ============================================================================

/// Actions an instance asks the host to perform
#[derive(Clone, Debug, PartialEq)]
pub enum HostRequest {
    /// Create a measurement from both target points
    AddMeasurement,
    /// Create a 3D point from one paired target
    AddThreeDPoint(TargetRole),
    /// Create a single-camera point from one target
    AddSinglePoint(TargetRole),
    /// Open the species editor for an annotation event
    EditSpecies(EventId),
    /// Open the dimension editor for a measurement (no host handling yet)
    EditDimension(EventId),
    /// Delete an annotation event
    DeleteAnnotation(EventId),
}

/// A context-menu entry chosen by the user
///
/// The host builds its menu from [`MenuEnablement`] and reports the chosen
/// entry back; the session re-checks enablement before emitting the matching
/// [`HostRequest`], so a stale menu cannot produce an impossible request.
///
/// [`MenuEnablement`]: crate::targets::MenuEnablement
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    AddMeasurement,
    AddThreeDPoint(TargetRole),
    AddSinglePoint(TargetRole),
    DeleteAnnotation(EventId),
}

// ============================================================================
// Pointer and keyboard input
// ============================================================================

/// Pointer button identity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Pointer events translated by the host adapter; positions are in display
/// space
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerMsg {
    Moved(Point),
    Pressed(Point, PointerButton),
    Released(Point, PointerButton),
    /// Pointer left the canvas
    Left,
}

/// Directional nudge of the selected target, one source pixel per message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NudgeDirection {
    Left,
    Right,
    Up,
    Down,
}

impl NudgeDirection {
    /// Offset in source pixels
    pub fn delta(self) -> (i32, i32) {
        match self {
            NudgeDirection::Left => (-1, 0),
            NudgeDirection::Right => (1, 0),
            NudgeDirection::Up => (0, -1),
            NudgeDirection::Down => (0, 1),
        }
    }
}

// ============================================================================
// Layer visibility
// ============================================================================

/// Overlay layer toggles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerMsg {
    /// Show or hide event shapes
    Events(bool),
    /// Show or hide species / measurement detail text
    EventDetails(bool),
    /// Show or hide epipolar geometry
    Epipolar(bool),
}

// ============================================================================
// The host-facing message surface
// ============================================================================

/// Everything the host adapter can feed into an overlay session
#[derive(Clone, Debug, PartialEq)]
pub enum Msg {
    /// The canvas was resized
    SetViewport { width: u32, height: u32 },
    /// A frame with these source dimensions is now displayed
    NewFrame { width: u32, height: u32 },
    /// Change the magnifier zoom factor
    SetZoom(f64),
    /// Programmatic placement of both targets (source space)
    SetTargets {
        a: Option<Point>,
        b: Option<Point>,
    },
    /// Replace the annotation event list
    SetEvents(Vec<AnnotationEvent>),
    /// Install, replace or remove an epipolar guide for a role; a negative
    /// channel width removes the guide
    SetEpipolarLine {
        owner: TargetRole,
        line: LineEq,
        channel_width: f64,
    },
    /// Clear targets, epipolar guides and hover state
    ResetAll,
    /// Delete one target
    DeleteTarget(TargetRole),
    /// Pointer input
    Pointer(PointerMsg),
    /// Keyboard nudge of the selected target
    Nudge(NudgeDirection),
    /// Layer visibility change
    Layer(LayerMsg),
    /// A context-menu entry was chosen
    Menu(MenuAction),
    /// Explicitly close the magnifier window
    CloseMagnifier,
    /// Host window activation change; deactivation hides the magnifier
    WindowActive(bool),
}

impl Msg {
    pub fn pointer_moved(x: f64, y: f64) -> Self {
        Msg::Pointer(PointerMsg::Moved(Point::new(x, y)))
    }

    pub fn pointer_pressed(x: f64, y: f64, button: PointerButton) -> Self {
        Msg::Pointer(PointerMsg::Pressed(Point::new(x, y), button))
    }

    pub fn pointer_released(x: f64, y: f64, button: PointerButton) -> Self {
        Msg::Pointer(PointerMsg::Released(Point::new(x, y), button))
    }
}
