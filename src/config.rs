//! Overlay configuration
//!
//! Sizes, colors and timings for the overlay components. Persistence is the
//! host's business; everything here is plain serde data with sensible
//! defaults.

use serde::{Deserialize, Serialize};

/// Serializable RGBA color attached to draw commands
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ShapeColor {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }
}

impl Default for ShapeColor {
    fn default() -> Self {
        // Default red matching the target-A marker
        Self::rgb(0.9, 0.1, 0.1)
    }
}

/// Colors used by the overlay, one per shape meaning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayPalette {
    /// Target marker for role A
    pub target_a: ShapeColor,
    /// Target marker for role B
    pub target_b: ShapeColor,
    /// Selected / highlighted shapes
    pub highlight: ShapeColor,
    /// Epipolar guide line
    pub epipolar: ShapeColor,
    /// Low-opacity tint of the disallowed region outside the corridor
    pub corridor_shade: ShapeColor,
    /// Event points and dimension lines
    pub event: ShapeColor,
    /// Text labels
    pub text: ShapeColor,
    /// Magnifier border while following the pointer
    pub magnifier_border: ShapeColor,
    /// Magnifier border while locked
    pub magnifier_locked: ShapeColor,
}

impl Default for OverlayPalette {
    fn default() -> Self {
        Self {
            target_a: ShapeColor::rgb(0.9, 0.1, 0.1),
            target_b: ShapeColor::rgb(0.1, 0.4, 0.9),
            highlight: ShapeColor::rgb(1.0, 0.85, 0.1),
            epipolar: ShapeColor::rgb(0.1, 0.8, 0.3),
            corridor_shade: ShapeColor::rgba(0.1, 0.1, 0.1, 0.25),
            event: ShapeColor::rgb(0.95, 0.95, 0.2),
            text: ShapeColor::rgb(1.0, 1.0, 1.0),
            magnifier_border: ShapeColor::rgb(0.6, 0.6, 0.6),
            magnifier_locked: ShapeColor::rgb(0.9, 0.5, 0.1),
        }
    }
}

/// Tunables for the overlay core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Magnifier edge lengths in display pixels, largest first; the
    /// controller steps down this list when the canvas is too small
    pub magnifier_sizes: Vec<i32>,
    /// Display-pixels-per-source-pixel inside the magnifier
    pub magnifier_zoom: f64,
    /// Target icon radius in display pixels (constant on screen regardless
    /// of the source/display scale)
    pub icon_radius: f64,
    /// Pointer travel in display pixels before a press becomes a drag
    pub drag_threshold: f64,
    /// Two clicks within this window count as a double-click
    pub double_click_ms: u64,
    /// Auto-hide timer period
    pub idle_tick_ms: u64,
    /// Idle time after which an unattended magnifier is hidden
    pub idle_hide_ms: u64,
    pub palette: OverlayPalette,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            magnifier_sizes: vec![384, 256, 192],
            magnifier_zoom: 3.0,
            icon_radius: 6.0,
            drag_threshold: 3.0,
            double_click_ms: 500,
            idle_tick_ms: 500,
            idle_hide_ms: 2000,
            palette: OverlayPalette::default(),
        }
    }
}
