//! Coordinate frame: source-image, display and magnifier pixel spaces
//!
//! Scale factors are recomputed whenever the viewport is resized or a frame
//! with new dimensions arrives. Until both sizes have been seen every
//! conversion fails with [`OverlayError::NotReady`]; there is no sentinel
//! value that could leak into arithmetic.

use crate::domain::Point;
use crate::error::OverlayError;

/// Scale relationships between the three coordinate spaces
///
/// All conversions are affine scalings; no rotation is modeled. Writers are
/// limited to the resize / new-frame / zoom handlers; every other component
/// only reads.
#[derive(Clone, Debug)]
pub struct CoordinateFrame {
    display: Option<(u32, u32)>,
    source: Option<(u32, u32)>,
    /// Display pixels per source pixel, present once both sizes are known
    scale: Option<(f64, f64)>,
    /// Display pixels per source pixel inside the magnifier
    zoom: f64,
}

impl CoordinateFrame {
    pub fn new(zoom: f64) -> Self {
        Self {
            display: None,
            source: None,
            scale: None,
            zoom: zoom.max(1.0),
        }
    }

    /// Handle a viewport resize
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.display = Some((width, height));
        self.recompute();
    }

    /// Handle arrival of a frame with (possibly new) source dimensions
    pub fn new_frame(&mut self, width: u32, height: u32) {
        self.source = Some((width, height));
        self.recompute();
    }

    /// Set the magnifier zoom factor, clamped to at least 1
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.max(1.0);
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Whether scale factors are established
    pub fn is_ready(&self) -> bool {
        self.scale.is_some()
    }

    /// Source dimensions of the current frame, if one has been seen
    pub fn source_size(&self) -> Option<(u32, u32)> {
        self.source
    }

    /// Display dimensions of the canvas, if known
    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.display
    }

    fn recompute(&mut self) {
        self.scale = match (self.display, self.source) {
            (Some((dw, dh)), Some((sw, sh))) if sw > 0 && sh > 0 => {
                Some((dw as f64 / sw as f64, dh as f64 / sh as f64))
            }
            _ => None,
        };
    }

    fn scale(&self) -> Result<(f64, f64), OverlayError> {
        self.scale.ok_or(OverlayError::NotReady)
    }

    /// Source-image point to on-screen display point
    pub fn to_display(&self, p: Point) -> Result<Point, OverlayError> {
        let (sx, sy) = self.scale()?;
        Ok(Point::new(p.x * sx, p.y * sy))
    }

    /// On-screen display point to source-image point
    pub fn to_source(&self, p: Point) -> Result<Point, OverlayError> {
        let (sx, sy) = self.scale()?;
        Ok(Point::new(p.x / sx, p.y / sy))
    }

    /// Source-image point to magnifier-window point, given the source-space
    /// origin of the magnified region
    pub fn to_magnifier(&self, p: Point, origin: Point) -> Result<Point, OverlayError> {
        if !self.is_ready() {
            return Err(OverlayError::NotReady);
        }
        Ok(Point::new(
            (p.x - origin.x) * self.zoom,
            (p.y - origin.y) * self.zoom,
        ))
    }

    /// Magnifier-window point back to source-image space
    pub fn from_magnifier(&self, p: Point, origin: Point) -> Result<Point, OverlayError> {
        if !self.is_ready() {
            return Err(OverlayError::NotReady);
        }
        Ok(Point::new(
            p.x / self.zoom + origin.x,
            p.y / self.zoom + origin.y,
        ))
    }

    /// Source-space radius for a marker that should appear `display_radius`
    /// pixels wide on screen, whatever the current scale
    pub fn icon_radius_source(&self, display_radius: f64) -> Result<f64, OverlayError> {
        let (sx, _) = self.scale()?;
        Ok(display_radius / sx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn conversions_fail_until_both_sizes_seen() {
        let mut frame = CoordinateFrame::new(3.0);
        assert_eq!(
            frame.to_display(Point::new(1.0, 1.0)),
            Err(OverlayError::NotReady)
        );
        frame.set_viewport(800, 600);
        assert_eq!(
            frame.to_source(Point::new(1.0, 1.0)),
            Err(OverlayError::NotReady)
        );
        frame.new_frame(1920, 1080);
        assert!(frame.is_ready());
        assert!(frame.to_display(Point::new(1.0, 1.0)).is_ok());
    }

    #[test]
    fn display_round_trip() {
        let mut frame = CoordinateFrame::new(2.0);
        frame.set_viewport(800, 600);
        frame.new_frame(1920, 1080);
        let p = Point::new(123.4, 567.8);
        let back = frame.to_source(frame.to_display(p).unwrap()).unwrap();
        assert_relative_eq!(back.x, p.x, max_relative = 1e-12);
        assert_relative_eq!(back.y, p.y, max_relative = 1e-12);
    }

    #[test]
    fn magnifier_projection_scales_from_origin() {
        let mut frame = CoordinateFrame::new(3.0);
        frame.set_viewport(800, 600);
        frame.new_frame(800, 600);
        let p = frame
            .to_magnifier(Point::new(120.0, 80.0), Point::new(0.0, 0.0))
            .unwrap();
        assert_eq!(p, Point::new(360.0, 240.0));
        let back = frame.from_magnifier(p, Point::new(0.0, 0.0)).unwrap();
        assert_relative_eq!(back.x, 120.0);
        assert_relative_eq!(back.y, 80.0);
    }

    #[test]
    fn resize_keeps_source_positions_stable() {
        let mut frame = CoordinateFrame::new(1.0);
        frame.set_viewport(800, 600);
        frame.new_frame(1600, 1200);
        let d1 = frame.to_display(Point::new(400.0, 300.0)).unwrap();
        assert_eq!(d1, Point::new(200.0, 150.0));
        frame.set_viewport(1600, 1200);
        let d2 = frame.to_display(Point::new(400.0, 300.0)).unwrap();
        assert_eq!(d2, Point::new(400.0, 300.0));
    }

    #[test]
    fn icon_radius_counteracts_scale() {
        let mut frame = CoordinateFrame::new(1.0);
        frame.set_viewport(800, 600);
        frame.new_frame(1600, 1200);
        // Half-size display: a 6 px on-screen icon spans 12 source px.
        assert_relative_eq!(frame.icon_radius_source(6.0).unwrap(), 12.0);
    }
}
