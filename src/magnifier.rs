//! Magnifier window controller
//!
//! Computes the on-screen and source-space rectangles of the magnifier,
//! clamped to the visible canvas, and owns the lock and auto-hide
//! lifecycle. Pixel refreshes are gated by a single-slot atomic: while one
//! refresh is being computed, later requests are dropped rather than
//! queued, so fast pointer movement can never pile up stale work.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::config::{OverlayConfig, OverlayPalette};
use crate::coords::CoordinateFrame;
use crate::domain::{Point, Rect, ShapePart, ShapeTag};
use crate::error::OverlayError;
use crate::frame::FrameSource;
use crate::surface::{DrawCommand, Shape};

/// The magnifier's two coincident rectangles
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MagnifierPlacement {
    /// On-screen rectangle in display space
    pub screen: Rect,
    /// Magnified region in source-image space
    pub source: Rect,
}

/// Magnifier placement, lock and auto-hide state
#[derive(Debug)]
pub struct MagnifierController {
    sizes: Vec<i32>,
    idle_hide: Duration,
    locked: bool,
    visible: bool,
    placement: Option<MagnifierPlacement>,
    last_seen: Option<Instant>,
    refresh_gate: AtomicU32,
}

impl MagnifierController {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            sizes: config.magnifier_sizes.clone(),
            idle_hide: Duration::from_millis(config.idle_hide_ms),
            locked: false,
            visible: false,
            placement: None,
            last_seen: None,
            refresh_gate: AtomicU32::new(0),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn placement(&self) -> Option<MagnifierPlacement> {
        self.placement
    }

    /// Re-place the magnifier under a display-space pointer position
    ///
    /// Ignored while locked. The configured size is stepped down at most
    /// twice when the canvas is too small; if it still does not fit the
    /// magnifier stays hidden and [`OverlayError::OversizedMagnifier`] is
    /// returned.
    pub fn update_at(
        &mut self,
        pointer: Point,
        frame: &CoordinateFrame,
        now: Instant,
    ) -> Result<MagnifierPlacement, OverlayError> {
        self.last_seen = Some(now);
        // Locked without a placement cannot arise through the public API;
        // if it ever does, recompute instead of misreporting an unready frame.
        if self.locked
            && let Some(placement) = self.placement
        {
            return Ok(placement);
        }
        let (canvas_w, canvas_h) = frame.display_size().ok_or(OverlayError::NotReady)?;
        let (source_w, source_h) = frame.source_size().ok_or(OverlayError::NotReady)?;
        let canvas = Rect::new(0, 0, canvas_w as i32, canvas_h as i32);

        let mut chosen = None;
        for &size in self.sizes.iter().take(3) {
            if size <= canvas.width() && size <= canvas.height() {
                chosen = Some(size);
                break;
            }
        }
        let Some(size) = chosen else {
            let requested = self.sizes.first().copied().unwrap_or(0);
            self.visible = false;
            self.placement = None;
            let err = OverlayError::OversizedMagnifier {
                requested_w: requested,
                requested_h: requested,
                canvas_w: canvas.width(),
                canvas_h: canvas.height(),
            };
            log::warn!("cannot display magnifier: {err}");
            return Err(err);
        };

        let screen = Rect::centered_on(pointer, size, size)
            .clamp_within(canvas)
            .unwrap_or(canvas);

        let zoom = frame.zoom();
        let span = ((f64::from(size) / zoom).round() as i32).max(1);
        let center = frame.to_source(pointer)?;
        let source_bounds = Rect::new(0, 0, source_w as i32, source_h as i32);
        let source = Rect::centered_on(center, span, span)
            .clamp_within(source_bounds)
            .unwrap_or(source_bounds);

        let placement = MagnifierPlacement { screen, source };
        self.placement = Some(placement);
        self.visible = true;
        Ok(placement)
    }

    /// Fix the magnifier at its current placement (primary-button press)
    pub fn lock(&mut self) {
        if self.visible {
            self.locked = true;
        }
    }

    /// Release the lock and resume following the pointer
    pub fn unlock(&mut self) {
        self.locked = false;
    }

    /// Hide and unlock (explicit close or host-window deactivation)
    pub fn hide(&mut self) {
        self.locked = false;
        self.visible = false;
        self.placement = None;
    }

    /// Record pointer presence without moving the window
    pub fn note_activity(&mut self, now: Instant) {
        self.last_seen = Some(now);
    }

    /// Cooperative auto-hide, called from a low-frequency timer
    ///
    /// Hides the magnifier once the pointer has been idle past the
    /// threshold, unless the pointer is over the control, a context menu is
    /// open, or the host window is in the background. Returns whether the
    /// magnifier was hidden by this tick.
    pub fn tick(
        &mut self,
        now: Instant,
        pointer_over: bool,
        menu_open: bool,
        window_active: bool,
    ) -> bool {
        if !self.visible {
            return false;
        }
        if pointer_over {
            self.last_seen = Some(now);
            return false;
        }
        if menu_open || !window_active {
            return false;
        }
        let idle = match self.last_seen {
            Some(seen) => now.saturating_duration_since(seen),
            None => return false,
        };
        if idle >= self.idle_hide {
            log::debug!("magnifier idle for {idle:?}, hiding");
            self.hide();
            true
        } else {
            false
        }
    }

    /// Admit a pixel refresh; `false` means one is already being computed
    /// and this request is dropped
    pub fn begin_refresh(&self) -> bool {
        self.refresh_gate
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Mark the in-flight refresh finished
    pub fn end_refresh(&self) {
        self.refresh_gate.store(0, Ordering::Release);
    }

    /// Decode the magnified sub-region of the current frame
    pub fn region_pixels(&self, source: &dyn FrameSource) -> Option<RgbaImage> {
        source.region(self.placement?.source)
    }

    /// Re-project a source-space point into magnifier space
    ///
    /// `None` when the point lies outside the magnified source rectangle;
    /// the point stays valid in source space, it is merely not shown.
    pub fn project(
        &self,
        p: Point,
        frame: &CoordinateFrame,
    ) -> Result<Option<Point>, OverlayError> {
        let Some(placement) = self.placement else {
            return Ok(None);
        };
        if !placement.source.contains_point(p) {
            return Ok(None);
        }
        frame.to_magnifier(p, placement.source.origin()).map(Some)
    }

    /// Border and crosshair chrome for the current placement
    pub fn chrome(&self, palette: &OverlayPalette) -> Vec<DrawCommand> {
        let Some(MagnifierPlacement { screen, .. }) = self.placement else {
            return Vec::new();
        };
        if !self.visible {
            return Vec::new();
        }
        let border_color = if self.locked {
            palette.magnifier_locked
        } else {
            palette.magnifier_border
        };
        let center = screen.center();
        let cross = 8.0;
        vec![
            DrawCommand {
                shape: Shape::Polygon {
                    points: vec![
                        screen.origin(),
                        Point::new(screen.right as f64, screen.top as f64),
                        Point::new(screen.right as f64, screen.bottom as f64),
                        Point::new(screen.left as f64, screen.bottom as f64),
                    ],
                },
                color: border_color,
                filled: false,
                tag: ShapeTag::magnifier(ShapePart::Border),
            },
            DrawCommand {
                shape: Shape::Line {
                    from: Point::new(center.x - cross, center.y),
                    to: Point::new(center.x + cross, center.y),
                    stroke: 1.0,
                },
                color: palette.text,
                filled: false,
                tag: ShapeTag::magnifier(ShapePart::Crosshair),
            },
            DrawCommand {
                shape: Shape::Line {
                    from: Point::new(center.x, center.y - cross),
                    to: Point::new(center.x, center.y + cross),
                    stroke: 1.0,
                },
                color: palette.text,
                filled: false,
                tag: ShapeTag::magnifier(ShapePart::Crosshair),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_frame() -> CoordinateFrame {
        let mut frame = CoordinateFrame::new(3.0);
        frame.set_viewport(800, 600);
        frame.new_frame(800, 600);
        frame
    }

    fn controller() -> MagnifierController {
        MagnifierController::new(&OverlayConfig::default())
    }

    #[test]
    fn placement_is_clamped_to_canvas_and_source() {
        let mut mag = controller();
        let frame = ready_frame();
        let p = mag
            .update_at(Point::new(790.0, 5.0), &frame, Instant::now())
            .unwrap();
        let canvas = Rect::new(0, 0, 800, 600);
        assert_eq!(p.screen.clamp_within(canvas), Some(p.screen));
        assert_eq!(p.source.clamp_within(canvas), Some(p.source));
        assert_eq!(p.screen.width(), 384);
        // 384 display px at zoom 3 magnify a 128 px source span.
        assert_eq!(p.source.width(), 128);
    }

    #[test]
    fn size_steps_down_on_small_canvas() {
        let mut mag = controller();
        let mut frame = CoordinateFrame::new(3.0);
        frame.set_viewport(300, 300);
        frame.new_frame(800, 600);
        let p = mag
            .update_at(Point::new(150.0, 150.0), &frame, Instant::now())
            .unwrap();
        assert_eq!(p.screen.width(), 256);
    }

    #[test]
    fn oversized_canvas_hides_with_warning_error() {
        let mut mag = controller();
        let mut frame = CoordinateFrame::new(3.0);
        frame.set_viewport(100, 100);
        frame.new_frame(800, 600);
        let err = mag
            .update_at(Point::new(50.0, 50.0), &frame, Instant::now())
            .unwrap_err();
        assert!(matches!(err, OverlayError::OversizedMagnifier { .. }));
        assert!(!mag.is_visible());
    }

    #[test]
    fn refresh_gate_admits_exactly_one() {
        let mag = controller();
        assert!(mag.begin_refresh());
        // A second request while the first is computing is dropped.
        assert!(!mag.begin_refresh());
        mag.end_refresh();
        assert!(mag.begin_refresh());
        mag.end_refresh();
    }

    #[test]
    fn locked_magnifier_ignores_pointer_moves() {
        let mut mag = controller();
        let frame = ready_frame();
        let now = Instant::now();
        let before = mag.update_at(Point::new(400.0, 300.0), &frame, now).unwrap();
        mag.lock();
        let after = mag.update_at(Point::new(100.0, 100.0), &frame, now).unwrap();
        assert_eq!(before, after);
        mag.unlock();
        let moved = mag.update_at(Point::new(100.0, 100.0), &frame, now).unwrap();
        assert_ne!(before, moved);
    }

    #[test]
    fn locked_without_placement_recomputes_instead_of_failing() {
        let mut mag = controller();
        let frame = ready_frame();
        mag.locked = true;
        let p = mag
            .update_at(Point::new(400.0, 300.0), &frame, Instant::now())
            .unwrap();
        assert_eq!(p.screen.width(), 384);
        assert!(mag.is_visible());
    }

    #[test]
    fn projection_hides_points_outside_source_rect() {
        let mut mag = controller();
        let frame = ready_frame();
        mag.update_at(Point::new(64.0, 64.0), &frame, Instant::now())
            .unwrap();
        // Force a known source rect for the scenario.
        mag.placement = Some(MagnifierPlacement {
            screen: Rect::new(0, 0, 384, 384),
            source: Rect::new(0, 0, 300, 300),
        });
        let projected = mag
            .project(Point::new(120.0, 80.0), &frame)
            .unwrap()
            .unwrap();
        assert_eq!(projected, Point::new(360.0, 240.0));

        mag.placement = Some(MagnifierPlacement {
            screen: Rect::new(0, 0, 384, 384),
            source: Rect::new(400, 400, 700, 700),
        });
        assert_eq!(mag.project(Point::new(120.0, 80.0), &frame).unwrap(), None);
    }

    #[test]
    fn tick_hides_after_idle_threshold() {
        let mut mag = controller();
        let frame = ready_frame();
        let start = Instant::now();
        mag.update_at(Point::new(400.0, 300.0), &frame, start).unwrap();
        let later = start + Duration::from_millis(2500);
        // Pointer over the control defers hiding.
        assert!(!mag.tick(later, true, false, true));
        assert!(mag.is_visible());
        // Open menu defers hiding.
        let much_later = later + Duration::from_millis(2500);
        assert!(!mag.tick(much_later, false, true, true));
        // Idle, unhovered, foregrounded: hidden.
        assert!(mag.tick(much_later + Duration::from_millis(2500), false, false, true));
        assert!(!mag.is_visible());
        assert!(!mag.is_locked());
    }

    #[test]
    fn region_pixels_uses_source_placement() {
        let mut mag = controller();
        let frame = ready_frame();
        mag.update_at(Point::new(400.0, 300.0), &frame, Instant::now())
            .unwrap();
        let pixels = RgbaImage::from_pixel(800, 600, image::Rgba([1, 2, 3, 255]));
        let region = mag.region_pixels(&pixels).unwrap();
        assert_eq!(region.width(), 128);
        assert_eq!(region.height(), 128);
    }
}
