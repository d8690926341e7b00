//! Annotation-event renderer
//!
//! Filters the host's event list to the current camera side and video
//! position and emits tagged draw commands. There is no incremental
//! diffing: every render removes the prior `Event`-tagged batch first and
//! redraws from scratch.

use crate::config::{OverlayConfig, OverlayPalette};
use crate::coords::CoordinateFrame;
use crate::domain::{
    AnnotationEvent, CameraSide, EventKind, Point, ShapeCategory, ShapePart, ShapeTag, TagFilter,
    VideoPosition,
};
use crate::error::OverlayError;
use crate::surface::{DrawCommand, DrawSurface, Shape};

use super::geometry::{dimension, head_points, perpendicular};

/// Overlay layer visibility
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerFlags {
    /// Event shapes
    pub events: bool,
    /// Species / measurement detail text
    pub details: bool,
    /// Epipolar geometry
    pub epipolar: bool,
}

impl Default for LayerFlags {
    fn default() -> Self {
        Self {
            events: true,
            details: true,
            epipolar: true,
        }
    }
}

/// Render the events visible on `side` at `position`
///
/// Clears the previous event batch even when the layer is disabled, so a
/// toggle-off removes stale shapes.
pub fn render_events(
    surface: &mut dyn DrawSurface,
    events: &[AnnotationEvent],
    side: CameraSide,
    position: VideoPosition,
    frame: &CoordinateFrame,
    flags: &LayerFlags,
    config: &OverlayConfig,
) -> Result<(), OverlayError> {
    surface.remove(&TagFilter::category(ShapeCategory::Event));
    if !flags.events {
        return Ok(());
    }
    if !frame.is_ready() {
        return Err(OverlayError::NotReady);
    }
    for event in events {
        if !event.visible_at(side, position) {
            continue;
        }
        match event.kind {
            EventKind::SinglePoint | EventKind::StereoPoint => {
                render_point(surface, event, side, frame, flags, config)?;
            }
            EventKind::Measurement => {
                render_measurement(surface, event, side, frame, flags, config)?;
            }
        }
    }
    Ok(())
}

fn render_point(
    surface: &mut dyn DrawSurface,
    event: &AnnotationEvent,
    side: CameraSide,
    frame: &CoordinateFrame,
    flags: &LayerFlags,
    config: &OverlayConfig,
) -> Result<(), OverlayError> {
    let Some(&p) = event.points.get(side).first() else {
        log::warn!("event {:?} has no point on {side:?}, skipping", event.id);
        return Ok(());
    };
    let center = frame.to_display(p)?;
    let palette = &config.palette;
    surface.draw(DrawCommand {
        shape: Shape::Dot {
            center,
            radius: config.icon_radius,
        },
        color: palette.event,
        filled: true,
        tag: ShapeTag::event(ShapePart::Point, event.id),
    });
    surface.draw(DrawCommand {
        shape: Shape::Text {
            anchor: Point::new(center.x + config.icon_radius + 2.0, center.y),
            content: format!("{}", event.id.0),
        },
        color: palette.text,
        filled: false,
        tag: ShapeTag::event(ShapePart::Label, event.id),
    });
    if flags.details
        && event.kind == EventKind::StereoPoint
        && let Some(species) = &event.species
    {
        surface.draw(DrawCommand {
            shape: Shape::Text {
                anchor: Point::new(center.x + config.icon_radius + 2.0, center.y + 12.0),
                content: species.label(),
            },
            color: palette.text,
            filled: false,
            tag: ShapeTag::event(ShapePart::Details, event.id),
        });
    }
    Ok(())
}

fn render_measurement(
    surface: &mut dyn DrawSurface,
    event: &AnnotationEvent,
    side: CameraSide,
    frame: &CoordinateFrame,
    flags: &LayerFlags,
    config: &OverlayConfig,
) -> Result<(), OverlayError> {
    let points = event.points.get(side);
    let (Some(&a), Some(&b)) = (points.first(), points.get(1)) else {
        log::warn!("measurement {:?} lacks two points on {side:?}", event.id);
        return Ok(());
    };
    let from = frame.to_display(a)?;
    let to = frame.to_display(b)?;
    let palette = &config.palette;

    surface.draw(DrawCommand {
        shape: Shape::Line {
            from,
            to,
            stroke: dimension::THICKNESS,
        },
        color: palette.event,
        filled: false,
        tag: ShapeTag::event(ShapePart::DimensionLine, event.id),
    });

    // Offset guide lines at each endpoint, perpendicular to the dimension.
    if let Some(perp) = perpendicular(from, to) {
        let half = dimension::GUIDE_LENGTH / 2.0;
        for end in [from, to] {
            surface.draw(DrawCommand {
                shape: Shape::Line {
                    from: Point::new(end.x - perp.x * half, end.y - perp.y * half),
                    to: Point::new(end.x + perp.x * half, end.y + perp.y * half),
                    stroke: 1.0,
                },
                color: palette.event,
                filled: false,
                tag: ShapeTag::event(ShapePart::DimensionEnd, event.id),
            });
        }
    }

    // Arrowheads pointing outward at both ends.
    for (start, end) in [(from, to), (to, from)] {
        if let Some((h1, h2)) = head_points(start, end, dimension::HEAD_SIZE) {
            for head in [h1, h2] {
                surface.draw(DrawCommand {
                    shape: Shape::Line {
                        from: end,
                        to: head,
                        stroke: dimension::THICKNESS,
                    },
                    color: palette.event,
                    filled: false,
                    tag: ShapeTag::event(ShapePart::DimensionEnd, event.id),
                });
            }
        }
    }

    if let Some(label) = measurement_label(event, flags) {
        let midpoint = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
        let anchor = match perpendicular(from, to) {
            Some(perp) => Point::new(
                midpoint.x + perp.x * dimension::LABEL_OFFSET,
                midpoint.y + perp.y * dimension::LABEL_OFFSET,
            ),
            None => midpoint,
        };
        surface.draw(DrawCommand {
            shape: Shape::Text {
                anchor,
                content: label,
            },
            color: palette.text,
            filled: false,
            tag: ShapeTag::event(ShapePart::Details, event.id),
        });
    }
    Ok(())
}

/// Combined distance and species label; species only with the detail layer
fn measurement_label(event: &AnnotationEvent, flags: &LayerFlags) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if let Some(length) = event.length_mm {
        parts.push(format!("{length:.1} mm"));
    }
    if flags.details
        && let Some(species) = &event.species
    {
        let label = species.label();
        if !label.is_empty() {
            parts.push(label);
        }
    }
    (!parts.is_empty()).then(|| parts.join("  "))
}

/// Which shape the pointer is over, and how to undo the highlight
#[derive(Clone, Copy, Debug, Default)]
pub struct HoverState {
    hovered: Option<ShapeTag>,
}

impl HoverState {
    pub fn hovered(&self) -> Option<ShapeTag> {
        self.hovered
    }

    /// Highlight a shape, reverting any previous highlight first
    pub fn hover(&mut self, surface: &mut dyn DrawSurface, tag: ShapeTag, palette: &OverlayPalette) {
        if self.hovered == Some(tag) {
            return;
        }
        self.clear(surface, palette);
        surface.recolor(&TagFilter::exact(tag), palette.highlight);
        self.hovered = Some(tag);
    }

    /// Revert every event-tagged shape to its normal color
    pub fn clear(&mut self, surface: &mut dyn DrawSurface, palette: &OverlayPalette) {
        if self.hovered.take().is_none() {
            return;
        }
        surface.recolor(&TagFilter::category(ShapeCategory::Event), palette.event);
        for part in [ShapePart::Label, ShapePart::Details] {
            let filter = TagFilter {
                category: Some(ShapeCategory::Event),
                part: Some(part),
                owner: None,
            };
            surface.recolor(&filter, palette.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventId, PerSide, Species};
    use crate::surface::RecordingSurface;

    fn ready_frame() -> CoordinateFrame {
        let mut frame = CoordinateFrame::new(3.0);
        frame.set_viewport(800, 600);
        frame.new_frame(800, 600);
        frame
    }

    fn stereo_point(id: u64, position: i64) -> AnnotationEvent {
        AnnotationEvent {
            id: EventId(id),
            kind: EventKind::StereoPoint,
            position: PerSide {
                left: Some(VideoPosition(position)),
                right: Some(VideoPosition(position)),
            },
            points: PerSide {
                left: vec![Point::new(100.0, 100.0)],
                right: vec![Point::new(110.0, 100.0)],
            },
            species: Some(Species {
                family: "Sparidae".into(),
                genus: "Pagrus".into(),
                species: "auratus".into(),
            }),
            length_mm: None,
            rms: None,
            precision_mm: None,
        }
    }

    fn measurement(id: u64, position: i64) -> AnnotationEvent {
        AnnotationEvent {
            id: EventId(id),
            kind: EventKind::Measurement,
            position: PerSide {
                left: Some(VideoPosition(position)),
                right: Some(VideoPosition(position)),
            },
            points: PerSide {
                left: vec![Point::new(100.0, 100.0), Point::new(300.0, 200.0)],
                right: vec![Point::new(120.0, 100.0), Point::new(320.0, 200.0)],
            },
            species: Some(Species {
                family: "Sparidae".into(),
                genus: String::new(),
                species: String::new(),
            }),
            length_mm: Some(412.5),
            rms: Some(0.4),
            precision_mm: Some(2.1),
        }
    }

    #[test]
    fn render_filters_by_side_and_position() {
        let mut surface = RecordingSurface::new();
        let events = vec![stereo_point(1, 40), stereo_point(2, 41)];
        let frame = ready_frame();
        render_events(
            &mut surface,
            &events,
            CameraSide::Left,
            VideoPosition(40),
            &frame,
            &LayerFlags::default(),
            &OverlayConfig::default(),
        )
        .unwrap();
        let dots = TagFilter {
            category: Some(ShapeCategory::Event),
            part: Some(ShapePart::Point),
            owner: None,
        };
        assert_eq!(surface.count(&dots), 1);
        assert_eq!(
            surface.tagged(dots).next().unwrap().tag.event_id(),
            Some(EventId(1))
        );
    }

    #[test]
    fn rerender_clears_prior_batch() {
        let mut surface = RecordingSurface::new();
        let events = vec![stereo_point(1, 40)];
        let frame = ready_frame();
        let config = OverlayConfig::default();
        let flags = LayerFlags::default();
        for _ in 0..3 {
            render_events(
                &mut surface,
                &events,
                CameraSide::Left,
                VideoPosition(40),
                &frame,
                &flags,
                &config,
            )
            .unwrap();
        }
        assert_eq!(surface.count(&TagFilter::category(ShapeCategory::Event)), 3);
    }

    #[test]
    fn details_flag_gates_species_text() {
        let mut surface = RecordingSurface::new();
        let events = vec![stereo_point(1, 40)];
        let frame = ready_frame();
        let config = OverlayConfig::default();
        let flags = LayerFlags {
            details: false,
            ..LayerFlags::default()
        };
        render_events(
            &mut surface,
            &events,
            CameraSide::Left,
            VideoPosition(40),
            &frame,
            &flags,
            &config,
        )
        .unwrap();
        let details = TagFilter {
            category: Some(ShapeCategory::Event),
            part: Some(ShapePart::Details),
            owner: None,
        };
        assert_eq!(surface.count(&details), 0);
    }

    #[test]
    fn measurement_emits_full_dimension_indicator() {
        let mut surface = RecordingSurface::new();
        let events = vec![measurement(7, 40)];
        let frame = ready_frame();
        render_events(
            &mut surface,
            &events,
            CameraSide::Left,
            VideoPosition(40),
            &frame,
            &LayerFlags::default(),
            &OverlayConfig::default(),
        )
        .unwrap();
        let part = |p| TagFilter {
            category: Some(ShapeCategory::Event),
            part: Some(p),
            owner: None,
        };
        assert_eq!(surface.count(&part(ShapePart::DimensionLine)), 1);
        // Two guide lines plus four arrowhead strokes.
        assert_eq!(surface.count(&part(ShapePart::DimensionEnd)), 6);
        let label = surface
            .tagged(part(ShapePart::Details))
            .next()
            .unwrap();
        match &label.shape {
            Shape::Text { content, .. } => {
                assert!(content.contains("412.5 mm"));
                assert!(content.contains("Sparidae"));
            }
            other => panic!("expected text label, got {other:?}"),
        }
    }

    #[test]
    fn layer_off_removes_stale_shapes() {
        let mut surface = RecordingSurface::new();
        let events = vec![stereo_point(1, 40)];
        let frame = ready_frame();
        let config = OverlayConfig::default();
        render_events(
            &mut surface,
            &events,
            CameraSide::Left,
            VideoPosition(40),
            &frame,
            &LayerFlags::default(),
            &config,
        )
        .unwrap();
        assert!(surface.count(&TagFilter::category(ShapeCategory::Event)) > 0);
        let off = LayerFlags {
            events: false,
            ..LayerFlags::default()
        };
        render_events(
            &mut surface,
            &events,
            CameraSide::Left,
            VideoPosition(40),
            &frame,
            &off,
            &config,
        )
        .unwrap();
        assert_eq!(surface.count(&TagFilter::category(ShapeCategory::Event)), 0);
    }

    #[test]
    fn hover_highlights_and_clear_reverts() {
        let mut surface = RecordingSurface::new();
        let events = vec![stereo_point(1, 40)];
        let frame = ready_frame();
        let config = OverlayConfig::default();
        render_events(
            &mut surface,
            &events,
            CameraSide::Left,
            VideoPosition(40),
            &frame,
            &LayerFlags::default(),
            &config,
        )
        .unwrap();

        let mut hover = HoverState::default();
        let tag = ShapeTag::event(ShapePart::Point, EventId(1));
        hover.hover(&mut surface, tag, &config.palette);
        let dot = surface.tagged(TagFilter::exact(tag)).next().unwrap();
        assert_eq!(dot.color, config.palette.highlight);

        hover.clear(&mut surface, &config.palette);
        let dot = surface.tagged(TagFilter::exact(tag)).next().unwrap();
        assert_eq!(dot.color, config.palette.event);
        assert!(hover.hovered().is_none());
    }
}
