//! Draw-command surface
//!
//! Components never rasterize; they emit tagged draw commands through the
//! [`DrawSurface`] trait and the host decides how to put pixels on screen.
//! [`RecordingSurface`] is the in-crate implementation: a retained display
//! list with tag-based removal, recoloring and hit-testing, used by the
//! tests and usable by hosts that want a ready-made shape store.

use crate::config::ShapeColor;
use crate::domain::{Point, ShapeTag, TagFilter};

/// Geometry of one draw command
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Line {
        from: Point,
        to: Point,
        stroke: f64,
    },
    Dot {
        center: Point,
        radius: f64,
    },
    /// Closed polygon; filled when the command says so
    Polygon {
        points: Vec<Point>,
    },
    Text {
        anchor: Point,
        content: String,
    },
}

/// A single tagged drawing operation
#[derive(Clone, Debug, PartialEq)]
pub struct DrawCommand {
    pub shape: Shape,
    pub color: ShapeColor,
    pub filled: bool,
    pub tag: ShapeTag,
}

/// Abstract 2D drawing surface provided by the host
pub trait DrawSurface {
    /// Add a shape
    fn draw(&mut self, command: DrawCommand);

    /// Remove every shape whose tag matches the filter
    fn remove(&mut self, filter: &TagFilter);

    /// Recolor every shape whose tag matches the filter
    fn recolor(&mut self, filter: &TagFilter, color: ShapeColor);

    /// Topmost shape under the pointer, within `tolerance` display pixels
    fn hit_test(&self, p: Point, tolerance: f64) -> Option<ShapeTag>;
}

/// Retained display list implementing [`DrawSurface`]
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands in draw order
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands whose tag matches the filter
    pub fn tagged(&self, filter: TagFilter) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(move |c| filter.matches(&c.tag))
    }

    /// Number of commands matching the filter
    pub fn count(&self, filter: &TagFilter) -> usize {
        self.tagged(*filter).count()
    }
}

impl DrawSurface for RecordingSurface {
    fn draw(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    fn remove(&mut self, filter: &TagFilter) {
        self.commands.retain(|c| !filter.matches(&c.tag));
    }

    fn recolor(&mut self, filter: &TagFilter, color: ShapeColor) {
        for command in &mut self.commands {
            if filter.matches(&command.tag) {
                command.color = color;
            }
        }
    }

    fn hit_test(&self, p: Point, tolerance: f64) -> Option<ShapeTag> {
        self.commands
            .iter()
            .rev()
            .find(|c| shape_hit(&c.shape, p, tolerance))
            .map(|c| c.tag)
    }
}

fn shape_hit(shape: &Shape, p: Point, tolerance: f64) -> bool {
    match shape {
        Shape::Line { from, to, stroke } => {
            point_segment_distance(p, *from, *to) <= stroke / 2.0 + tolerance
        }
        Shape::Dot { center, radius } => p.distance(*center) <= radius + tolerance,
        Shape::Polygon { points } => point_in_polygon(p, points),
        // Text extent is renderer-dependent; treat the anchor as a small pad.
        Shape::Text { anchor, .. } => p.distance(*anchor) <= tolerance.max(8.0),
    }
}

fn point_segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let len2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len2).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + t * (b.x - a.x), a.y + t * (b.y - a.y)))
}

fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (polygon[i], polygon[j]);
        if (pi.y > p.y) != (pj.y > p.y)
            && p.x < (pj.x - pi.x) * (p.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventId, ShapeCategory, ShapePart, TargetRole};

    fn dot(tag: ShapeTag, x: f64, y: f64) -> DrawCommand {
        DrawCommand {
            shape: Shape::Dot {
                center: Point::new(x, y),
                radius: 5.0,
            },
            color: ShapeColor::default(),
            filled: true,
            tag,
        }
    }

    #[test]
    fn remove_by_category_leaves_other_categories() {
        let mut surface = RecordingSurface::new();
        surface.draw(dot(ShapeTag::event(ShapePart::Point, EventId(1)), 1.0, 1.0));
        surface.draw(dot(ShapeTag::event(ShapePart::Point, EventId(2)), 2.0, 2.0));
        surface.draw(dot(ShapeTag::target(ShapePart::Icon, TargetRole::A), 3.0, 3.0));
        surface.remove(&TagFilter::category(ShapeCategory::Event));
        assert_eq!(surface.commands().len(), 1);
        assert_eq!(
            surface.commands()[0].tag,
            ShapeTag::target(ShapePart::Icon, TargetRole::A)
        );
    }

    #[test]
    fn tagged_iterates_matches_in_draw_order() {
        let mut surface = RecordingSurface::new();
        surface.draw(dot(ShapeTag::event(ShapePart::Point, EventId(1)), 1.0, 1.0));
        surface.draw(dot(ShapeTag::target(ShapePart::Icon, TargetRole::A), 2.0, 2.0));
        surface.draw(dot(ShapeTag::event(ShapePart::Point, EventId(2)), 3.0, 3.0));
        let ids: Vec<_> = surface
            .tagged(TagFilter::category(ShapeCategory::Event))
            .map(|c| c.tag.event_id())
            .collect();
        assert_eq!(ids, vec![Some(EventId(1)), Some(EventId(2))]);
        assert_eq!(
            surface
                .tagged(TagFilter::exact(ShapeTag::event(ShapePart::Point, EventId(2))))
                .count(),
            1
        );
    }

    #[test]
    fn hit_test_returns_topmost_shape() {
        let mut surface = RecordingSurface::new();
        surface.draw(dot(ShapeTag::event(ShapePart::Point, EventId(1)), 10.0, 10.0));
        surface.draw(dot(ShapeTag::event(ShapePart::Point, EventId(2)), 11.0, 10.0));
        let tag = surface.hit_test(Point::new(10.5, 10.0), 1.0).unwrap();
        assert_eq!(tag.event_id(), Some(EventId(2)));
        assert!(surface.hit_test(Point::new(500.0, 500.0), 1.0).is_none());
    }

    #[test]
    fn line_hit_respects_stroke_and_tolerance() {
        let mut surface = RecordingSurface::new();
        surface.draw(DrawCommand {
            shape: Shape::Line {
                from: Point::new(0.0, 0.0),
                to: Point::new(100.0, 0.0),
                stroke: 2.0,
            },
            color: ShapeColor::default(),
            filled: false,
            tag: ShapeTag::event(ShapePart::DimensionLine, EventId(5)),
        });
        assert!(surface.hit_test(Point::new(50.0, 3.0), 2.5).is_some());
        assert!(surface.hit_test(Point::new(50.0, 9.0), 2.5).is_none());
    }

    #[test]
    fn polygon_hit_uses_containment() {
        let mut surface = RecordingSurface::new();
        surface.draw(DrawCommand {
            shape: Shape::Polygon {
                points: vec![
                    Point::new(0.0, 0.0),
                    Point::new(100.0, 0.0),
                    Point::new(100.0, 100.0),
                    Point::new(0.0, 100.0),
                ],
            },
            color: ShapeColor::default(),
            filled: true,
            tag: ShapeTag::epipolar(ShapePart::Shade(0), TargetRole::A),
        });
        assert!(surface.hit_test(Point::new(50.0, 50.0), 0.0).is_some());
        assert!(surface.hit_test(Point::new(150.0, 50.0), 0.0).is_none());
    }
}
