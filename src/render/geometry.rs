//! Shared geometry for dimension indicators
//!
//! Constants and math used when turning a measurement event into a
//! dimension line with arrowheads and offset guide lines.

/// Dimension indicator constants
pub mod dimension {
    /// Main line thickness in display pixels
    pub const THICKNESS: f64 = 2.0;
    /// Arrowhead size in display pixels
    pub const HEAD_SIZE: f64 = 10.0;
    /// Guide-line length at each endpoint in display pixels
    pub const GUIDE_LENGTH: f64 = 14.0;
    /// Perpendicular offset of the label from the line midpoint
    pub const LABEL_OFFSET: f64 = 12.0;
    /// Arrowhead angle from the shaft in radians (35 degrees)
    pub const HEAD_ANGLE: f64 = 0.610_865_238_198_015_3;
    /// Minimum line length for arrowheads and guides to be drawn
    pub const MIN_LENGTH: f64 = 5.0;
}

use crate::domain::Point;

/// Calculate arrowhead points for a line ending at `end`
///
/// Returns the two free endpoints of the head lines, or `None` when the
/// line is too short to decorate.
pub fn head_points(start: Point, end: Point, head_size: f64) -> Option<(Point, Point)> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < dimension::MIN_LENGTH {
        return None;
    }

    // Unit direction vector (pointing from start to end)
    let nx = dx / length;
    let ny = dy / length;

    let cos_a = dimension::HEAD_ANGLE.cos();
    let sin_a = dimension::HEAD_ANGLE.sin();

    // Head lines rotated either way from the reversed direction.
    let head1 = Point::new(
        end.x + (-nx * cos_a + ny * sin_a) * head_size,
        end.y + (-nx * sin_a - ny * cos_a) * head_size,
    );
    let head2 = Point::new(
        end.x + (-nx * cos_a - ny * sin_a) * head_size,
        end.y + (nx * sin_a - ny * cos_a) * head_size,
    );

    Some((head1, head2))
}

/// Unit vector perpendicular to the segment, or `None` when degenerate
pub fn perpendicular(start: Point, end: Point) -> Option<Point> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length < dimension::MIN_LENGTH {
        return None;
    }
    Some(Point::new(-dy / length, dx / length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn head_points_flank_the_shaft() {
        let start = Point::new(0.0, 0.0);
        let end = Point::new(100.0, 0.0);
        let (h1, h2) = head_points(start, end, 10.0).unwrap();
        // Both heads trail behind the tip, one on each side.
        assert!(h1.x < 100.0 && h2.x < 100.0);
        assert!(h1.y.signum() != h2.y.signum());
        assert_relative_eq!(h1.distance(end), 10.0, max_relative = 1e-9);
        assert_relative_eq!(h2.distance(end), 10.0, max_relative = 1e-9);
    }

    #[test]
    fn short_lines_are_undecorated() {
        assert!(head_points(Point::new(0.0, 0.0), Point::new(2.0, 0.0), 10.0).is_none());
        assert!(perpendicular(Point::new(0.0, 0.0), Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn perpendicular_is_unit_and_orthogonal() {
        let p = perpendicular(Point::new(10.0, 10.0), Point::new(40.0, 50.0)).unwrap();
        assert_relative_eq!(p.x * p.x + p.y * p.y, 1.0, max_relative = 1e-9);
        assert_relative_eq!(p.x * 30.0 + p.y * 40.0, 0.0, epsilon = 1e-9);
    }
}
