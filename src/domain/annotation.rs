//! Annotation-event types consumed by the overlay renderer
//!
//! All coordinates are in source-image space of the respective camera side.
//! The event list itself is owned by the host's annotation store; the overlay
//! only reads it.

use serde::{Deserialize, Serialize};

use super::geometry::Point;

/// Opaque identity of an annotation event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

/// Which stereo camera an instance (or a coordinate) belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraSide {
    Left,
    Right,
}

impl CameraSide {
    /// The sibling instance's side
    pub fn other(self) -> Self {
        match self {
            CameraSide::Left => CameraSide::Right,
            CameraSide::Right => CameraSide::Left,
        }
    }
}

/// Position of a displayed frame within the video, per camera side
///
/// The two sides of a stereo rig are rarely frame-aligned, so each event
/// stores one position per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VideoPosition(pub i64);

/// A value held once per camera side
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerSide<T> {
    pub left: T,
    pub right: T,
}

impl<T> PerSide<T> {
    pub fn get(&self, side: CameraSide) -> &T {
        match side {
            CameraSide::Left => &self.left,
            CameraSide::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, side: CameraSide) -> &mut T {
        match side {
            CameraSide::Left => &mut self.left,
            CameraSide::Right => &mut self.right,
        }
    }
}

/// Taxonomic descriptor attached to a point or measurement
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub family: String,
    pub genus: String,
    pub species: String,
}

impl Species {
    /// Display label, skipping empty components
    pub fn label(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for part in [&self.family, &self.genus, &self.species] {
            if !part.is_empty() {
                parts.push(part);
            }
        }
        parts.join(" ")
    }
}

/// What kind of annotation an event represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// One point on one camera side only
    SinglePoint,
    /// One point matched across both camera sides
    StereoPoint,
    /// A pair of matched points defining a length measurement
    Measurement,
}

/// A read-only annotation event supplied by the host's annotation store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnnotationEvent {
    pub id: EventId,
    pub kind: EventKind,
    /// Video position per camera side; `None` when the event has no
    /// coordinates on that side
    pub position: PerSide<Option<VideoPosition>>,
    /// Source-space points per camera side: one for point kinds, two for
    /// measurements
    pub points: PerSide<Vec<Point>>,
    pub species: Option<Species>,
    /// Computed 3D length in millimetres (measurement kind)
    pub length_mm: Option<f64>,
    /// Measurement quality: RMS reprojection residual
    pub rms: Option<f64>,
    /// Measurement quality: length precision estimate
    pub precision_mm: Option<f64>,
}

impl AnnotationEvent {
    /// Whether this event is visible on `side` at `position`
    pub fn visible_at(&self, side: CameraSide, position: VideoPosition) -> bool {
        *self.position.get(side) == Some(position)
    }

    /// Whether this event defines a length measurement
    pub fn is_measurement(&self) -> bool {
        matches!(self.kind, EventKind::Measurement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_label_skips_empty_parts() {
        let sp = Species {
            family: "Sparidae".into(),
            genus: String::new(),
            species: "auratus".into(),
        };
        assert_eq!(sp.label(), "Sparidae auratus");
    }

    #[test]
    fn visibility_requires_matching_side_position() {
        let ev = AnnotationEvent {
            id: EventId(1),
            kind: EventKind::SinglePoint,
            position: PerSide {
                left: Some(VideoPosition(40)),
                right: None,
            },
            points: PerSide {
                left: vec![Point::new(10.0, 10.0)],
                right: Vec::new(),
            },
            species: None,
            length_mm: None,
            rms: None,
            precision_mm: None,
        };
        assert!(ev.visible_at(CameraSide::Left, VideoPosition(40)));
        assert!(!ev.visible_at(CameraSide::Left, VideoPosition(41)));
        assert!(!ev.visible_at(CameraSide::Right, VideoPosition(40)));
    }
}
