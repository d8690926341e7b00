//! Logical shape tags
//!
//! Every draw command carries a `ShapeTag` so the host (or the recording
//! surface) can find, recolor, and remove shapes by meaning rather than by
//! runtime type inspection: "remove everything tagged Event", "highlight the
//! dimension line of event 7".

use super::annotation::EventId;
use super::target::TargetRole;

/// Top-level grouping of emitted shapes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeCategory {
    /// Target marker icons and their labels
    Target,
    /// Epipolar guide line or corridor shading
    Epipolar,
    /// Shapes rendered from annotation events
    Event,
    /// Magnifier chrome (border, crosshair)
    Magnifier,
}

/// Which part of a composite drawing a shape is
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapePart {
    /// A marker icon
    Icon,
    /// A text label
    Label,
    /// A single guide line
    Guide,
    /// One of the two shaded out-of-corridor polygons (0 or 1)
    Shade(u8),
    /// A point dot
    Point,
    /// The main line of a dimension indicator
    DimensionLine,
    /// An end tick / arrowhead of a dimension indicator
    DimensionEnd,
    /// Species / measurement detail text
    Details,
    /// Window border
    Border,
    /// Center crosshair
    Crosshair,
}

/// Who a shape belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeOwner {
    /// Component-owned chrome with no per-item identity
    None,
    /// One of the two target roles
    Role(TargetRole),
    /// An annotation event
    Event(EventId),
}

/// The (category, part, owner) triple attached to every draw command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShapeTag {
    pub category: ShapeCategory,
    pub part: ShapePart,
    pub owner: ShapeOwner,
}

impl ShapeTag {
    pub fn new(category: ShapeCategory, part: ShapePart, owner: ShapeOwner) -> Self {
        Self {
            category,
            part,
            owner,
        }
    }

    /// Tag for a target marker shape
    pub fn target(part: ShapePart, role: TargetRole) -> Self {
        Self::new(ShapeCategory::Target, part, ShapeOwner::Role(role))
    }

    /// Tag for epipolar geometry owned by a role
    pub fn epipolar(part: ShapePart, role: TargetRole) -> Self {
        Self::new(ShapeCategory::Epipolar, part, ShapeOwner::Role(role))
    }

    /// Tag for a shape rendered from an annotation event
    pub fn event(part: ShapePart, id: EventId) -> Self {
        Self::new(ShapeCategory::Event, part, ShapeOwner::Event(id))
    }

    /// Tag for magnifier chrome
    pub fn magnifier(part: ShapePart) -> Self {
        Self::new(ShapeCategory::Magnifier, part, ShapeOwner::None)
    }

    /// The event this shape belongs to, if any
    pub fn event_id(&self) -> Option<EventId> {
        match self.owner {
            ShapeOwner::Event(id) => Some(id),
            _ => None,
        }
    }
}

/// Prefix-style filter over tags: `None` fields match anything
#[derive(Clone, Copy, Debug, Default)]
pub struct TagFilter {
    pub category: Option<ShapeCategory>,
    pub part: Option<ShapePart>,
    pub owner: Option<ShapeOwner>,
}

impl TagFilter {
    /// Match every shape in a category
    pub fn category(category: ShapeCategory) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    /// Match every shape in a category belonging to an owner
    pub fn owned(category: ShapeCategory, owner: ShapeOwner) -> Self {
        Self {
            category: Some(category),
            part: None,
            owner: Some(owner),
        }
    }

    /// Match exactly one tag
    pub fn exact(tag: ShapeTag) -> Self {
        Self {
            category: Some(tag.category),
            part: Some(tag.part),
            owner: Some(tag.owner),
        }
    }

    /// Whether `tag` passes this filter
    pub fn matches(&self, tag: &ShapeTag) -> bool {
        self.category.is_none_or(|c| c == tag.category)
            && self.part.is_none_or(|p| p == tag.part)
            && self.owner.is_none_or(|o| o == tag.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_filter_matches_any_owner() {
        let f = TagFilter::category(ShapeCategory::Event);
        assert!(f.matches(&ShapeTag::event(ShapePart::Point, EventId(3))));
        assert!(f.matches(&ShapeTag::event(ShapePart::Details, EventId(9))));
        assert!(!f.matches(&ShapeTag::target(ShapePart::Icon, TargetRole::A)));
    }

    #[test]
    fn owned_filter_is_per_owner() {
        let f = TagFilter::owned(ShapeCategory::Epipolar, ShapeOwner::Role(TargetRole::B));
        assert!(f.matches(&ShapeTag::epipolar(ShapePart::Shade(1), TargetRole::B)));
        assert!(!f.matches(&ShapeTag::epipolar(ShapePart::Guide, TargetRole::A)));
    }
}
