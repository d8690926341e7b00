//! Target-point model
//!
//! Per camera-side state machine for the two selectable target markers.
//! Positions are owned exclusively by the local instance; the sibling
//! instance only ever learns set/unset through sync messages, and vice
//! versa.

use crate::domain::{Point, Rect, TargetRole, TargetState};
use crate::error::OverlayError;
use crate::session::messages::SyncMessage;

/// One target marker slot
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetPoint {
    /// Position in source-image space; `None` while unset
    pub position: Option<Point>,
    pub state: TargetState,
    /// Whether the corresponding role is set on the sibling instance;
    /// updated only by inbound sync messages
    pub sibling_set: bool,
    /// Position at drag start, for out-of-bounds revert
    drag_origin: Option<Point>,
}

/// Context-menu enablement derived from target state, computed on demand
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuEnablement {
    pub add_measurement: bool,
    pub add_3d_point: bool,
    pub add_single_point: bool,
    pub delete_target: [bool; 2],
}

/// The two target slots of one camera-side instance
#[derive(Clone, Debug, Default)]
pub struct TargetPointModel {
    slots: [TargetPoint; 2],
}

impl TargetPointModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: TargetRole) -> &TargetPoint {
        &self.slots[role.index()]
    }

    fn slot_mut(&mut self, role: TargetRole) -> &mut TargetPoint {
        &mut self.slots[role.index()]
    }

    /// The role currently holding the selection, if any
    pub fn active_role(&self) -> Option<TargetRole> {
        TargetRole::ALL
            .into_iter()
            .find(|r| self.get(*r).state.is_active())
    }

    /// First role with no position, in A-then-B order
    pub fn first_unset_role(&self) -> Option<TargetRole> {
        TargetRole::ALL
            .into_iter()
            .find(|r| !self.get(*r).state.is_set())
    }

    /// Set marker under a source-space point, nearest first
    pub fn hovered_role(&self, p: Point, radius: f64) -> Option<TargetRole> {
        TargetRole::ALL
            .into_iter()
            .filter_map(|role| {
                let pos = self.get(role).position?;
                let d = pos.distance(p);
                (d <= radius).then_some((role, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(role, _)| role)
    }

    /// Place an unset marker: `Unset → Locked`
    pub fn place(&mut self, role: TargetRole, position: Point) -> Option<SyncMessage> {
        let slot = self.slot_mut(role);
        if slot.state.is_set() {
            return None;
        }
        slot.position = Some(position);
        slot.state = TargetState::Locked;
        log::debug!("target {} placed at ({}, {})", role.label(), position.x, position.y);
        Some(SyncMessage::new(role, Some(position)))
    }

    /// Select a placed marker: `Locked → Selected`, deselecting the other
    /// role first so at most one marker is ever active
    pub fn select(&mut self, role: TargetRole) -> bool {
        if !self.get(role).state.is_set() {
            return false;
        }
        self.deselect();
        self.slot_mut(role).state = TargetState::Selected;
        true
    }

    /// Drop any selection back to `Locked`
    pub fn deselect(&mut self) {
        for slot in &mut self.slots {
            if slot.state.is_active() {
                slot.state = TargetState::Locked;
                slot.drag_origin = None;
            }
        }
    }

    /// Start dragging the selected marker: `Selected → Dragging`
    pub fn begin_drag(&mut self, role: TargetRole) -> bool {
        let slot = self.slot_mut(role);
        if slot.state != TargetState::Selected {
            return false;
        }
        slot.drag_origin = slot.position;
        slot.state = TargetState::Dragging;
        true
    }

    /// Move the dragged marker; no sync until the drag ends
    pub fn drag_to(&mut self, role: TargetRole, position: Point) {
        let slot = self.slot_mut(role);
        if slot.state == TargetState::Dragging {
            slot.position = Some(position);
        }
    }

    /// Finish a drag: lock at `position` when in bounds, otherwise revert to
    /// the drag origin
    pub fn end_drag(
        &mut self,
        role: TargetRole,
        position: Point,
        in_bounds: bool,
    ) -> Option<SyncMessage> {
        let slot = self.slot_mut(role);
        if slot.state != TargetState::Dragging {
            return None;
        }
        slot.state = TargetState::Locked;
        if in_bounds {
            slot.position = Some(position);
            slot.drag_origin = None;
            Some(SyncMessage::new(role, Some(position)))
        } else {
            slot.position = slot.drag_origin.take().or(slot.position);
            None
        }
    }

    /// Nudge the selected marker by whole source pixels, clamped to the
    /// magnifier's source rectangle; legal only from `Selected`
    pub fn nudge(
        &mut self,
        role: TargetRole,
        dx: i32,
        dy: i32,
        bounds: Rect,
    ) -> Option<SyncMessage> {
        let slot = self.slot_mut(role);
        if slot.state != TargetState::Selected {
            return None;
        }
        let current = slot.position?;
        let moved = Point::new(
            (current.x + f64::from(dx)).clamp(bounds.left as f64, (bounds.right - 1) as f64),
            (current.y + f64::from(dy)).clamp(bounds.top as f64, (bounds.bottom - 1) as f64),
        );
        if moved == current {
            return None;
        }
        slot.position = Some(moved);
        Some(SyncMessage::new(role, Some(moved)))
    }

    /// Delete a placed marker: `Locked | Selected → Unset`
    pub fn delete(&mut self, role: TargetRole) -> Option<SyncMessage> {
        let slot = self.slot_mut(role);
        if !slot.state.is_set() {
            return None;
        }
        let sibling_set = slot.sibling_set;
        *slot = TargetPoint {
            sibling_set,
            ..TargetPoint::default()
        };
        Some(SyncMessage::new(role, None))
    }

    /// Clear both markers (new frame, reset-all); one sync per role that
    /// actually changed
    pub fn reset_all(&mut self) -> Vec<SyncMessage> {
        TargetRole::ALL
            .into_iter()
            .filter_map(|role| self.delete(role))
            .collect()
    }

    /// Programmatic placement of both markers
    pub fn set_targets(
        &mut self,
        a: Option<Point>,
        b: Option<Point>,
    ) -> Vec<SyncMessage> {
        let mut out = Vec::new();
        for (role, wanted) in [(TargetRole::A, a), (TargetRole::B, b)] {
            let slot = self.slot_mut(role);
            if slot.position == wanted {
                continue;
            }
            slot.position = wanted;
            slot.state = if wanted.is_some() {
                TargetState::Locked
            } else {
                TargetState::Unset
            };
            slot.drag_origin = None;
            out.push(SyncMessage::new(role, wanted));
        }
        out
    }

    /// Apply an inbound sync message from the sibling instance
    ///
    /// Only the `sibling_set` flag is touched; a position outside plausible
    /// source bounds counts as unset.
    pub fn apply_sync(&mut self, message: &SyncMessage, source: Option<(u32, u32)>) {
        let set = match (message.position, source) {
            (None, _) => false,
            (Some(p), Some((w, h))) => {
                let plausible =
                    p.x >= 0.0 && p.y >= 0.0 && p.x < f64::from(w) && p.y < f64::from(h);
                if !plausible {
                    log::warn!(
                        "ignoring sibling sync: {}",
                        OverlayError::SyncOutOfRange {
                            x: p.x,
                            y: p.y,
                            width: w,
                            height: h,
                        }
                    );
                }
                plausible
            }
            // No frame yet on this side; trust the sibling.
            (Some(_), None) => true,
        };
        self.slot_mut(message.role).sibling_set = set;
    }

    /// Enablement for the host's context menu
    pub fn menu_enablement(&self, hovered: Option<TargetRole>) -> MenuEnablement {
        let set = |r: TargetRole| self.get(r).state.is_set();
        let paired = |r: TargetRole| set(r) && self.get(r).sibling_set;
        let set_count = TargetRole::ALL.into_iter().filter(|r| set(*r)).count();

        let add_3d_point = match hovered {
            Some(role) => paired(role),
            None => set_count == 1 && TargetRole::ALL.into_iter().any(paired),
        };
        let add_single_point = match hovered {
            Some(role) => set(role),
            None => set_count > 0,
        };
        MenuEnablement {
            add_measurement: paired(TargetRole::A) && paired(TargetRole::B),
            add_3d_point,
            add_single_point,
            delete_target: [set(TargetRole::A), set(TargetRole::B)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::new(0, 0, 300, 300)
    }

    #[test]
    fn place_only_reaches_locked_from_unset() {
        let mut model = TargetPointModel::new();
        let sync = model.place(TargetRole::A, Point::new(10.0, 20.0)).unwrap();
        assert_eq!(sync.position, Some(Point::new(10.0, 20.0)));
        assert_eq!(model.get(TargetRole::A).state, TargetState::Locked);
        // Re-placing a set marker is rejected.
        assert!(model.place(TargetRole::A, Point::new(50.0, 50.0)).is_none());
        assert_eq!(model.get(TargetRole::A).position, Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn at_most_one_marker_is_active() {
        let mut model = TargetPointModel::new();
        model.place(TargetRole::A, Point::new(1.0, 1.0));
        model.place(TargetRole::B, Point::new(2.0, 2.0));
        assert!(model.select(TargetRole::A));
        assert!(model.select(TargetRole::B));
        assert_eq!(model.get(TargetRole::A).state, TargetState::Locked);
        assert_eq!(model.get(TargetRole::B).state, TargetState::Selected);
        assert_eq!(model.active_role(), Some(TargetRole::B));
    }

    #[test]
    fn drag_out_of_bounds_reverts() {
        let mut model = TargetPointModel::new();
        model.place(TargetRole::A, Point::new(100.0, 100.0));
        model.select(TargetRole::A);
        assert!(model.begin_drag(TargetRole::A));
        model.drag_to(TargetRole::A, Point::new(250.0, 250.0));
        let sync = model.end_drag(TargetRole::A, Point::new(999.0, 999.0), false);
        assert!(sync.is_none());
        assert_eq!(model.get(TargetRole::A).position, Some(Point::new(100.0, 100.0)));
        assert_eq!(model.get(TargetRole::A).state, TargetState::Locked);
    }

    #[test]
    fn drag_in_bounds_locks_at_new_position() {
        let mut model = TargetPointModel::new();
        model.place(TargetRole::A, Point::new(100.0, 100.0));
        model.select(TargetRole::A);
        model.begin_drag(TargetRole::A);
        let sync = model
            .end_drag(TargetRole::A, Point::new(120.0, 90.0), true)
            .unwrap();
        assert_eq!(sync.position, Some(Point::new(120.0, 90.0)));
        assert_eq!(model.get(TargetRole::A).state, TargetState::Locked);
    }

    #[test]
    fn nudge_requires_selection_and_clamps() {
        let mut model = TargetPointModel::new();
        model.place(TargetRole::A, Point::new(0.0, 10.0));
        // Locked: nudging is rejected.
        assert!(model.nudge(TargetRole::A, -1, 0, window()).is_none());
        model.select(TargetRole::A);
        // Clamped at the window's left edge.
        assert!(model.nudge(TargetRole::A, -1, 0, window()).is_none());
        let sync = model.nudge(TargetRole::A, 1, 0, window()).unwrap();
        assert_eq!(sync.position, Some(Point::new(1.0, 10.0)));
    }

    #[test]
    fn reset_all_emits_one_sync_per_changed_role() {
        let mut model = TargetPointModel::new();
        model.place(TargetRole::A, Point::new(5.0, 5.0));
        let syncs = model.reset_all();
        assert_eq!(syncs.len(), 1);
        assert_eq!(syncs[0].role, TargetRole::A);
        assert_eq!(syncs[0].position, None);
        assert!(model.reset_all().is_empty());
    }

    #[test]
    fn out_of_range_sync_counts_as_unset() {
        let mut model = TargetPointModel::new();
        model.apply_sync(
            &SyncMessage::new(TargetRole::A, Some(Point::new(5000.0, 10.0))),
            Some((1920, 1080)),
        );
        assert!(!model.get(TargetRole::A).sibling_set);
        model.apply_sync(
            &SyncMessage::new(TargetRole::A, Some(Point::new(500.0, 10.0))),
            Some((1920, 1080)),
        );
        assert!(model.get(TargetRole::A).sibling_set);
    }

    #[test]
    fn menu_enablement_follows_pairing() {
        let mut model = TargetPointModel::new();
        model.place(TargetRole::A, Point::new(1.0, 1.0));
        model.apply_sync(&SyncMessage::new(TargetRole::A, Some(Point::new(2.0, 2.0))), None);
        let menu = model.menu_enablement(None);
        assert!(!menu.add_measurement);
        assert!(menu.add_3d_point);
        assert!(menu.add_single_point);
        assert_eq!(menu.delete_target, [true, false]);

        model.place(TargetRole::B, Point::new(3.0, 3.0));
        model.apply_sync(&SyncMessage::new(TargetRole::B, Some(Point::new(4.0, 4.0))), None);
        let menu = model.menu_enablement(None);
        assert!(menu.add_measurement);
        // Two roles set: 3D point needs an explicit hover.
        assert!(!menu.add_3d_point);
        assert!(model.menu_enablement(Some(TargetRole::A)).add_3d_point);
    }
}
