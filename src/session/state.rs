//! Per-camera-side overlay session
//!
//! One `OverlaySession` runs per stereo camera side. It owns the coordinate
//! frame, target model, magnifier and hover state, translates host messages
//! into component calls, and keeps the draw surface current. Its sibling on
//! the other side is reached only through an ordered sync channel; requests
//! to the host (add measurement, edit species, ...) are queued for the host
//! to drain.

use std::time::Instant;

use crossbeam_channel::Sender;
use image::RgbaImage;

use crate::config::OverlayConfig;
use crate::coords::CoordinateFrame;
use crate::domain::{
    AnnotationEvent, CameraSide, Point, Rect, ShapeCategory, ShapeOwner, ShapePart, ShapeTag,
    TagFilter, TargetRole, TargetState, VideoPosition,
};
use crate::epipolar::{self, EpipolarSpec, LineEq};
use crate::error::OverlayError;
use crate::frame::FrameSource;
use crate::magnifier::MagnifierController;
use crate::render::{HoverState, LayerFlags, render_events};
use crate::surface::{DrawCommand, DrawSurface, Shape};
use crate::targets::{MenuEnablement, TargetPointModel};

use super::messages::{
    HostRequest, LayerMsg, MenuAction, Msg, NudgeDirection, PointerButton, PointerMsg, SyncMessage,
};

/// An active primary-button press, tracked for drag detection
#[derive(Clone, Copy, Debug)]
struct PressState {
    start: Point,
    role: Option<TargetRole>,
}

/// One camera side's overlay instance
pub struct OverlaySession {
    side: CameraSide,
    config: OverlayConfig,
    frame: CoordinateFrame,
    targets: TargetPointModel,
    magnifier: MagnifierController,
    hover: HoverState,
    layers: LayerFlags,
    events: Vec<AnnotationEvent>,
    epipolar: [Option<EpipolarSpec>; 2],
    position: VideoPosition,
    sync_tx: Sender<SyncMessage>,
    requests: Vec<HostRequest>,
    press: Option<PressState>,
    last_click: Option<(Instant, ShapeTag)>,
    window_active: bool,
    menu_open: bool,
}

impl OverlaySession {
    pub fn new(side: CameraSide, config: OverlayConfig, sync_tx: Sender<SyncMessage>) -> Self {
        let frame = CoordinateFrame::new(config.magnifier_zoom);
        let magnifier = MagnifierController::new(&config);
        Self {
            side,
            config,
            frame,
            targets: TargetPointModel::new(),
            magnifier,
            hover: HoverState::default(),
            layers: LayerFlags::default(),
            events: Vec::new(),
            epipolar: [None, None],
            position: VideoPosition::default(),
            sync_tx,
            requests: Vec::new(),
            press: None,
            last_click: None,
            window_active: true,
            menu_open: false,
        }
    }

    pub fn side(&self) -> CameraSide {
        self.side
    }

    pub fn targets(&self) -> &TargetPointModel {
        &self.targets
    }

    pub fn magnifier(&self) -> &MagnifierController {
        &self.magnifier
    }

    pub fn coordinate_frame(&self) -> &CoordinateFrame {
        &self.frame
    }

    pub fn layers(&self) -> LayerFlags {
        self.layers
    }

    /// Set the video position of the displayed frame (used when filtering
    /// annotation events)
    pub fn set_position(&mut self, position: VideoPosition) {
        self.position = position;
    }

    /// Host context menu opened or closed; an open menu defers auto-hide
    pub fn set_menu_open(&mut self, open: bool) {
        self.menu_open = open;
    }

    /// Requests queued for the host since the last drain
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Context-menu enablement for the current target state
    pub fn menu_enablement(&self, hovered: Option<TargetRole>) -> MenuEnablement {
        self.targets.menu_enablement(hovered)
    }

    /// Apply an inbound sync message from the sibling instance
    pub fn apply_sync(&mut self, message: &SyncMessage) {
        self.targets.apply_sync(message, self.frame.source_size());
    }

    /// Decode fresh magnifier pixels, if no refresh is already in flight
    ///
    /// Returns `None` both when the magnifier is hidden and when the request
    /// was dropped by the single-slot gate.
    pub fn refresh_magnifier(&self, source: &dyn FrameSource) -> Option<RgbaImage> {
        if !self.magnifier.is_visible() {
            return None;
        }
        if !self.magnifier.begin_refresh() {
            log::debug!("magnifier refresh already in flight, dropping request");
            return None;
        }
        let pixels = self.magnifier.region_pixels(source);
        self.magnifier.end_refresh();
        pixels
    }

    /// Low-frequency auto-hide tick
    pub fn tick(&mut self, now: Instant, pointer_over: bool, surface: &mut dyn DrawSurface) {
        if self
            .magnifier
            .tick(now, pointer_over, self.menu_open, self.window_active)
        {
            surface.remove(&TagFilter::category(ShapeCategory::Magnifier));
        }
    }

    /// Handle one host message
    pub fn handle(&mut self, msg: Msg, surface: &mut dyn DrawSurface, now: Instant) {
        match msg {
            Msg::SetViewport { width, height } => {
                self.frame.set_viewport(width, height);
                self.redraw_all(surface);
            }
            Msg::NewFrame { width, height } => {
                self.frame.new_frame(width, height);
                let syncs = self.targets.reset_all();
                self.send_syncs(syncs);
                self.epipolar = [None, None];
                self.hover = HoverState::default();
                self.redraw_all(surface);
            }
            Msg::SetZoom(zoom) => {
                self.frame.set_zoom(zoom);
                self.redraw_magnifier(surface);
            }
            Msg::SetTargets { a, b } => {
                let syncs = self.targets.set_targets(a, b);
                self.send_syncs(syncs);
                self.redraw_targets(surface);
                self.redraw_magnifier(surface);
            }
            Msg::SetEvents(events) => {
                self.events = events;
                self.redraw_events(surface);
            }
            Msg::SetEpipolarLine {
                owner,
                line,
                channel_width,
            } => {
                self.set_epipolar(owner, line, channel_width, surface);
            }
            Msg::ResetAll => {
                let syncs = self.targets.reset_all();
                self.send_syncs(syncs);
                self.epipolar = [None, None];
                self.hover = HoverState::default();
                surface.remove(&TagFilter::category(ShapeCategory::Target));
                surface.remove(&TagFilter::category(ShapeCategory::Epipolar));
                self.redraw_magnifier(surface);
            }
            Msg::DeleteTarget(role) => {
                if let Some(sync) = self.targets.delete(role) {
                    self.send_syncs([sync]);
                }
                self.redraw_targets(surface);
                self.redraw_magnifier(surface);
            }
            Msg::Pointer(pointer) => self.handle_pointer(pointer, surface, now),
            Msg::Nudge(direction) => self.handle_nudge(direction, surface),
            Msg::Layer(layer) => self.handle_layer(layer, surface),
            Msg::Menu(action) => self.handle_menu(action),
            Msg::CloseMagnifier => {
                self.magnifier.hide();
                surface.remove(&TagFilter::category(ShapeCategory::Magnifier));
            }
            Msg::WindowActive(active) => {
                self.window_active = active;
                if !active {
                    self.magnifier.hide();
                    surface.remove(&TagFilter::category(ShapeCategory::Magnifier));
                }
            }
        }
    }

    // ========================================================================
    // Pointer protocol
    // ========================================================================

    fn handle_pointer(&mut self, pointer: PointerMsg, surface: &mut dyn DrawSurface, now: Instant) {
        match pointer {
            PointerMsg::Moved(p) => self.pointer_moved(p, surface, now),
            PointerMsg::Pressed(p, PointerButton::Primary) => {
                self.pointer_pressed(p, surface, now);
            }
            PointerMsg::Pressed(_, PointerButton::Secondary) => {}
            PointerMsg::Released(p, PointerButton::Primary) => {
                self.pointer_released(p, surface);
            }
            PointerMsg::Released(_, PointerButton::Secondary) => {}
            PointerMsg::Left => {
                self.hover.clear(surface, &self.config.palette);
            }
        }
    }

    fn pointer_moved(&mut self, p: Point, surface: &mut dyn DrawSurface, now: Instant) {
        match self.magnifier.update_at(p, &self.frame, now) {
            Ok(_) => self.redraw_magnifier(surface),
            Err(OverlayError::NotReady) => log::debug!("magnifier move deferred, frame not ready"),
            // Oversize already warned inside the controller.
            Err(_) => surface.remove(&TagFilter::category(ShapeCategory::Magnifier)),
        }

        // Promote a press on a selected marker into a drag once the pointer
        // travels far enough.
        if let Some(press) = self.press
            && let Some(role) = press.role
            && press.start.distance(p) > self.config.drag_threshold
            && let Ok(source_pos) = self.source_position(p)
        {
            if self.targets.get(role).state == TargetState::Selected {
                self.targets.begin_drag(role);
            }
            self.targets.drag_to(role, source_pos);
            self.redraw_targets(surface);
            self.redraw_magnifier(surface);
        }

        // Hover follows whatever event shape is under the pointer.
        match surface.hit_test(p, self.config.icon_radius) {
            Some(tag) if tag.category == ShapeCategory::Event => {
                self.hover.hover(surface, tag, &self.config.palette);
            }
            _ => self.hover.clear(surface, &self.config.palette),
        }
    }

    fn pointer_pressed(&mut self, p: Point, surface: &mut dyn DrawSurface, now: Instant) {
        self.magnifier.lock();
        self.magnifier.note_activity(now);

        if let Some(tag) = surface.hit_test(p, self.config.icon_radius)
            && tag.category == ShapeCategory::Event
        {
            self.register_click(tag, now);
        } else {
            self.last_click = None;
        }

        let Ok(source_pos) = self.source_position(p) else {
            log::debug!("pointer press deferred, frame not ready");
            return;
        };

        let radius = match self.frame.icon_radius_source(self.config.icon_radius) {
            Ok(r) => r,
            Err(_) => return,
        };
        let hovered = self.targets.hovered_role(source_pos, radius);

        match hovered {
            Some(role) => {
                if self.targets.get(role).state != TargetState::Selected {
                    self.targets.select(role);
                }
                self.press = Some(PressState {
                    start: p,
                    role: Some(role),
                });
            }
            None => {
                // A click away from both markers always drops the selection,
                // whether or not it also places the remaining role.
                self.targets.deselect();
                if let Some(role) = self.targets.first_unset_role()
                    && let Some(sync) = self.targets.place(role, source_pos)
                {
                    self.send_syncs([sync]);
                }
                self.press = Some(PressState {
                    start: p,
                    role: None,
                });
            }
        }
        self.redraw_targets(surface);
        self.redraw_magnifier(surface);
    }

    fn pointer_released(&mut self, p: Point, surface: &mut dyn DrawSurface) {
        let Some(press) = self.press.take() else {
            return;
        };
        if let Some(role) = press.role
            && self.targets.get(role).state == TargetState::Dragging
        {
            let (in_bounds, source_pos) = match self.source_position(p) {
                Ok(pos) => (self.source_bounds().is_some_and(|b| b.contains_point(pos)), pos),
                Err(_) => (false, Point::default()),
            };
            if let Some(sync) = self.targets.end_drag(role, source_pos, in_bounds) {
                self.send_syncs([sync]);
            }
            self.redraw_targets(surface);
            self.redraw_magnifier(surface);
        }
    }

    /// Double-click bookkeeping: a second click on the same details shape
    /// within the window asks the host to edit
    fn register_click(&mut self, tag: ShapeTag, now: Instant) {
        let double = self.last_click.is_some_and(|(at, prior)| {
            prior == tag
                && now.saturating_duration_since(at).as_millis() as u64 <= self.config.double_click_ms
        });
        if double {
            if let Some(id) = tag.event_id() {
                match tag.part {
                    ShapePart::Point | ShapePart::DimensionLine | ShapePart::Details => {
                        self.requests.push(HostRequest::EditSpecies(id));
                    }
                    ShapePart::DimensionEnd => {
                        self.requests.push(HostRequest::EditDimension(id));
                    }
                    _ => {}
                }
            }
            self.last_click = None;
        } else {
            self.last_click = Some((now, tag));
        }
    }

    fn handle_nudge(&mut self, direction: NudgeDirection, surface: &mut dyn DrawSurface) {
        let Some(role) = self.targets.active_role() else {
            return;
        };
        let bounds = self
            .magnifier
            .placement()
            .map(|placement| placement.source)
            .or_else(|| self.source_bounds());
        let Some(bounds) = bounds else {
            return;
        };
        let (dx, dy) = direction.delta();
        if let Some(sync) = self.targets.nudge(role, dx, dy, bounds) {
            self.send_syncs([sync]);
            self.redraw_targets(surface);
            self.redraw_magnifier(surface);
        }
    }

    /// Translate a chosen menu entry into a host request
    ///
    /// Enablement is re-checked here; a stale menu entry that no longer
    /// passes is dropped with a log instead of surfacing upward.
    fn handle_menu(&mut self, action: MenuAction) {
        let request = match action {
            MenuAction::AddMeasurement => self
                .targets
                .menu_enablement(None)
                .add_measurement
                .then_some(HostRequest::AddMeasurement),
            MenuAction::AddThreeDPoint(role) => self
                .targets
                .menu_enablement(Some(role))
                .add_3d_point
                .then_some(HostRequest::AddThreeDPoint(role)),
            MenuAction::AddSinglePoint(role) => self
                .targets
                .menu_enablement(Some(role))
                .add_single_point
                .then_some(HostRequest::AddSinglePoint(role)),
            MenuAction::DeleteAnnotation(id) => Some(HostRequest::DeleteAnnotation(id)),
        };
        match request {
            Some(request) => self.requests.push(request),
            None => log::debug!("menu action {action:?} no longer enabled, dropping"),
        }
    }

    fn handle_layer(&mut self, layer: LayerMsg, surface: &mut dyn DrawSurface) {
        match layer {
            LayerMsg::Events(show) => {
                self.layers.events = show;
                self.redraw_events(surface);
            }
            LayerMsg::EventDetails(show) => {
                self.layers.details = show;
                self.redraw_events(surface);
            }
            LayerMsg::Epipolar(show) => {
                self.layers.epipolar = show;
                for role in TargetRole::ALL {
                    self.redraw_epipolar(role, surface);
                }
                self.redraw_magnifier(surface);
            }
        }
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    fn redraw_all(&mut self, surface: &mut dyn DrawSurface) {
        self.redraw_targets(surface);
        for role in TargetRole::ALL {
            self.redraw_epipolar(role, surface);
        }
        self.redraw_events(surface);
        self.redraw_magnifier(surface);
    }

    fn redraw_events(&mut self, surface: &mut dyn DrawSurface) {
        self.hover = HoverState::default();
        if let Err(err) = render_events(
            surface,
            &self.events,
            self.side,
            self.position,
            &self.frame,
            &self.layers,
            &self.config,
        ) {
            log::debug!("event render deferred: {err}");
        }
    }

    fn redraw_targets(&mut self, surface: &mut dyn DrawSurface) {
        surface.remove(&TagFilter::category(ShapeCategory::Target));
        if !self.frame.is_ready() {
            return;
        }
        let palette = self.config.palette;
        for role in TargetRole::ALL {
            let slot = self.targets.get(role);
            let Some(position) = slot.position else {
                continue;
            };
            let Ok(center) = self.frame.to_display(position) else {
                continue;
            };
            let color = if slot.state.is_active() {
                palette.highlight
            } else if role == TargetRole::A {
                palette.target_a
            } else {
                palette.target_b
            };
            surface.draw(DrawCommand {
                shape: Shape::Dot {
                    center,
                    radius: self.config.icon_radius,
                },
                color,
                filled: false,
                tag: ShapeTag::target(ShapePart::Icon, role),
            });
            surface.draw(DrawCommand {
                shape: Shape::Text {
                    anchor: Point::new(center.x + self.config.icon_radius + 2.0, center.y),
                    content: role.label().to_string(),
                },
                color: palette.text,
                filled: false,
                tag: ShapeTag::target(ShapePart::Label, role),
            });
        }
    }

    fn set_epipolar(
        &mut self,
        owner: TargetRole,
        line: LineEq,
        channel_width: f64,
        surface: &mut dyn DrawSurface,
    ) {
        if channel_width < 0.0 {
            self.epipolar[owner.index()] = None;
        } else {
            self.epipolar[owner.index()] = Some(EpipolarSpec {
                owner,
                line,
                channel_width,
            });
        }
        self.redraw_epipolar(owner, surface);
        self.redraw_magnifier(surface);
    }

    /// Redraw one owner's epipolar geometry; prior shapes are removed by tag
    /// first so polygons never accumulate
    fn redraw_epipolar(&mut self, owner: TargetRole, surface: &mut dyn DrawSurface) {
        surface.remove(&TagFilter::owned(
            ShapeCategory::Epipolar,
            ShapeOwner::Role(owner),
        ));
        if !self.layers.epipolar {
            return;
        }
        let Some(spec) = self.epipolar[owner.index()] else {
            return;
        };
        let Some((width, height)) = self.frame.source_size() else {
            log::debug!("epipolar draw deferred, no frame yet");
            return;
        };
        let palette = self.config.palette;
        if spec.channel_width == 0.0 {
            match epipolar::clip_segment(&spec.line, width, height) {
                Ok(Some((a, b))) => {
                    let (Ok(from), Ok(to)) = (self.frame.to_display(a), self.frame.to_display(b))
                    else {
                        return;
                    };
                    surface.draw(DrawCommand {
                        shape: Shape::Line {
                            from,
                            to,
                            stroke: 1.0,
                        },
                        color: palette.epipolar,
                        filled: false,
                        tag: ShapeTag::epipolar(ShapePart::Guide, owner),
                    });
                }
                Ok(None) => log::debug!("epipolar line misses the viewport"),
                Err(err) => log::warn!("epipolar line for {}: {err}", owner.label()),
            }
        } else {
            match epipolar::corridor_polygons(&spec.line, spec.channel_width, width, height) {
                Ok((first, second)) => {
                    for (index, polygon) in [first, second].into_iter().enumerate() {
                        if polygon.len() < 3 {
                            continue;
                        }
                        let points: Result<Vec<Point>, _> = polygon
                            .into_iter()
                            .map(|p| self.frame.to_display(p))
                            .collect();
                        let Ok(points) = points else {
                            return;
                        };
                        surface.draw(DrawCommand {
                            shape: Shape::Polygon { points },
                            color: palette.corridor_shade,
                            filled: true,
                            tag: ShapeTag::epipolar(ShapePart::Shade(index as u8), owner),
                        });
                    }
                }
                Err(err) => log::warn!("epipolar corridor for {}: {err}", owner.label()),
            }
        }
    }

    /// Re-project targets and epipolar geometry into magnifier space
    fn redraw_magnifier(&mut self, surface: &mut dyn DrawSurface) {
        surface.remove(&TagFilter::category(ShapeCategory::Magnifier));
        let Some(placement) = self.magnifier.placement() else {
            return;
        };
        if !self.magnifier.is_visible() {
            return;
        }
        for command in self.magnifier.chrome(&self.config.palette) {
            surface.draw(command);
        }

        let palette = self.config.palette;
        for role in TargetRole::ALL {
            let Some(position) = self.targets.get(role).position else {
                continue;
            };
            // Outside the magnified region the marker is hidden, not deleted.
            let Ok(Some(center)) = self.magnifier.project(position, &self.frame) else {
                continue;
            };
            let color = if self.targets.get(role).state.is_active() {
                palette.highlight
            } else if role == TargetRole::A {
                palette.target_a
            } else {
                palette.target_b
            };
            surface.draw(DrawCommand {
                shape: Shape::Dot {
                    center,
                    radius: self.config.icon_radius,
                },
                color,
                filled: false,
                tag: ShapeTag::new(
                    ShapeCategory::Magnifier,
                    ShapePart::Icon,
                    ShapeOwner::Role(role),
                ),
            });
        }

        if self.layers.epipolar {
            for role in TargetRole::ALL {
                let Some(spec) = self.epipolar[role.index()] else {
                    continue;
                };
                self.draw_magnifier_epipolar(&spec, placement.source, surface);
            }
        }
    }

    /// Transform an epipolar line into magnifier coordinates and clip it
    /// against the magnifier window
    fn draw_magnifier_epipolar(
        &self,
        spec: &EpipolarSpec,
        source: Rect,
        surface: &mut dyn DrawSurface,
    ) {
        let zoom = self.frame.zoom();
        let origin = source.origin();
        // ax + by + c = 0 under x = x'/zoom + ox, y = y'/zoom + oy.
        let local = LineEq::new(
            spec.line.a / zoom,
            spec.line.b / zoom,
            spec.line.a * origin.x + spec.line.b * origin.y + spec.line.c,
        );
        let window_w = (source.width() as f64 * zoom) as u32;
        let window_h = (source.height() as f64 * zoom) as u32;
        match epipolar::clip_segment(&local, window_w, window_h) {
            Ok(Some((from, to))) => {
                surface.draw(DrawCommand {
                    shape: Shape::Line {
                        from,
                        to,
                        stroke: 1.0,
                    },
                    color: self.config.palette.epipolar,
                    filled: false,
                    tag: ShapeTag::new(
                        ShapeCategory::Magnifier,
                        ShapePart::Guide,
                        ShapeOwner::Role(spec.owner),
                    ),
                });
            }
            Ok(None) => {}
            Err(err) => log::warn!("magnifier epipolar for {}: {err}", spec.owner.label()),
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn source_position(&self, display: Point) -> Result<Point, OverlayError> {
        // A pointer inside the magnifier window addresses magnified pixels.
        if let Some(placement) = self.magnifier.placement()
            && self.magnifier.is_visible()
            && placement.screen.contains_point(display)
        {
            let local = Point::new(
                display.x - placement.screen.left as f64,
                display.y - placement.screen.top as f64,
            );
            return self.frame.from_magnifier(local, placement.source.origin());
        }
        self.frame.to_source(display)
    }

    fn source_bounds(&self) -> Option<Rect> {
        let (w, h) = self.frame.source_size()?;
        Some(Rect::new(0, 0, w as i32, h as i32))
    }

    fn send_syncs(&self, messages: impl IntoIterator<Item = SyncMessage>) {
        for message in messages {
            if self.sync_tx.send(message).is_err() {
                log::warn!("sibling sync channel closed, dropping message");
            }
        }
    }
}
