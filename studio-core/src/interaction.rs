//! # Pointer Interaction
//!
//! Finite-state machine turning pointer events into layer transforms.
//!
//! ```text
//!            down on layer ──► Moving ─────┐
//!            down on corner ─► Resizing ───┤
//!   Idle ──► down on rotate ─► Rotating ───┼── up ──► Commit, Idle
//!            down on canvas ─► MarqueeSelecting
//!            down on guide ──► GuideDragging
//!            pan tool / mid ─► Panning ────┘
//!   any state ── cancel ──► Idle (nothing committed)
//! ```
//!
//! While a gesture is active every move recomputes *ephemeral* geometry from
//! the geometry captured at press time. Nothing reaches the page until the
//! release, which yields a single [`Commit`] for the caller to apply as one
//! history step.

use serde::{Deserialize, Serialize};

use crate::{
    Bounds, EditorConfig, Geometry, GuideAxis, Layer, LayerId, LayerPatch, LayerVariant, Page,
    Point, PointerEvent, PointerTarget, Selection, ShapeType, Viewport,
};

/// A corner resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    /// Top-left.
    Tl,
    /// Top-right.
    Tr,
    /// Bottom-left.
    Bl,
    /// Bottom-right.
    Br,
}

impl ResizeHandle {
    /// Every handle.
    pub const ALL: [Self; 4] = [Self::Tl, Self::Tr, Self::Bl, Self::Br];

    /// Whether this handle drags the left edge.
    #[must_use]
    pub const fn moves_left(self) -> bool {
        matches!(self, Self::Tl | Self::Bl)
    }

    /// Whether this handle drags the top edge.
    #[must_use]
    pub const fn moves_top(self) -> bool {
        matches!(self, Self::Tl | Self::Tr)
    }

    /// Page-space position of this handle on a (possibly rotated) layer.
    #[must_use]
    pub fn position(self, geometry: &Geometry) -> Point {
        let b = geometry.bounds();
        let x = if self.moves_left() { b.x1 } else { b.x2 };
        let y = if self.moves_top() { b.y1 } else { b.y2 };
        geometry.to_page(Point::new(x, y))
    }
}

/// Page-space position of the rotate handle, `offset` above the top edge.
#[must_use]
pub fn rotate_handle_position(geometry: &Geometry, offset: f32) -> Point {
    let b = geometry.bounds();
    geometry.to_page(Point::new((b.x1 + b.x2) / 2.0, b.y1 - offset))
}

/// Active editor tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum Tool {
    /// Select and transform layers.
    #[default]
    Select,
    /// Drag to pan the view.
    Pan,
    /// Click to place a text layer.
    Text,
    /// Click to place a shape layer.
    Shape {
        /// Primitive to place.
        shape: ShapeType,
    },
}

/// Discriminant of [`InteractionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// No gesture in progress.
    Idle,
    /// Dragging layers.
    Moving,
    /// Dragging a corner handle.
    Resizing,
    /// Dragging the rotate handle.
    Rotating,
    /// Rubber-band selection.
    MarqueeSelecting,
    /// Panning the view.
    Panning,
    /// Dragging an alignment guide.
    GuideDragging,
}

/// Gesture state, including everything captured at press time.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// Dragging layers.
    Moving {
        /// Page-space press position.
        start: Point,
        /// Every captured layer with its geometry at press time.
        initial: Vec<(LayerId, Geometry)>,
    },
    /// Dragging a corner handle.
    Resizing {
        /// Page-space press position.
        start: Point,
        /// Target layer.
        id: LayerId,
        /// Target layer's variant, deciding whether aspect-lock applies.
        variant: LayerVariant,
        /// Corner being dragged.
        handle: ResizeHandle,
        /// Geometry at press time.
        initial: Geometry,
    },
    /// Dragging the rotate handle.
    Rotating {
        /// Target layer.
        id: LayerId,
        /// Geometry at press time.
        initial: Geometry,
        /// Layer center at press time.
        center: Point,
        /// Pointer angle around `center` at press time, in degrees.
        start_angle: f32,
    },
    /// Rubber-band selection.
    MarqueeSelecting {
        /// Page-space press position.
        start: Point,
        /// Page-space current position.
        current: Point,
        /// Whether hits are added to the existing selection.
        additive: bool,
    },
    /// Panning the view.
    Panning {
        /// Screen-space press position.
        start: Point,
        /// Pan offset at press time.
        origin: (f32, f32),
        /// Pan offset to display now.
        current: (f32, f32),
    },
    /// Dragging an alignment guide.
    GuideDragging {
        /// Guide orientation.
        axis: GuideAxis,
        /// Index of the guide on its axis.
        index: usize,
        /// Offset to display now.
        offset: f32,
    },
}

impl InteractionState {
    /// The discriminant.
    #[must_use]
    pub const fn kind(&self) -> InteractionKind {
        match self {
            Self::Idle => InteractionKind::Idle,
            Self::Moving { .. } => InteractionKind::Moving,
            Self::Resizing { .. } => InteractionKind::Resizing,
            Self::Rotating { .. } => InteractionKind::Rotating,
            Self::MarqueeSelecting { .. } => InteractionKind::MarqueeSelecting,
            Self::Panning { .. } => InteractionKind::Panning,
            Self::GuideDragging { .. } => InteractionKind::GuideDragging,
        }
    }
}

/// What a completed gesture asks the owner of the page to apply.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Commit {
    /// Nothing to apply.
    None,
    /// Geometry updates, to be applied as one atomic multi-update.
    Layers(Vec<(LayerId, LayerPatch)>),
    /// Replace (or extend) the selection.
    Select {
        /// Layers inside the marquee.
        ids: Vec<LayerId>,
        /// Add to the current selection instead of replacing it.
        additive: bool,
    },
    /// Move a guide; offsets outside the page remove it.
    Guide {
        /// Guide orientation.
        axis: GuideAxis,
        /// Index of the guide on its axis.
        index: usize,
        /// Final offset.
        offset: f32,
    },
}

/// Read-only surroundings a gesture is computed against.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    /// The committed page.
    pub page: &'a Page,
    /// Current view transform.
    pub viewport: &'a Viewport,
    /// Editor configuration.
    pub config: &'a EditorConfig,
}

/// Compute the geometry for a corner drag.
///
/// The edge opposite the dragged corner stays fixed. With `aspect_lock` the
/// dominant axis drives and the other dimension follows the original ratio.
/// Width and height never drop below `min_size`, and a locked resize keeps
/// its ratio at the floor too.
#[must_use]
pub fn resize_geometry(
    initial: &Geometry,
    handle: ResizeHandle,
    dx: f32,
    dy: f32,
    aspect_lock: bool,
    min_size: f32,
) -> Geometry {
    let mut width = if handle.moves_left() {
        initial.width - dx
    } else {
        initial.width + dx
    };
    let mut height = if handle.moves_top() {
        initial.height - dy
    } else {
        initial.height + dy
    };

    if aspect_lock && initial.height > 0.0 && initial.width > 0.0 {
        let ratio = initial.width / initial.height;
        let width_change = (width - initial.width).abs() / initial.width;
        let height_change = (height - initial.height).abs() / initial.height;
        if width_change >= height_change {
            height = width / ratio;
        } else {
            width = height * ratio;
        }
        // Smallest size with the original ratio that clears the floor.
        if width < min_size || height < min_size {
            (width, height) = if ratio >= 1.0 {
                (min_size * ratio, min_size)
            } else {
                (min_size, min_size / ratio)
            };
        }
    } else {
        width = width.max(min_size);
        height = height.max(min_size);
    }

    let left = if handle.moves_left() {
        initial.left + initial.width - width
    } else {
        initial.left
    };
    let top = if handle.moves_top() {
        initial.top + initial.height - height
    } else {
        initial.top
    };

    Geometry {
        left,
        top,
        width,
        height,
        rotation: initial.rotation,
    }
}

/// Compute the rotation for a rotate-handle drag.
///
/// `snap` rounds the result to the nearest multiple of `snap_degrees`.
#[must_use]
pub fn rotate_angle(
    initial_rotation: f32,
    start_angle: f32,
    current_angle: f32,
    snap: Option<f32>,
) -> f32 {
    let rotation = initial_rotation + (current_angle - start_angle);
    match snap {
        Some(step) if step > 0.0 => (rotation / step).round() * step,
        _ => rotation,
    }
}

/// Layers a marquee covers: visible, unlocked, bounding box overlapping.
#[must_use]
pub fn marquee_hits(page: &Page, marquee: &Bounds) -> Vec<LayerId> {
    let mut ids = Vec::new();
    for layer in page.all_layers() {
        if layer.is_interactive() && layer.geometry.bounds().intersects(marquee) {
            for id in selection_unit(page, layer) {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
    }
    ids
}

/// The ids that pressing `layer` selects: its whole group, or just itself.
fn selection_unit(page: &Page, layer: &Layer) -> Vec<LayerId> {
    match layer.group_id.filter(|g| page.group(*g).is_some()) {
        Some(group) => {
            let members: Vec<_> = page
                .all_layers()
                .filter(|l| l.group_id == Some(group) && !l.is_locked)
                .map(|l| l.id)
                .collect();
            if members.contains(&layer.id) {
                members
            } else {
                vec![layer.id]
            }
        }
        None => vec![layer.id],
    }
}

/// The pointer-driven transform state machine.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: InteractionState,
    /// Uncommitted geometry for captured layers, in capture order.
    ephemeral: Vec<(LayerId, Geometry)>,
}

impl InteractionController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Current state's discriminant.
    #[must_use]
    pub const fn kind(&self) -> InteractionKind {
        self.state.kind()
    }

    /// Whether no gesture is in progress.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    /// Uncommitted geometry of every captured layer.
    #[must_use]
    pub fn ephemeral(&self) -> &[(LayerId, Geometry)] {
        &self.ephemeral
    }

    /// Uncommitted geometry of one layer.
    #[must_use]
    pub fn ephemeral_geometry(&self, id: LayerId) -> Option<Geometry> {
        self.ephemeral
            .iter()
            .find(|(eid, _)| *eid == id)
            .map(|(_, g)| *g)
    }

    /// Current marquee rectangle in page space.
    #[must_use]
    pub fn marquee(&self) -> Option<Bounds> {
        match self.state {
            InteractionState::MarqueeSelecting { start, current, .. } => {
                Some(Bounds::from_corners(start, current))
            }
            _ => None,
        }
    }

    /// Guide being dragged and where to draw it.
    #[must_use]
    pub fn guide_preview(&self) -> Option<(GuideAxis, usize, f32)> {
        match self.state {
            InteractionState::GuideDragging {
                axis,
                index,
                offset,
            } => Some((axis, index, offset)),
            _ => None,
        }
    }

    /// Pan offset to display while panning.
    #[must_use]
    pub fn pan(&self) -> Option<(f32, f32)> {
        match self.state {
            InteractionState::Panning { current, .. } => Some(current),
            _ => None,
        }
    }

    /// The page as it should be drawn mid-gesture, if it differs.
    #[must_use]
    pub fn preview(&self, page: &Page) -> Option<Page> {
        if self.ephemeral.is_empty() {
            return None;
        }
        let updates: Vec<_> = self
            .ephemeral
            .iter()
            .map(|(id, g)| (*id, LayerPatch::geometry(*g)))
            .collect();
        page.update_layers(&updates)
    }

    /// What lies under a screen point.
    ///
    /// Handles of a single selected, interactive layer win over layer
    /// bodies; guides are only hit where no layer is.
    #[must_use]
    pub fn hit_test(
        &self,
        cx: &InteractionContext<'_>,
        selection: &Selection,
        screen: Point,
    ) -> PointerTarget {
        let point = cx.viewport.to_page(screen);
        let radius = cx.viewport.page_distance(cx.config.handle_radius);

        if let Some(layer) = selection.single(cx.page).filter(|l| l.is_interactive()) {
            let g = &layer.geometry;
            let offset = cx.viewport.page_distance(cx.config.rotate_handle_offset);
            if point.distance_to(rotate_handle_position(g, offset)) <= radius {
                return PointerTarget::RotateHandle { id: layer.id };
            }
            if let Some(handle) = ResizeHandle::ALL
                .into_iter()
                .find(|h| point.distance_to(h.position(g)) <= radius)
            {
                return PointerTarget::ResizeHandle {
                    id: layer.id,
                    handle,
                };
            }
        }

        if let Some(layer) = cx.page.layer_at(point) {
            return PointerTarget::Layer { id: layer.id };
        }

        for axis in [GuideAxis::Horizontal, GuideAxis::Vertical] {
            let coordinate = match axis {
                GuideAxis::Horizontal => point.y,
                GuideAxis::Vertical => point.x,
            };
            if let Some(index) = cx
                .page
                .guides(axis)
                .iter()
                .position(|offset| (coordinate - offset).abs() <= radius)
            {
                return PointerTarget::Guide { axis, index };
            }
        }

        PointerTarget::Canvas
    }

    /// Handle a press. Returns whether a gesture started.
    ///
    /// Presses on locked layers start nothing and leave the selection alone.
    /// Creation tools are the caller's business; only select and pan
    /// gestures are started here.
    pub fn pointer_down(
        &mut self,
        cx: &InteractionContext<'_>,
        selection: &mut Selection,
        tool: Tool,
        event: &PointerEvent,
    ) -> bool {
        if !self.is_idle() {
            tracing::warn!(
                "Pointer down during {:?}; discarding the previous gesture",
                self.kind()
            );
            let _ = self.cancel();
        }

        if event.button == 1 || tool == Tool::Pan {
            let origin = (cx.viewport.pan_x, cx.viewport.pan_y);
            return self.begin(InteractionState::Panning {
                start: event.position(),
                origin,
                current: origin,
            });
        }
        if tool != Tool::Select || event.button != 0 {
            return false;
        }

        let point = cx.viewport.to_page(event.position());
        let target = event
            .target
            .unwrap_or_else(|| self.hit_test(cx, selection, event.position()));

        match target {
            PointerTarget::Canvas => {
                let additive = event.modifiers.shift;
                if !additive {
                    selection.clear();
                }
                self.begin(InteractionState::MarqueeSelecting {
                    start: point,
                    current: point,
                    additive,
                })
            }
            PointerTarget::Layer { id } => {
                self.press_layer(cx.page, selection, id, point, event.modifiers.shift)
            }
            PointerTarget::ResizeHandle { id, handle } => {
                let Some(layer) = cx.page.layer(id).filter(|l| !l.is_locked) else {
                    return false;
                };
                self.begin(InteractionState::Resizing {
                    start: point,
                    id,
                    variant: layer.variant(),
                    handle,
                    initial: layer.geometry,
                })
            }
            PointerTarget::RotateHandle { id } => {
                let Some(layer) = cx.page.layer(id).filter(|l| !l.is_locked) else {
                    return false;
                };
                let center = layer.geometry.center();
                self.begin(InteractionState::Rotating {
                    id,
                    initial: layer.geometry,
                    center,
                    start_angle: point.angle_from(center),
                })
            }
            PointerTarget::Guide { axis, index } => {
                let Some(&offset) = cx.page.guides(axis).get(index) else {
                    return false;
                };
                self.begin(InteractionState::GuideDragging {
                    axis,
                    index,
                    offset,
                })
            }
        }
    }

    fn press_layer(
        &mut self,
        page: &Page,
        selection: &mut Selection,
        id: LayerId,
        point: Point,
        shift: bool,
    ) -> bool {
        let Some(layer) = page.layer(id) else {
            return false;
        };
        if layer.is_locked {
            tracing::debug!("Press on locked layer {id} ignored");
            return false;
        }

        let unit = selection_unit(page, layer);
        if shift {
            if selection.contains(id) {
                for member in unit {
                    if selection.contains(member) {
                        selection.toggle(member);
                    }
                }
                return false;
            }
            for member in unit {
                if !selection.contains(member) {
                    selection.toggle(member);
                }
            }
        } else if !selection.contains(id) {
            selection.select(unit);
        }

        let mut initial: Vec<(LayerId, Geometry)> = selection
            .layers(page)
            .filter(|l| !l.is_locked)
            .map(|l| (l.id, l.geometry))
            .collect();
        if !initial.iter().any(|(captured, _)| *captured == id) {
            initial.push((id, layer.geometry));
        }
        self.begin(InteractionState::Moving {
            start: point,
            initial,
        })
    }

    fn begin(&mut self, state: InteractionState) -> bool {
        tracing::debug!("Interaction {:?} -> {:?}", self.kind(), state.kind());
        self.state = state;
        self.ephemeral.clear();
        true
    }

    /// Handle a move. Returns whether anything displayed changed.
    pub fn pointer_move(&mut self, cx: &InteractionContext<'_>, event: &PointerEvent) -> bool {
        let point = cx.viewport.to_page(event.position());
        match &mut self.state {
            InteractionState::Idle => false,
            InteractionState::Moving { start, initial } => {
                let (dx, dy) = (point.x - start.x, point.y - start.y);
                self.ephemeral = initial
                    .iter()
                    .map(|(id, g)| (*id, g.translated(dx, dy)))
                    .collect();
                true
            }
            InteractionState::Resizing {
                start,
                id,
                variant,
                handle,
                initial,
            } => {
                let aspect_lock = event.modifiers.shift && variant.supports_aspect_lock();
                let geometry = resize_geometry(
                    initial,
                    *handle,
                    point.x - start.x,
                    point.y - start.y,
                    aspect_lock,
                    cx.config.min_layer_size,
                );
                self.ephemeral = vec![(*id, geometry)];
                true
            }
            InteractionState::Rotating {
                id,
                initial,
                center,
                start_angle,
            } => {
                let snap = event
                    .modifiers
                    .shift
                    .then_some(cx.config.rotation_snap_degrees);
                let rotation =
                    rotate_angle(initial.rotation, *start_angle, point.angle_from(*center), snap);
                self.ephemeral = vec![(*id, initial.with_rotation(rotation))];
                true
            }
            InteractionState::MarqueeSelecting { current, .. } => {
                *current = point;
                true
            }
            InteractionState::Panning {
                start,
                origin,
                current,
            } => {
                *current = (
                    origin.0 + (event.x - start.x),
                    origin.1 + (event.y - start.y),
                );
                true
            }
            InteractionState::GuideDragging { axis, offset, .. } => {
                *offset = match axis {
                    GuideAxis::Horizontal => point.y,
                    GuideAxis::Vertical => point.x,
                };
                true
            }
        }
    }

    /// Handle a release: finish the gesture and return what to commit.
    pub fn pointer_up(&mut self, cx: &InteractionContext<'_>, event: &PointerEvent) -> Commit {
        if self.is_idle() {
            return Commit::None;
        }
        self.pointer_move(cx, event);

        let state = std::mem::take(&mut self.state);
        let ephemeral = std::mem::take(&mut self.ephemeral);
        tracing::debug!("Interaction {:?} -> Idle (release)", state.kind());

        match state {
            InteractionState::Moving { .. }
            | InteractionState::Resizing { .. }
            | InteractionState::Rotating { .. } => {
                if ephemeral.is_empty() {
                    Commit::None
                } else {
                    Commit::Layers(
                        ephemeral
                            .into_iter()
                            .map(|(id, g)| (id, LayerPatch::geometry(g)))
                            .collect(),
                    )
                }
            }
            InteractionState::MarqueeSelecting {
                start,
                current,
                additive,
            } => Commit::Select {
                ids: marquee_hits(cx.page, &Bounds::from_corners(start, current)),
                additive,
            },
            InteractionState::GuideDragging {
                axis,
                index,
                offset,
            } => Commit::Guide {
                axis,
                index,
                offset,
            },
            InteractionState::Panning { .. } | InteractionState::Idle => Commit::None,
        }
    }

    /// Abandon the gesture without committing. Returns the discarded state.
    pub fn cancel(&mut self) -> InteractionState {
        self.ephemeral.clear();
        let state = std::mem::take(&mut self.state);
        if !matches!(state, InteractionState::Idle) {
            tracing::debug!("Interaction {:?} cancelled", state.kind());
        }
        state
    }

    /// Cancel the gesture if anything it captured is gone from `page`.
    ///
    /// Returns whether the gesture was discarded.
    pub fn discard_if_stale(&mut self, page: &Page) -> bool {
        let stale = match &self.state {
            InteractionState::Moving { initial, .. } => {
                initial.iter().any(|(id, _)| !page.contains_layer(*id))
            }
            InteractionState::Resizing { id, .. } | InteractionState::Rotating { id, .. } => {
                !page.contains_layer(*id)
            }
            InteractionState::GuideDragging { axis, index, .. } => {
                *index >= page.guides(*axis).len()
            }
            InteractionState::Idle
            | InteractionState::MarqueeSelecting { .. }
            | InteractionState::Panning { .. } => false,
        };
        if stale {
            tracing::warn!(
                "Discarding {:?} gesture: captured layers no longer exist",
                self.kind()
            );
            let _ = self.cancel();
        }
        stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyModifiers;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    struct Fixture {
        page: Page,
        viewport: Viewport,
        config: EditorConfig,
        selection: Selection,
        controller: InteractionController,
    }

    impl Fixture {
        fn new(layers: Vec<Layer>) -> Self {
            let mut page = Page::new(1000.0, 1000.0);
            for layer in layers {
                page = page.add_layer(layer).expect("fresh id");
            }
            Self {
                page,
                viewport: Viewport::default(),
                config: EditorConfig::default(),
                selection: Selection::new(),
                controller: InteractionController::new(),
            }
        }

        fn down(&mut self, event: PointerEvent) -> bool {
            let cx = InteractionContext {
                page: &self.page,
                viewport: &self.viewport,
                config: &self.config,
            };
            self.controller
                .pointer_down(&cx, &mut self.selection, Tool::Select, &event)
        }

        fn drag(&mut self, event: PointerEvent) {
            let cx = InteractionContext {
                page: &self.page,
                viewport: &self.viewport,
                config: &self.config,
            };
            self.controller.pointer_move(&cx, &event);
        }

        fn up(&mut self, event: PointerEvent) -> Commit {
            let cx = InteractionContext {
                page: &self.page,
                viewport: &self.viewport,
                config: &self.config,
            };
            self.controller.pointer_up(&cx, &event)
        }
    }

    #[test]
    fn test_resize_right_edge_grows_width() {
        let g = Geometry::new(10.0, 10.0, 100.0, 50.0);
        let out = resize_geometry(&g, ResizeHandle::Br, 30.0, 5.0, false, 20.0);
        assert!(approx(out.left, 10.0) && approx(out.top, 10.0));
        assert!(approx(out.width, 130.0) && approx(out.height, 55.0));
    }

    #[test]
    fn test_resize_left_edge_keeps_right_edge() {
        let g = Geometry::new(10.0, 10.0, 100.0, 50.0);
        let out = resize_geometry(&g, ResizeHandle::Tl, 30.0, 10.0, false, 20.0);
        assert!(approx(out.left, 40.0));
        assert!(approx(out.width, 70.0));
        assert!(approx(out.left + out.width, 110.0));
        assert!(approx(out.top + out.height, 60.0));
    }

    #[test]
    fn test_resize_clamps_to_floor() {
        let g = Geometry::new(0.0, 0.0, 100.0, 100.0);
        let out = resize_geometry(&g, ResizeHandle::Br, -500.0, -95.0, false, 20.0);
        assert!(approx(out.width, 20.0) && approx(out.height, 20.0));

        let out = resize_geometry(&g, ResizeHandle::Tl, 500.0, 500.0, false, 20.0);
        assert!(approx(out.width, 20.0));
        assert!(approx(out.left, 80.0), "right edge stays anchored");
    }

    #[test]
    fn test_resize_aspect_lock() {
        let g = Geometry::new(0.0, 0.0, 200.0, 100.0);
        let out = resize_geometry(&g, ResizeHandle::Br, 100.0, 0.0, true, 20.0);
        assert!(approx(out.width, 300.0));
        assert!(approx(out.height, 150.0));
    }

    #[test]
    fn test_resize_aspect_lock_top_left_anchors_bottom_right() {
        let g = Geometry::new(100.0, 100.0, 200.0, 100.0);
        let out = resize_geometry(&g, ResizeHandle::Tl, -100.0, 0.0, true, 20.0);
        assert!(approx(out.width, 300.0) && approx(out.height, 150.0));
        assert!(approx(out.left + out.width, 300.0));
        assert!(approx(out.top + out.height, 200.0));
    }

    #[test]
    fn test_resize_aspect_lock_keeps_ratio_at_floor() {
        let tall = Geometry::new(0.0, 0.0, 100.0, 200.0);
        let out = resize_geometry(&tall, ResizeHandle::Br, -95.0, 0.0, true, 20.0);
        assert!(approx(out.width, 20.0) && approx(out.height, 40.0));

        let wide = Geometry::new(0.0, 0.0, 300.0, 100.0);
        let out = resize_geometry(&wide, ResizeHandle::Tl, 1000.0, 0.0, true, 20.0);
        assert!(approx(out.width, 60.0) && approx(out.height, 20.0));
        assert!(approx(out.left + out.width, 300.0));
        assert!(approx(out.top + out.height, 100.0));
    }

    #[test]
    fn test_rotate_snap() {
        assert!(approx(rotate_angle(0.0, 0.0, 47.0, Some(15.0)), 45.0));
        assert!(approx(rotate_angle(0.0, 0.0, 47.0, None), 47.0));
        assert!(approx(rotate_angle(10.0, 90.0, 120.0, None), 40.0));
    }

    #[test]
    fn test_press_and_drag_moves_layer() {
        let layer = Layer::shape(ShapeType::Rectangle, Geometry::new(100.0, 100.0, 50.0, 50.0));
        let id = layer.id;
        let mut fx = Fixture::new(vec![layer]);

        assert!(fx.down(PointerEvent::down(120.0, 120.0)));
        assert_eq!(fx.controller.kind(), InteractionKind::Moving);
        assert!(fx.selection.contains(id));

        fx.drag(PointerEvent::moved(150.0, 100.0));
        let g = fx.controller.ephemeral_geometry(id).expect("captured");
        assert!(approx(g.left, 130.0) && approx(g.top, 80.0));
        // Page untouched until release.
        assert!(approx(fx.page.layer(id).expect("layer").geometry.left, 100.0));

        let Commit::Layers(updates) = fx.up(PointerEvent::up(150.0, 100.0)) else {
            panic!("expected layer commit");
        };
        assert_eq!(updates.len(), 1);
        assert!(fx.controller.is_idle());
        assert!(fx.controller.ephemeral().is_empty());
    }

    #[test]
    fn test_locked_layer_ignores_press() {
        let layer = Layer::image("a", Geometry::new(0.0, 0.0, 100.0, 100.0)).with_locked(true);
        let mut fx = Fixture::new(vec![layer]);
        assert!(!fx.down(PointerEvent::down(50.0, 50.0)));
        fx.drag(PointerEvent::moved(80.0, 80.0));
        assert!(fx.controller.is_idle());
        assert!(fx.selection.is_empty());
        assert_eq!(fx.up(PointerEvent::up(80.0, 80.0)), Commit::None);
    }

    #[test]
    fn test_handle_hit_starts_resize() {
        let layer = Layer::image("a", Geometry::new(100.0, 100.0, 200.0, 100.0));
        let id = layer.id;
        let mut fx = Fixture::new(vec![layer]);
        fx.selection.select([id]);

        assert!(fx.down(PointerEvent::down(301.0, 199.0)));
        assert_eq!(fx.controller.kind(), InteractionKind::Resizing);

        fx.drag(PointerEvent::moved(401.0, 199.0).with_modifiers(KeyModifiers::SHIFT));
        let g = fx.controller.ephemeral_geometry(id).expect("captured");
        assert!(approx(g.width, 300.0) && approx(g.height, 150.0));
    }

    #[test]
    fn test_text_ignores_aspect_lock() {
        let layer = Layer::text("t", Geometry::new(0.0, 0.0, 200.0, 100.0));
        let id = layer.id;
        let mut fx = Fixture::new(vec![layer]);
        let target = PointerTarget::ResizeHandle {
            id,
            handle: ResizeHandle::Br,
        };
        assert!(fx.down(PointerEvent::down(200.0, 100.0).with_target(target)));
        fx.drag(PointerEvent::moved(300.0, 100.0).with_modifiers(KeyModifiers::SHIFT));
        let g = fx.controller.ephemeral_geometry(id).expect("captured");
        assert!(approx(g.width, 300.0) && approx(g.height, 100.0));
    }

    #[test]
    fn test_rotate_handle_drag() {
        let layer = Layer::shape(ShapeType::Rectangle, Geometry::new(50.0, 50.0, 100.0, 100.0));
        let id = layer.id;
        let mut fx = Fixture::new(vec![layer]);
        fx.selection.select([id]);

        // Rotate handle sits 24px above the top edge's midpoint.
        assert!(fx.down(PointerEvent::down(100.0, 26.0)));
        assert_eq!(fx.controller.kind(), InteractionKind::Rotating);

        // Quarter turn clockwise: pointer to the right of the center.
        fx.drag(PointerEvent::moved(200.0, 100.0));
        let g = fx.controller.ephemeral_geometry(id).expect("captured");
        assert!(approx(g.rotation, 90.0));
    }

    #[test]
    fn test_marquee_selects_overlapping() {
        let a = Layer::shape(ShapeType::Circle, Geometry::new(0.0, 0.0, 50.0, 50.0));
        let b = Layer::shape(ShapeType::Circle, Geometry::new(200.0, 200.0, 50.0, 50.0));
        let hidden =
            Layer::shape(ShapeType::Circle, Geometry::new(10.0, 10.0, 50.0, 50.0)).with_visible(false);
        let a_id = a.id;
        let mut fx = Fixture::new(vec![a, b, hidden]);

        assert!(fx.down(PointerEvent::down(500.0, 500.0)));
        assert_eq!(fx.controller.kind(), InteractionKind::MarqueeSelecting);
        fx.drag(PointerEvent::moved(40.0, 40.0));
        assert!(fx.controller.marquee().is_some());
        let commit = fx.up(PointerEvent::up(40.0, 40.0));
        // `a` and `b` both overlap the box; the hidden layer is skipped.
        let Commit::Select { ids, additive } = commit else {
            panic!("expected selection commit");
        };
        assert!(!additive);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a_id));
    }

    #[test]
    fn test_cancel_discards_without_commit() {
        let layer = Layer::shape(ShapeType::Rectangle, Geometry::new(0.0, 0.0, 50.0, 50.0));
        let mut fx = Fixture::new(vec![layer]);
        fx.down(PointerEvent::down(10.0, 10.0));
        fx.drag(PointerEvent::moved(60.0, 60.0));
        let discarded = fx.controller.cancel();
        assert_eq!(discarded.kind(), InteractionKind::Moving);
        assert!(fx.controller.is_idle());
        assert_eq!(fx.up(PointerEvent::up(60.0, 60.0)), Commit::None);
    }

    #[test]
    fn test_stale_gesture_is_discarded() {
        let layer = Layer::shape(ShapeType::Rectangle, Geometry::new(0.0, 0.0, 50.0, 50.0));
        let id = layer.id;
        let mut fx = Fixture::new(vec![layer]);
        fx.down(PointerEvent::down(10.0, 10.0));
        let page = fx.page.remove_layers(&[id]).expect("removed");
        assert!(fx.controller.discard_if_stale(&page));
        assert!(fx.controller.is_idle());
    }

    #[test]
    fn test_guide_drag() {
        let mut fx = Fixture::new(Vec::new());
        fx.page = fx.page.add_guide(GuideAxis::Vertical, 300.0).expect("added");
        assert!(fx.down(PointerEvent::down(302.0, 500.0)));
        assert_eq!(fx.controller.kind(), InteractionKind::GuideDragging);
        let commit = fx.up(PointerEvent::up(420.0, 10.0));
        assert_eq!(
            commit,
            Commit::Guide {
                axis: GuideAxis::Vertical,
                index: 0,
                offset: 420.0
            }
        );
    }

    #[test]
    fn test_middle_button_pans() {
        let mut fx = Fixture::new(Vec::new());
        assert!(fx.down(PointerEvent::down(10.0, 10.0).with_button(1)));
        fx.drag(PointerEvent::moved(40.0, 25.0));
        assert_eq!(fx.controller.pan(), Some((30.0, 15.0)));
        assert_eq!(fx.up(PointerEvent::up(40.0, 25.0)), Commit::None);
    }
}
