//! Editing session: one page under undo/redo plus selection, gesture and view.
//!
//! [`Editor`] is the single owner of write access to the page. Every change
//! goes through the history container, so each committed gesture or command
//! is exactly one undo step.

use std::borrow::Cow;
use std::sync::Arc;

use crate::{
    Commit, EditorConfig, Geometry, GroupId, GuideAxis, History, InputEvent, InteractionContext,
    InteractionController, InteractionState, KeyModifiers, Layer, LayerId, LayerPatch, Page,
    Point, PointerEvent, PointerPhase, ReorderDirection, Selection, ShapeType, Tool, Viewport,
};

/// Default text placed by the text tool.
const NEW_TEXT: &str = "Add a heading";

/// An editing session over one page.
#[derive(Debug, Clone)]
pub struct Editor {
    history: History<Page>,
    selection: Selection,
    interaction: InteractionController,
    viewport: Viewport,
    tool: Tool,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Page::default())
    }
}

impl Editor {
    /// Open a page with the default configuration.
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self::with_config(page, EditorConfig::default())
    }

    /// Open a page with a custom configuration.
    #[must_use]
    pub fn with_config(page: Page, config: EditorConfig) -> Self {
        let page = admit(page, config.min_layer_size);
        Self {
            history: History::new(page).with_limit(config.history_limit),
            selection: Selection::new(),
            interaction: InteractionController::new(),
            viewport: Viewport::default(),
            tool: Tool::Select,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The committed page.
    #[must_use]
    pub fn page(&self) -> &Page {
        self.history.present()
    }

    /// The committed page as a shareable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Page> {
        self.history.snapshot()
    }

    /// The page with any in-flight gesture applied, for drawing.
    #[must_use]
    pub fn preview(&self) -> Cow<'_, Page> {
        match self.interaction.preview(self.page()) {
            Some(page) => Cow::Owned(page),
            None => Cow::Borrowed(self.page()),
        }
    }

    /// Undo/redo history.
    #[must_use]
    pub const fn history(&self) -> &History<Page> {
        &self.history
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Gesture state machine.
    #[must_use]
    pub const fn interaction(&self) -> &InteractionController {
        &self.interaction
    }

    /// View transform.
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Active tool.
    #[must_use]
    pub const fn tool(&self) -> Tool {
        self.tool
    }

    /// Configuration in effect.
    #[must_use]
    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Switch tools, abandoning any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.cancel_interaction();
        self.tool = tool;
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    /// Open a different page. History, selection and gesture are discarded.
    pub fn load_page(&mut self, page: Page) {
        tracing::info!("Loading page with {} layers", page.layer_count());
        let page = admit(page, self.config.min_layer_size);
        self.cancel_interaction();
        self.selection.clear();
        self.history.reset(page);
    }

    /// Overwrite the page wholesale, e.g. with an externally generated layout.
    ///
    /// This is an ordinary, undoable edit. A gesture whose layers vanished is
    /// discarded.
    pub fn replace_page(&mut self, page: Page) -> bool {
        tracing::info!("Replacing page with {} layers", page.layer_count());
        let page = admit(page, self.config.min_layer_size);
        let changed = self.history.set(page);
        if changed {
            self.sync_after_change();
        }
        changed
    }

    /// Undo the last change.
    pub fn undo(&mut self) -> bool {
        self.cancel_interaction();
        let changed = self.history.undo();
        if changed {
            self.sync_after_change();
        }
        changed
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        self.cancel_interaction();
        let changed = self.history.redo();
        if changed {
            self.sync_after_change();
        }
        changed
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn commit<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&Page) -> Option<Page>,
    {
        let changed = self.history.update(f);
        if changed {
            self.sync_after_change();
        }
        changed
    }

    fn sync_after_change(&mut self) {
        let page = self.history.present();
        self.selection.retain_existing(page);
        self.interaction.discard_if_stale(page);
    }

    // -----------------------------------------------------------------------
    // Layer commands
    // -----------------------------------------------------------------------

    /// Add a layer. Returns its id, or `None` if the id was already taken
    /// or its geometry is not finite.
    ///
    /// Width and height are raised to the configured floor.
    pub fn add_layer(&mut self, mut layer: Layer) -> Option<LayerId> {
        if !layer.geometry.is_finite() || !layer.opacity.is_finite() {
            tracing::warn!("Refusing to add layer {} with non-finite values", layer.id);
            return None;
        }
        let min = self.config.min_layer_size;
        layer.geometry.width = layer.geometry.width.max(min);
        layer.geometry.height = layer.geometry.height.max(min);
        layer.opacity = layer.opacity.clamp(0.0, 1.0);
        let id = layer.id;
        self.commit(|page| page.add_layer(layer)).then_some(id)
    }

    /// Partially update one layer. Missing ids are a no-op.
    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        self.update_layers(&[(id, patch.clone())])
    }

    /// Partially update several layers as one undo step.
    ///
    /// Non-finite geometry is dropped and sizes are raised to the floor.
    pub fn update_layers(&mut self, updates: &[(LayerId, LayerPatch)]) -> bool {
        let min = self.config.min_layer_size;
        let updates: Vec<_> = updates
            .iter()
            .map(|(id, patch)| (*id, patch.sanitized(min)))
            .collect();
        self.commit(|page| page.update_layers(&updates))
    }

    /// Remove layers.
    pub fn remove_layers(&mut self, ids: &[LayerId]) -> bool {
        self.commit(|page| page.remove_layers(ids))
    }

    /// Change z-order within each variant's sequence.
    pub fn reorder(&mut self, ids: &[LayerId], direction: ReorderDirection) -> bool {
        self.commit(|page| page.reorder(ids, direction))
    }

    /// Reorder the selected layers.
    pub fn reorder_selection(&mut self, direction: ReorderDirection) -> bool {
        let ids = self.selection.ids().to_vec();
        self.reorder(&ids, direction)
    }

    /// Remove the selected layers.
    pub fn delete_selection(&mut self) -> bool {
        let ids = self.selection.ids().to_vec();
        self.remove_layers(&ids)
    }

    /// Group the selection. Returns the new group's id.
    pub fn group_selection(&mut self) -> Option<GroupId> {
        let ids = self.selection.ids().to_vec();
        let mut created = None;
        self.commit(|page| {
            page.group_layers(&ids).map(|(next, group)| {
                created = Some(group);
                next
            })
        });
        created
    }

    /// Dissolve the group the whole selection shares.
    pub fn ungroup_selection(&mut self) -> bool {
        let Some(group) = self.selection.common_group(self.page()) else {
            return false;
        };
        self.commit(|page| page.ungroup(group))
    }

    /// Move the unlocked selected layers by a fixed delta, as one undo step.
    pub fn nudge_selection(&mut self, dx: f32, dy: f32) -> bool {
        let updates: Vec<_> = self
            .selection
            .layers(self.page())
            .filter(|l| !l.is_locked)
            .map(|l| (l.id, LayerPatch::geometry(l.geometry.translated(dx, dy))))
            .collect();
        self.update_layers(&updates)
    }

    /// Duplicate the selection and select the copies.
    pub fn duplicate_selection(&mut self) -> Vec<LayerId> {
        let ids = self.selection.ids().to_vec();
        let offset = self.config.nudge_step_large;
        let mut copies = Vec::new();
        self.commit(|page| {
            page.duplicate_layers(&ids, offset, offset)
                .map(|(next, created)| {
                    copies = created;
                    next
                })
        });
        if !copies.is_empty() {
            self.selection.select(copies.iter().copied());
        }
        copies
    }

    /// Add an alignment guide.
    pub fn add_guide(&mut self, axis: GuideAxis, offset: f32) -> bool {
        self.commit(|page| page.add_guide(axis, offset))
    }

    /// Remove an alignment guide.
    pub fn remove_guide(&mut self, axis: GuideAxis, index: usize) -> bool {
        self.commit(|page| page.remove_guide(axis, index))
    }

    // -----------------------------------------------------------------------
    // Selection commands
    // -----------------------------------------------------------------------

    /// Replace the selection. Ids not on the page are dropped.
    pub fn select(&mut self, ids: impl IntoIterator<Item = LayerId>) {
        self.selection.select(ids);
        self.selection.retain_existing(self.history.present());
    }

    /// Shift-click semantics for one id.
    pub fn toggle_selection(&mut self, id: LayerId) -> bool {
        if !self.page().contains_layer(id) {
            return false;
        }
        self.selection.toggle(id)
    }

    /// Deselect everything.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every visible, unlocked layer.
    pub fn select_all(&mut self) {
        let ids: Vec<_> = self
            .page()
            .all_layers()
            .filter(|l| l.is_interactive())
            .map(|l| l.id)
            .collect();
        self.selection.select(ids);
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Route any input event. Returns whether the page, selection or view changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::Pointer(pointer) => match pointer.phase {
                PointerPhase::Down => self.pointer_down(pointer),
                PointerPhase::Move => self.pointer_move(pointer),
                PointerPhase::Up => self.pointer_up(pointer),
                PointerPhase::Cancel => self.cancel_interaction(),
            },
            InputEvent::Key {
                key,
                pressed: true,
                modifiers,
            } => self.key_down(key, *modifiers),
            InputEvent::Key { pressed: false, .. } => false,
            InputEvent::Zoom { x, y, factor } => {
                self.viewport.zoom_at(Point::new(*x, *y), *factor)
            }
        }
    }

    /// Pointer pressed.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> bool {
        if event.button == 0 {
            if let Some(layer) = self.creation_layer(event) {
                let id = layer.id;
                if self.add_layer(layer).is_some() {
                    self.selection.select([id]);
                    self.tool = Tool::Select;
                    return true;
                }
                return false;
            }
        }
        let cx = InteractionContext {
            page: self.history.present(),
            viewport: &self.viewport,
            config: &self.config,
        };
        self.interaction
            .pointer_down(&cx, &mut self.selection, self.tool, event)
    }

    fn creation_layer(&self, event: &PointerEvent) -> Option<Layer> {
        let at = self.viewport.to_page(event.position());
        let min = self.config.min_layer_size;
        match self.tool {
            Tool::Select | Tool::Pan => None,
            Tool::Text => Some(Layer::text(
                NEW_TEXT,
                Geometry::new(at.x, at.y, 320.0_f32.max(min), 48.0_f32.max(min)),
            )),
            Tool::Shape { shape } => {
                let height = if shape == ShapeType::Line { min } else { 120.0_f32.max(min) };
                Some(Layer::shape(
                    shape,
                    Geometry::new(at.x, at.y, 120.0_f32.max(min), height),
                ))
            }
        }
    }

    /// Pointer moved.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        let cx = InteractionContext {
            page: self.history.present(),
            viewport: &self.viewport,
            config: &self.config,
        };
        let changed = self.interaction.pointer_move(&cx, event);
        if let Some((pan_x, pan_y)) = self.interaction.pan() {
            self.viewport.pan_x = pan_x;
            self.viewport.pan_y = pan_y;
        }
        changed
    }

    /// Pointer released: commit the gesture as a single step.
    pub fn pointer_up(&mut self, event: &PointerEvent) -> bool {
        if self.interaction.is_idle() {
            return false;
        }
        self.pointer_move(event);
        let cx = InteractionContext {
            page: self.history.present(),
            viewport: &self.viewport,
            config: &self.config,
        };
        let commit = self.interaction.pointer_up(&cx, event);
        self.apply_commit(commit)
    }

    fn apply_commit(&mut self, commit: Commit) -> bool {
        match commit {
            Commit::None => false,
            Commit::Layers(updates) => {
                let changed = self.update_layers(&updates);
                tracing::debug!("Committed {} layer updates: {changed}", updates.len());
                changed
            }
            Commit::Select { ids, additive } => {
                if additive {
                    for id in ids {
                        if !self.selection.contains(id) {
                            self.selection.toggle(id);
                        }
                    }
                } else {
                    self.selection.select(ids);
                }
                true
            }
            Commit::Guide {
                axis,
                index,
                offset,
            } => {
                if self.page().guide_in_bounds(axis, offset) {
                    self.commit(|page| page.move_guide(axis, index, offset))
                } else {
                    tracing::debug!("Guide dropped off the page; removing");
                    self.remove_guide(axis, index)
                }
            }
        }
    }

    /// Abandon the gesture in progress without committing.
    pub fn cancel_interaction(&mut self) -> bool {
        match self.interaction.cancel() {
            InteractionState::Idle => false,
            InteractionState::Panning { origin, .. } => {
                self.viewport.pan_x = origin.0;
                self.viewport.pan_y = origin.1;
                true
            }
            _ => true,
        }
    }

    /// Key pressed. Returns whether anything changed.
    pub fn key_down(&mut self, key: &str, modifiers: KeyModifiers) -> bool {
        let command = modifiers.command();
        let step = if modifiers.shift {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };
        match key.to_ascii_lowercase().as_str() {
            "escape" => {
                if self.interaction.is_idle() {
                    let had = !self.selection.is_empty();
                    self.selection.clear();
                    had
                } else {
                    self.cancel_interaction()
                }
            }
            "delete" | "backspace" => self.delete_selection(),
            "z" if command && modifiers.shift => self.redo(),
            "z" if command => self.undo(),
            "y" if command => self.redo(),
            "g" if command && modifiers.shift => self.ungroup_selection(),
            "g" if command => self.group_selection().is_some(),
            "a" if command => {
                self.select_all();
                true
            }
            "d" if command => !self.duplicate_selection().is_empty(),
            "]" | "}" if command => self.reorder_selection(if modifiers.shift {
                ReorderDirection::Front
            } else {
                ReorderDirection::Forward
            }),
            "[" | "{" if command => self.reorder_selection(if modifiers.shift {
                ReorderDirection::Back
            } else {
                ReorderDirection::Backward
            }),
            "arrowleft" => self.nudge_selection(-step, 0.0),
            "arrowright" => self.nudge_selection(step, 0.0),
            "arrowup" => self.nudge_selection(0.0, -step),
            "arrowdown" => self.nudge_selection(0.0, step),
            _ => false,
        }
    }
}

/// Repair a page coming from outside the editor so the invariants hold.
fn admit(page: Page, min_size: f32) -> Page {
    let violations = page.violations(min_size);
    if violations.is_empty() {
        return page;
    }
    tracing::warn!("Normalizing incoming page with {} violations", violations.len());
    for violation in &violations {
        tracing::debug!("{violation}");
    }
    page.normalized(min_size)
}
