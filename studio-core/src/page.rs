//! Pages - fixed-size canvases owning ordered layer sequences.
//!
//! Every mutating operation takes `&self` and returns the next page value, or
//! `None` when the operation would not change anything. That keeps the
//! history container free of no-op entries and lets callers share snapshots.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::PageViolation;
use crate::{
    EditorError, EditorResult, Geometry, Group, GroupId, Layer, LayerId, LayerPatch, LayerVariant,
    Point,
};

/// Default page width in pixels.
pub const DEFAULT_PAGE_WIDTH: f32 = 1080.0;

/// Default page height in pixels.
pub const DEFAULT_PAGE_HEIGHT: f32 = 1080.0;

/// Page-level fields the view uses to synthesize the background pseudo-layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Fill color as hex.
    pub color: String,
    /// Optional background image asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: "#FFFFFF".to_string(),
            asset_id: None,
        }
    }
}

/// Orientation of an alignment guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideAxis {
    /// A horizontal line at a fixed `y` offset.
    Horizontal,
    /// A vertical line at a fixed `x` offset.
    Vertical,
}

/// One item in composite order, bottom first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintItem<'a> {
    /// The synthesized background; never part of any layer sequence.
    Background(&'a Background),
    /// A content layer.
    Layer(&'a Layer),
}

/// A single canvas with text, image and shape layers, groups and guides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Background fields.
    #[serde(default)]
    pub background: Background,
    /// Text layers, bottom first.
    #[serde(default)]
    text_layers: Vec<Layer>,
    /// Image layers, bottom first.
    #[serde(default)]
    image_layers: Vec<Layer>,
    /// Shape layers, bottom first.
    #[serde(default)]
    shape_layers: Vec<Layer>,
    /// Group labels.
    #[serde(default)]
    groups: Vec<Group>,
    /// Horizontal guide offsets.
    #[serde(default)]
    h_guides: Vec<f32>,
    /// Vertical guide offsets.
    #[serde(default)]
    v_guides: Vec<f32>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT)
    }
}

impl Page {
    /// Create an empty page.
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: Background::default(),
            text_layers: Vec::new(),
            image_layers: Vec::new(),
            shape_layers: Vec::new(),
            groups: Vec::new(),
            h_guides: Vec::new(),
            v_guides: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The sequence holding one variant, bottom first.
    #[must_use]
    pub fn layers(&self, variant: LayerVariant) -> &[Layer] {
        match variant {
            LayerVariant::Text => &self.text_layers,
            LayerVariant::Image => &self.image_layers,
            LayerVariant::Shape => &self.shape_layers,
        }
    }

    pub(crate) fn layers_mut(&mut self, variant: LayerVariant) -> &mut Vec<Layer> {
        match variant {
            LayerVariant::Text => &mut self.text_layers,
            LayerVariant::Image => &mut self.image_layers,
            LayerVariant::Shape => &mut self.shape_layers,
        }
    }

    /// All layers in composite order: shapes, images, then text.
    pub fn all_layers(&self) -> impl DoubleEndedIterator<Item = &Layer> {
        self.shape_layers
            .iter()
            .chain(self.image_layers.iter())
            .chain(self.text_layers.iter())
    }

    pub(crate) fn all_layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> {
        self.shape_layers
            .iter_mut()
            .chain(self.image_layers.iter_mut())
            .chain(self.text_layers.iter_mut())
    }

    /// Background first, then every layer bottom to top.
    pub fn paint_order(&self) -> impl Iterator<Item = PaintItem<'_>> {
        std::iter::once(PaintItem::Background(&self.background))
            .chain(self.all_layers().map(PaintItem::Layer))
    }

    /// Look up a layer in any sequence.
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.all_layers().find(|l| l.id == id)
    }

    /// Whether a layer with this id exists.
    #[must_use]
    pub fn contains_layer(&self, id: LayerId) -> bool {
        self.layer(id).is_some()
    }

    /// Total number of layers across all sequences.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.text_layers.len() + self.image_layers.len() + self.shape_layers.len()
    }

    /// Whether the page has no layers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layer_count() == 0
    }

    /// Topmost visible layer containing a page-space point.
    ///
    /// Locked layers are returned too; callers decide what a hit on them means.
    #[must_use]
    pub fn layer_at(&self, point: Point) -> Option<&Layer> {
        self.all_layers()
            .rev()
            .find(|l| l.is_visible && l.geometry.contains_point(point))
    }

    /// Registered groups.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub(crate) fn groups_mut(&mut self) -> &mut Vec<Group> {
        &mut self.groups
    }

    /// Guide offsets along one axis.
    #[must_use]
    pub fn guides(&self, axis: GuideAxis) -> &[f32] {
        match axis {
            GuideAxis::Horizontal => &self.h_guides,
            GuideAxis::Vertical => &self.v_guides,
        }
    }

    fn guides_mut(&mut self, axis: GuideAxis) -> &mut Vec<f32> {
        match axis {
            GuideAxis::Horizontal => &mut self.h_guides,
            GuideAxis::Vertical => &mut self.v_guides,
        }
    }

    /// Whether a guide offset lies on the page along its axis.
    #[must_use]
    pub fn guide_in_bounds(&self, axis: GuideAxis, offset: f32) -> bool {
        let extent = match axis {
            GuideAxis::Horizontal => self.height,
            GuideAxis::Vertical => self.width,
        };
        (0.0..=extent).contains(&offset)
    }

    // -----------------------------------------------------------------------
    // Layer operations
    // -----------------------------------------------------------------------

    /// Append a layer to the top of its variant's sequence.
    ///
    /// Returns `None` if the id is already taken. A `group_id` that does not
    /// resolve on this page is cleared.
    #[must_use]
    pub fn add_layer(&self, mut layer: Layer) -> Option<Self> {
        if self.contains_layer(layer.id) {
            tracing::warn!("Refusing to add duplicate layer {}", layer.id);
            return None;
        }
        if layer.group_id.is_some_and(|g| self.group(g).is_none()) {
            layer.group_id = None;
        }
        let mut next = self.clone();
        next.layers_mut(layer.variant()).push(layer);
        Some(next)
    }

    /// Apply a partial update to one layer. Missing ids are a no-op.
    #[must_use]
    pub fn update_layer(&self, id: LayerId, patch: &LayerPatch) -> Option<Self> {
        self.update_layers(&[(id, patch.clone())])
    }

    /// Apply several partial updates as one change.
    ///
    /// Ids that do not resolve are skipped, so deltas computed against a
    /// layer that has since been deleted are harmless. Returns `None` when no
    /// layer changed.
    #[must_use]
    pub fn update_layers(&self, updates: &[(LayerId, LayerPatch)]) -> Option<Self> {
        let known_groups: HashSet<GroupId> = self.groups.iter().map(|g| g.id).collect();
        let mut next = self.clone();
        let mut changed = false;
        for (id, patch) in updates {
            let Some(layer) = next.all_layers_mut().find(|l| l.id == *id) else {
                tracing::debug!("Skipping update for missing layer {id}");
                continue;
            };
            let Some(mut updated) = patch.apply(layer) else {
                continue;
            };
            if updated.group_id.is_some_and(|g| !known_groups.contains(&g)) {
                updated.group_id = layer.group_id;
            }
            if updated != *layer {
                *layer = updated;
                changed = true;
            }
        }
        changed.then_some(next)
    }

    /// Remove layers by id from whichever sequence holds them.
    ///
    /// Groups left without members are pruned. Returns `None` if no id matched.
    #[must_use]
    pub fn remove_layers(&self, ids: &[LayerId]) -> Option<Self> {
        let doomed: HashSet<LayerId> = ids.iter().copied().collect();
        let mut touched_groups = HashSet::new();
        let mut next = self.clone();
        let mut removed = 0;
        for variant in LayerVariant::PAINT_ORDER {
            next.layers_mut(variant).retain(|l| {
                if doomed.contains(&l.id) {
                    touched_groups.extend(l.group_id);
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }
        if removed == 0 {
            return None;
        }
        for group in touched_groups {
            if next.group_members(group).is_empty() {
                tracing::debug!("Pruning orphaned group {group}");
                next.groups.retain(|g| g.id != group);
            }
        }
        Some(next)
    }

    /// Copy layers with fresh ids, offset by `(dx, dy)`, on top of their stacks.
    ///
    /// Copies of grouped layers join a fresh copy of their group. Returns the
    /// new page and the ids of the copies in the order requested.
    #[must_use]
    pub fn duplicate_layers(
        &self,
        ids: &[LayerId],
        dx: f32,
        dy: f32,
    ) -> Option<(Self, Vec<LayerId>)> {
        let mut next = self.clone();
        let mut group_map: HashMap<GroupId, GroupId> = HashMap::new();
        let mut copies = Vec::new();
        for id in ids {
            let Some(source) = self.layer(*id) else {
                continue;
            };
            let mut copy = source.clone();
            copy.id = LayerId::new();
            copy.geometry = copy.geometry.translated(dx, dy);
            if let Some(group_id) = source.group_id {
                let fresh = *group_map.entry(group_id).or_insert_with(|| {
                    let name = self
                        .group(group_id)
                        .map_or_else(|| "Group".to_string(), |g| format!("{} copy", g.name));
                    let group = Group::new(name);
                    let fresh = group.id;
                    next.groups.push(group);
                    fresh
                });
                copy.group_id = Some(fresh);
            }
            copies.push(copy.id);
            next.layers_mut(copy.variant()).push(copy);
        }
        (!copies.is_empty()).then_some((next, copies))
    }

    // -----------------------------------------------------------------------
    // Guides
    // -----------------------------------------------------------------------

    /// Add a guide at `offset`.
    #[must_use]
    pub fn add_guide(&self, axis: GuideAxis, offset: f32) -> Option<Self> {
        if !offset.is_finite() {
            return None;
        }
        let mut next = self.clone();
        next.guides_mut(axis).push(offset);
        Some(next)
    }

    /// Move the guide at `index` to `offset`.
    #[must_use]
    pub fn move_guide(&self, axis: GuideAxis, index: usize, offset: f32) -> Option<Self> {
        let current = *self.guides(axis).get(index)?;
        if !offset.is_finite() || (current - offset).abs() < f32::EPSILON {
            return None;
        }
        let mut next = self.clone();
        next.guides_mut(axis)[index] = offset;
        Some(next)
    }

    /// Remove the guide at `index`.
    #[must_use]
    pub fn remove_guide(&self, axis: GuideAxis, index: usize) -> Option<Self> {
        if index >= self.guides(axis).len() {
            return None;
        }
        let mut next = self.clone();
        next.guides_mut(axis).remove(index);
        Some(next)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Every structural invariant violation on this page.
    #[must_use]
    pub fn violations(&self, min_size: f32) -> Vec<PageViolation> {
        let mut out = Vec::new();
        if !(self.width > 0.0 && self.height > 0.0) {
            out.push(PageViolation::InvalidPageSize {
                width: self.width,
                height: self.height,
            });
        }

        let mut group_ids = HashSet::new();
        for group in &self.groups {
            if !group_ids.insert(group.id) {
                out.push(PageViolation::DuplicateGroupId(group.id.to_string()));
            }
        }

        let mut layer_ids = HashSet::new();
        for layer in self.all_layers() {
            let name = layer.id.to_string();
            if !layer_ids.insert(layer.id) {
                out.push(PageViolation::DuplicateLayerId(name.clone()));
            }
            if let Some(group) = layer.group_id.filter(|g| !group_ids.contains(g)) {
                out.push(PageViolation::DanglingGroup {
                    layer: name.clone(),
                    group: group.to_string(),
                });
            }
            let g = &layer.geometry;
            if !g.is_finite() {
                out.push(PageViolation::NonFiniteGeometry(name));
                continue;
            }
            if g.width < min_size || g.height < min_size {
                out.push(PageViolation::BelowMinimumSize {
                    layer: name.clone(),
                    width: g.width,
                    height: g.height,
                    min: min_size,
                });
            }
            if !(0.0..=1.0).contains(&layer.opacity) {
                out.push(PageViolation::OpacityOutOfRange {
                    layer: name,
                    opacity: layer.opacity,
                });
            }
        }
        out
    }

    /// Check all structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`PageViolation`] found.
    pub fn validate(&self, min_size: f32) -> EditorResult<()> {
        match self.violations(min_size).into_iter().next() {
            Some(violation) => Err(EditorError::InvalidPage(violation)),
            None => Ok(()),
        }
    }

    /// Repair what can be repaired.
    ///
    /// Duplicate layers and groups keep their first occurrence, dangling
    /// group references are cleared, non-finite fields are reset, sizes are
    /// raised to the floor and opacity is clamped. Page size is left alone.
    #[must_use]
    pub fn normalized(&self, min_size: f32) -> Self {
        let mut next = self.clone();

        let mut group_ids = HashSet::new();
        next.groups.retain(|g| group_ids.insert(g.id));

        let mut layer_ids = HashSet::new();
        for variant in LayerVariant::PAINT_ORDER {
            next.layers_mut(variant).retain(|l| layer_ids.insert(l.id));
        }

        for layer in next.all_layers_mut() {
            if layer.group_id.is_some_and(|g| !group_ids.contains(&g)) {
                layer.group_id = None;
            }
            let defaults = Geometry::default();
            let g = &mut layer.geometry;
            for (field, fallback) in [
                (&mut g.left, defaults.left),
                (&mut g.top, defaults.top),
                (&mut g.width, min_size),
                (&mut g.height, min_size),
                (&mut g.rotation, defaults.rotation),
            ] {
                if !field.is_finite() {
                    *field = fallback;
                }
            }
            g.width = g.width.max(min_size);
            g.height = g.height.max(min_size);
            layer.opacity = if layer.opacity.is_finite() {
                layer.opacity.clamp(0.0, 1.0)
            } else {
                1.0
            };
        }

        next.h_guides.retain(|o| o.is_finite());
        next.v_guides.retain(|o| o.is_finite());
        next
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Serialize the page to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> EditorResult<String> {
        serde_json::to_string(self).map_err(EditorError::Serialization)
    }

    /// Deserialize a page from JSON without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        serde_json::from_str(json).map_err(EditorError::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ShapeType;

    fn sample_page() -> (Page, LayerId, LayerId, LayerId) {
        let text = Layer::text("Title", Geometry::new(10.0, 10.0, 200.0, 40.0));
        let image = Layer::image("photo", Geometry::new(0.0, 0.0, 300.0, 300.0));
        let shape = Layer::shape(ShapeType::Rectangle, Geometry::new(0.0, 0.0, 500.0, 500.0));
        let (t, i, s) = (text.id, image.id, shape.id);
        let page = Page::new(800.0, 600.0)
            .add_layer(text)
            .and_then(|p| p.add_layer(image))
            .and_then(|p| p.add_layer(shape))
            .expect("fresh ids");
        (page, t, i, s)
    }

    #[test]
    fn test_add_layer_routes_by_variant() {
        let (page, t, i, s) = sample_page();
        assert_eq!(page.layer_count(), 3);
        assert_eq!(page.layers(LayerVariant::Text)[0].id, t);
        assert_eq!(page.layers(LayerVariant::Image)[0].id, i);
        assert_eq!(page.layers(LayerVariant::Shape)[0].id, s);
    }

    #[test]
    fn test_add_duplicate_id_is_rejected() {
        let (page, t, _, _) = sample_page();
        let dup = page.layer(t).cloned().expect("exists");
        assert!(page.add_layer(dup).is_none());
    }

    #[test]
    fn test_update_missing_id_is_noop() {
        let (page, _, _, _) = sample_page();
        let patch = LayerPatch {
            left: Some(99.0),
            ..LayerPatch::default()
        };
        assert!(page.update_layer(LayerId::new(), &patch).is_none());
    }

    #[test]
    fn test_update_layers_applies_all_and_skips_missing() {
        let (page, t, i, _) = sample_page();
        let patch = LayerPatch {
            top: Some(77.0),
            ..LayerPatch::default()
        };
        let next = page
            .update_layers(&[
                (t, patch.clone()),
                (LayerId::new(), patch.clone()),
                (i, patch),
            ])
            .expect("changed");
        assert!((next.layer(t).expect("t").geometry.top - 77.0).abs() < f32::EPSILON);
        assert!((next.layer(i).expect("i").geometry.top - 77.0).abs() < f32::EPSILON);
        // Original value untouched.
        assert!((page.layer(t).expect("t").geometry.top - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_update_cannot_point_at_unknown_group() {
        let (page, t, _, _) = sample_page();
        assert!(page
            .update_layer(t, &LayerPatch::group(Some(GroupId::new())))
            .is_none());
    }

    #[test]
    fn test_remove_layers() {
        let (page, t, _, s) = sample_page();
        let next = page.remove_layers(&[t, s]).expect("removed");
        assert_eq!(next.layer_count(), 1);
        assert!(page.remove_layers(&[LayerId::new()]).is_none());
    }

    #[test]
    fn test_layer_at_prefers_text_over_shapes() {
        let (page, t, i, s) = sample_page();
        assert_eq!(page.layer_at(Point::new(20.0, 20.0)).map(|l| l.id), Some(t));
        assert_eq!(page.layer_at(Point::new(250.0, 250.0)).map(|l| l.id), Some(i));
        assert_eq!(page.layer_at(Point::new(400.0, 400.0)).map(|l| l.id), Some(s));
        assert!(page.layer_at(Point::new(700.0, 550.0)).is_none());
    }

    #[test]
    fn test_hidden_layers_are_not_hit() {
        let (page, t, i, _) = sample_page();
        let patch = LayerPatch {
            is_visible: Some(false),
            ..LayerPatch::default()
        };
        let next = page.update_layer(t, &patch).expect("changed");
        assert_eq!(next.layer_at(Point::new(20.0, 20.0)).map(|l| l.id), Some(i));
    }

    #[test]
    fn test_paint_order_starts_with_background() {
        let (page, t, _, s) = sample_page();
        let items: Vec<_> = page.paint_order().collect();
        assert!(matches!(items[0], PaintItem::Background(_)));
        assert!(matches!(items[1], PaintItem::Layer(l) if l.id == s));
        assert!(matches!(items[3], PaintItem::Layer(l) if l.id == t));
    }

    #[test]
    fn test_guides() {
        let page = Page::new(100.0, 100.0);
        let page = page.add_guide(GuideAxis::Vertical, 50.0).expect("added");
        let page = page.move_guide(GuideAxis::Vertical, 0, 25.0).expect("moved");
        assert_eq!(page.guides(GuideAxis::Vertical), &[25.0]);
        assert!(page.move_guide(GuideAxis::Vertical, 3, 10.0).is_none());
        assert!(page.guide_in_bounds(GuideAxis::Horizontal, 100.0));
        assert!(!page.guide_in_bounds(GuideAxis::Horizontal, -1.0));
        let page = page.remove_guide(GuideAxis::Vertical, 0).expect("removed");
        assert!(page.guides(GuideAxis::Vertical).is_empty());
    }

    #[test]
    fn test_validate_and_normalize() {
        let mut bad = Layer::text("tiny", Geometry::new(0.0, 0.0, 5.0, 50.0));
        bad.group_id = Some(GroupId::new());
        bad.opacity = 3.0;
        let mut page = Page::new(400.0, 400.0);
        page.text_layers.push(bad.clone());
        page.text_layers.push(bad);

        let violations = page.violations(20.0);
        assert!(violations
            .iter()
            .any(|v| matches!(v, PageViolation::DuplicateLayerId(_))));
        assert!(violations
            .iter()
            .any(|v| matches!(v, PageViolation::DanglingGroup { .. })));
        assert!(page.validate(20.0).is_err());

        let fixed = page.normalized(20.0);
        assert!(fixed.validate(20.0).is_ok());
        assert_eq!(fixed.layer_count(), 1);
        let layer = &fixed.layers(LayerVariant::Text)[0];
        assert!((layer.geometry.width - 20.0).abs() < f32::EPSILON);
        assert!(layer.group_id.is_none());
    }

    #[test]
    fn test_duplicate_layers_offsets_copies() {
        let (page, t, _, _) = sample_page();
        let (next, copies) = page.duplicate_layers(&[t], 10.0, 10.0).expect("copied");
        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0], t);
        let copy = next.layer(copies[0]).expect("copy");
        assert!((copy.geometry.left - 20.0).abs() < f32::EPSILON);
        assert_eq!(next.layers(LayerVariant::Text).last().map(|l| l.id), Some(copies[0]));
    }

    #[test]
    fn test_json_round_trip() {
        let (page, _, _, _) = sample_page();
        let json = page.to_json().expect("serialize");
        let back = Page::from_json(&json).expect("deserialize");
        assert_eq!(back, page);
    }
}
