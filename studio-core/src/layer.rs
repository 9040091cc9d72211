//! Layers - the positioned, styled content elements of a page.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Geometry, GroupId};

/// Unique identifier for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Mint a new unique layer ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse a layer ID from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a valid UUID.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminant of [`LayerKind`], also naming the page sequence a layer lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerVariant {
    /// Text layer.
    Text,
    /// Image layer.
    Image,
    /// Vector shape layer.
    Shape,
}

impl LayerVariant {
    /// Composite order, bottom first.
    pub const PAINT_ORDER: [Self; 3] = [Self::Shape, Self::Image, Self::Text];

    /// Whether aspect-lock applies when resizing this variant.
    ///
    /// Text reflows on resize, so a locked aspect ratio has no meaning for it.
    #[must_use]
    pub const fn supports_aspect_lock(self) -> bool {
        matches!(self, Self::Image | Self::Shape)
    }
}

/// Font style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Slanted.
    Italic,
}

/// Text decoration line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// Line below the text.
    Underline,
    /// Line through the text.
    LineThrough,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
    /// Justified.
    Justify,
}

/// Typography attributes of a text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    /// Font family name, resolved by the renderer.
    pub font_family: String,
    /// Numeric weight (100-900).
    pub font_weight: u16,
    /// Upright or italic.
    pub font_style: FontStyle,
    /// Underline / strike-through.
    pub decoration: TextDecoration,
    /// Font size in pixels.
    pub font_size: f32,
    /// Text color as hex.
    pub color: String,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Extra spacing between glyphs, in pixels.
    pub letter_spacing: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_weight: 400,
            font_style: FontStyle::Normal,
            decoration: TextDecoration::None,
            font_size: 24.0,
            color: "#000000".to_string(),
            align: TextAlign::Left,
            letter_spacing: 0.0,
            line_height: 1.2,
        }
    }
}

/// Visual effect applied to text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "lowercase")]
pub enum TextEffect {
    /// Plain text.
    #[default]
    None,
    /// Drop shadow.
    Shadow {
        /// Horizontal shadow offset.
        offset_x: f32,
        /// Vertical shadow offset.
        offset_y: f32,
        /// Blur radius.
        blur: f32,
        /// Shadow color as hex.
        color: String,
    },
    /// Soft raised shadow directly beneath the text.
    Lift {
        /// Strength, 0-100.
        intensity: f32,
    },
    /// Outline around the glyphs.
    Stroke {
        /// Outline width.
        width: f32,
        /// Outline color as hex.
        color: String,
    },
    /// Glow.
    Neon {
        /// Strength, 0-100.
        intensity: f32,
        /// Glow color as hex.
        color: String,
    },
}

/// Text layer content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// The text itself.
    pub content: String,
    /// Font and paragraph attributes.
    #[serde(default)]
    pub typography: Typography,
    /// Optional effect.
    #[serde(default)]
    pub effect: TextEffect,
}

/// Image layer content.
///
/// Pixels are never loaded here; `asset_id` is resolved by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// Reference to an externally owned asset.
    pub asset_id: String,
    /// Accessible description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Shape primitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    /// Axis-aligned rectangle, optionally rounded.
    #[default]
    Rectangle,
    /// Ellipse inscribed in the box.
    Circle,
    /// Horizontal line through the box's vertical center.
    Line,
}

/// One stop of a linear gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0.0-1.0.
    pub offset: f32,
    /// Color as hex.
    pub color: String,
}

/// Shape fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "fill", rename_all = "snake_case")]
pub enum Fill {
    /// Single color.
    Solid {
        /// Color as hex.
        color: String,
    },
    /// Linear gradient with ordered stops.
    LinearGradient {
        /// Gradient direction in degrees.
        angle: f32,
        /// Color stops, ordered by offset.
        stops: Vec<GradientStop>,
    },
}

impl Default for Fill {
    fn default() -> Self {
        Self::Solid {
            color: "#D9D9D9".to_string(),
        }
    }
}

impl Fill {
    /// Build a gradient, sorting the stops by offset.
    #[must_use]
    pub fn linear_gradient(angle: f32, mut stops: Vec<GradientStop>) -> Self {
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self::LinearGradient { angle, stops }
    }
}

/// Vector shape layer content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeContent {
    /// Primitive drawn.
    pub shape: ShapeType,
    /// Interior fill.
    #[serde(default)]
    pub fill: Fill,
    /// Outline color as hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Outline width, never negative.
    #[serde(default)]
    pub stroke_width: f32,
    /// Corner radius; only meaningful for rectangles.
    #[serde(default)]
    pub border_radius: f32,
}

impl ShapeContent {
    /// Create a shape with default styling.
    #[must_use]
    pub fn new(shape: ShapeType) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    /// Corner radius the renderer should use.
    #[must_use]
    pub fn effective_border_radius(&self) -> f32 {
        match self.shape {
            ShapeType::Rectangle => self.border_radius.max(0.0),
            ShapeType::Circle | ShapeType::Line => 0.0,
        }
    }
}

/// The content of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum LayerKind {
    /// Text layer.
    Text(TextContent),
    /// Image layer.
    Image(ImageContent),
    /// Vector shape layer.
    Shape(ShapeContent),
}

impl LayerKind {
    /// The discriminant.
    #[must_use]
    pub const fn variant(&self) -> LayerVariant {
        match self {
            Self::Text(_) => LayerVariant::Text,
            Self::Image(_) => LayerVariant::Image,
            Self::Shape(_) => LayerVariant::Shape,
        }
    }
}

const fn default_opacity() -> f32 {
    1.0
}

const fn default_visible() -> bool {
    true
}

/// A positioned, styled content element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique identifier within the page.
    pub id: LayerId,
    /// Position, size and rotation.
    pub geometry: Geometry,
    /// Opacity, 0.0-1.0.
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Hidden layers are neither painted nor hit.
    #[serde(default = "default_visible")]
    pub is_visible: bool,
    /// Locked layers accept no interaction.
    #[serde(default)]
    pub is_locked: bool,
    /// Weak reference to a group on the same page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    /// Variant-specific content.
    pub kind: LayerKind,
}

impl Layer {
    /// Create a layer with a freshly minted id.
    #[must_use]
    pub fn new(kind: LayerKind, geometry: Geometry) -> Self {
        Self {
            id: LayerId::new(),
            geometry,
            opacity: 1.0,
            is_visible: true,
            is_locked: false,
            group_id: None,
            kind,
        }
    }

    /// Create a text layer.
    #[must_use]
    pub fn text(content: impl Into<String>, geometry: Geometry) -> Self {
        Self::new(
            LayerKind::Text(TextContent {
                content: content.into(),
                ..TextContent::default()
            }),
            geometry,
        )
    }

    /// Create an image layer.
    #[must_use]
    pub fn image(asset_id: impl Into<String>, geometry: Geometry) -> Self {
        Self::new(
            LayerKind::Image(ImageContent {
                asset_id: asset_id.into(),
                alt: None,
            }),
            geometry,
        )
    }

    /// Create a shape layer.
    #[must_use]
    pub fn shape(shape: ShapeType, geometry: Geometry) -> Self {
        Self::new(LayerKind::Shape(ShapeContent::new(shape)), geometry)
    }

    /// Set the opacity.
    #[must_use]
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the locked flag.
    #[must_use]
    pub const fn with_locked(mut self, locked: bool) -> Self {
        self.is_locked = locked;
        self
    }

    /// Set the visibility flag.
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    /// Which page sequence this layer belongs to.
    #[must_use]
    pub const fn variant(&self) -> LayerVariant {
        self.kind.variant()
    }

    /// Whether the pointer may transform this layer.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.is_visible && !self.is_locked
    }
}

/// Id-addressed partial update.
///
/// `None` fields are left untouched. A `kind` whose variant differs from the
/// target layer's is ignored: a layer never changes variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::option_option)] // distinguishes "leave" from "clear" for group_id
pub struct LayerPatch {
    /// New left edge.
    pub left: Option<f32>,
    /// New top edge.
    pub top: Option<f32>,
    /// New width.
    pub width: Option<f32>,
    /// New height.
    pub height: Option<f32>,
    /// New rotation in degrees.
    pub rotation: Option<f32>,
    /// New opacity.
    pub opacity: Option<f32>,
    /// New visibility.
    pub is_visible: Option<bool>,
    /// New lock state.
    pub is_locked: Option<bool>,
    /// `Some(None)` clears the group, `Some(Some(g))` assigns one.
    pub group_id: Option<Option<GroupId>>,
    /// Replacement content of the same variant.
    pub kind: Option<LayerKind>,
}

impl LayerPatch {
    /// Patch that overwrites the whole geometry.
    #[must_use]
    pub const fn geometry(geometry: Geometry) -> Self {
        Self {
            left: Some(geometry.left),
            top: Some(geometry.top),
            width: Some(geometry.width),
            height: Some(geometry.height),
            rotation: Some(geometry.rotation),
            opacity: None,
            is_visible: None,
            is_locked: None,
            group_id: None,
            kind: None,
        }
    }

    /// Patch that only touches the group reference.
    #[must_use]
    pub fn group(group_id: Option<GroupId>) -> Self {
        Self {
            group_id: Some(group_id),
            ..Self::default()
        }
    }

    /// Drop non-finite geometry fields and raise width/height to `min_size`.
    #[must_use]
    pub fn sanitized(&self, min_size: f32) -> Self {
        let finite = |v: Option<f32>| v.filter(|v| v.is_finite());
        Self {
            left: finite(self.left),
            top: finite(self.top),
            width: finite(self.width).map(|w| w.max(min_size)),
            height: finite(self.height).map(|h| h.max(min_size)),
            rotation: finite(self.rotation),
            ..self.clone()
        }
    }

    /// Apply to a layer, returning `None` when nothing would change.
    #[must_use]
    pub fn apply(&self, layer: &Layer) -> Option<Layer> {
        let mut next = layer.clone();
        let g = &mut next.geometry;
        if let Some(v) = self.left {
            g.left = v;
        }
        if let Some(v) = self.top {
            g.top = v;
        }
        if let Some(v) = self.width {
            g.width = v;
        }
        if let Some(v) = self.height {
            g.height = v;
        }
        if let Some(v) = self.rotation {
            g.rotation = v;
        }
        if let Some(v) = self.opacity.filter(|v| v.is_finite()) {
            next.opacity = v.clamp(0.0, 1.0);
        }
        if let Some(v) = self.is_visible {
            next.is_visible = v;
        }
        if let Some(v) = self.is_locked {
            next.is_locked = v;
        }
        if let Some(v) = self.group_id {
            next.group_id = v;
        }
        if let Some(kind) = &self.kind {
            if kind.variant() == layer.variant() {
                next.kind = kind.clone();
            } else {
                tracing::debug!(
                    "Ignoring {:?} content patch for {:?} layer {}",
                    kind.variant(),
                    layer.variant(),
                    layer.id
                );
            }
        }
        (next != *layer).then_some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_layer_defaults() {
        let layer = Layer::text("Hello", Geometry::default());
        assert!(layer.is_visible);
        assert!(!layer.is_locked);
        assert!(layer.group_id.is_none());
        assert!((layer.opacity - 1.0).abs() < f32::EPSILON);
        assert_eq!(layer.variant(), LayerVariant::Text);
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = Layer::image("asset-1", Geometry::default());
        let b = Layer::image("asset-1", Geometry::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_patch_geometry() {
        let layer = Layer::shape(ShapeType::Circle, Geometry::new(0.0, 0.0, 50.0, 50.0));
        let patch = LayerPatch {
            left: Some(10.0),
            rotation: Some(30.0),
            ..LayerPatch::default()
        };
        let next = patch.apply(&layer).expect("changed");
        assert!((next.geometry.left - 10.0).abs() < f32::EPSILON);
        assert!((next.geometry.top).abs() < f32::EPSILON);
        assert!((next.geometry.rotation - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_patch_without_effect_returns_none() {
        let layer = Layer::text("Hi", Geometry::new(5.0, 5.0, 40.0, 40.0));
        assert!(LayerPatch::default().apply(&layer).is_none());
        assert!(LayerPatch::geometry(layer.geometry).apply(&layer).is_none());
    }

    #[test]
    fn test_patch_never_changes_variant() {
        let layer = Layer::text("Hi", Geometry::default());
        let patch = LayerPatch {
            kind: Some(LayerKind::Image(ImageContent::default())),
            ..LayerPatch::default()
        };
        assert!(patch.apply(&layer).is_none());
    }

    #[test]
    fn test_patch_clamps_opacity() {
        let layer = Layer::text("Hi", Geometry::default());
        let patch = LayerPatch {
            opacity: Some(1.5),
            ..LayerPatch::default()
        };
        let next = patch.apply(&layer).unwrap_or(layer);
        assert!((next.opacity - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_patch_ignores_nan_opacity() {
        let layer = Layer::text("Hi", Geometry::default()).with_opacity(0.4);
        let patch = LayerPatch {
            opacity: Some(f32::NAN),
            ..LayerPatch::default()
        };
        assert!(patch.apply(&layer).is_none());
    }

    #[test]
    fn test_sanitized_patch_respects_floor() {
        let patch = LayerPatch {
            left: Some(f32::INFINITY),
            width: Some(-5.0),
            height: Some(f32::NAN),
            rotation: Some(30.0),
            ..LayerPatch::default()
        }
        .sanitized(20.0);
        assert_eq!(patch.left, None);
        assert_eq!(patch.width, Some(20.0));
        assert_eq!(patch.height, None);
        assert_eq!(patch.rotation, Some(30.0));
    }

    #[test]
    fn test_border_radius_only_for_rectangles() {
        let mut shape = ShapeContent::new(ShapeType::Circle);
        shape.border_radius = 12.0;
        assert!(shape.effective_border_radius().abs() < f32::EPSILON);
        shape.shape = ShapeType::Rectangle;
        assert!((shape.effective_border_radius() - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_gradient_stops_sorted() {
        let fill = Fill::linear_gradient(
            90.0,
            vec![
                GradientStop {
                    offset: 1.0,
                    color: "#FFFFFF".to_string(),
                },
                GradientStop {
                    offset: 0.0,
                    color: "#000000".to_string(),
                },
            ],
        );
        let Fill::LinearGradient { stops, .. } = fill else {
            panic!("expected gradient");
        };
        assert!(stops[0].offset < stops[1].offset);
    }

    #[test]
    fn test_layer_json_shape() {
        let layer = Layer::shape(ShapeType::Rectangle, Geometry::default());
        let json = serde_json::to_value(&layer).expect("serialize");
        assert_eq!(json["kind"]["type"], "shape");
        assert_eq!(json["kind"]["data"]["shape"], "rectangle");
        let back: Layer = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, layer);
    }
}
