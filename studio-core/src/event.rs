//! Input events for editor interaction.

use serde::{Deserialize, Serialize};

use crate::{GuideAxis, LayerId, Point, ResizeHandle};

/// Phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved (pressed or not).
    Move,
    /// Button released.
    Up,
    /// Pointer capture lost; any gesture in flight must be discarded.
    Cancel,
}

/// What the view reports the pointer landed on.
///
/// Handles are drawn by the view, so it may tell the core which one was
/// pressed. When no target is given the core hit-tests itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerTarget {
    /// Empty canvas.
    Canvas,
    /// The body of a layer.
    Layer {
        /// Pressed layer.
        id: LayerId,
    },
    /// A corner resize handle.
    ResizeHandle {
        /// Layer the handle belongs to.
        id: LayerId,
        /// Which corner.
        handle: ResizeHandle,
    },
    /// The rotate handle.
    RotateHandle {
        /// Layer the handle belongs to.
        id: LayerId,
    },
    /// An alignment guide.
    Guide {
        /// Guide orientation.
        axis: GuideAxis,
        /// Index into the page's guides for that axis.
        index: usize,
    },
}

/// Keyboard modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyModifiers {
    /// Shift key pressed.
    pub shift: bool,
    /// Control key pressed.
    pub ctrl: bool,
    /// Alt/Option key pressed.
    pub alt: bool,
    /// Meta/Command key pressed.
    pub meta: bool,
}

impl KeyModifiers {
    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on Linux/Windows, Cmd on macOS.
    #[must_use]
    pub const fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A pointer (mouse, pen or primary touch) event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Event phase.
    pub phase: PointerPhase,
    /// X position in screen coordinates.
    pub x: f32,
    /// Y position in screen coordinates.
    pub y: f32,
    /// Mouse button (0 = left, 1 = middle, 2 = right).
    #[serde(default)]
    pub button: u8,
    /// Active modifier keys.
    #[serde(default)]
    pub modifiers: KeyModifiers,
    /// What the view says was pressed, if it knows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PointerTarget>,
}

impl PointerEvent {
    /// Create a left-button event with no modifiers.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self {
            phase,
            x,
            y,
            button: 0,
            modifiers: KeyModifiers {
                shift: false,
                ctrl: false,
                alt: false,
                meta: false,
            },
            target: None,
        }
    }

    /// Pointer pressed.
    #[must_use]
    pub const fn down(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Pointer moved.
    #[must_use]
    pub const fn moved(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Pointer released.
    #[must_use]
    pub const fn up(x: f32, y: f32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    /// Pointer capture lost.
    #[must_use]
    pub const fn cancel() -> Self {
        Self::new(PointerPhase::Cancel, 0.0, 0.0)
    }

    /// Set the modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Set the explicit target.
    #[must_use]
    pub const fn with_target(mut self, target: PointerTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Set the button.
    #[must_use]
    pub const fn with_button(mut self, button: u8) -> Self {
        self.button = button;
        self
    }

    /// Screen position.
    #[must_use]
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer event.
    Pointer(PointerEvent),

    /// Keyboard event.
    Key {
        /// Key name as reported by the platform (`"Escape"`, `"z"`, `"ArrowLeft"`).
        key: String,
        /// Whether the key is pressed.
        pressed: bool,
        /// Active modifier keys.
        #[serde(default)]
        modifiers: KeyModifiers,
    },

    /// Zoom the viewport around a screen point.
    Zoom {
        /// Anchor X in screen coordinates.
        x: f32,
        /// Anchor Y in screen coordinates.
        y: f32,
        /// Multiplicative zoom factor (1.0 = no change).
        factor: f32,
    },
}

impl InputEvent {
    /// A key press.
    #[must_use]
    pub fn key(key: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self::Key {
            key: key.into(),
            pressed: true,
            modifiers,
        }
    }
}

impl From<PointerEvent> for InputEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}
