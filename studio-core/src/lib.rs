//! # Studio Core
//!
//! Document model and interaction engine for a single-page design editor.
//! Compiles to WASM so the same engine drives every front end.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                   Editor                    │
//! ├─────────────────────────────────────────────┤
//! │  Page Model      │  Interaction Controller  │
//! │  - Layers        │  - Move / resize         │
//! │  - Groups        │  - Rotate / marquee      │
//! │  - Z-order       │  - Guides / panning      │
//! ├─────────────────────────────────────────────┤
//! │  History         │  Selection & Viewport    │
//! │  - Undo / redo   │  - Derived facts         │
//! │  - Snapshots     │  - Zoom / pan            │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Every page operation returns a new page (or `None` when nothing changed),
//! so history snapshots are never mutated in place.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod group;
pub mod history;
pub mod interaction;
pub mod layer;
pub mod order;
pub mod page;
pub mod selection;
pub mod viewport;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, EditorResult, PageViolation};
pub use event::{InputEvent, KeyModifiers, PointerEvent, PointerPhase, PointerTarget};
pub use geometry::{Bounds, Geometry, Point};
pub use group::{Group, GroupId};
pub use history::History;
pub use interaction::{
    Commit, InteractionContext, InteractionController, InteractionKind, InteractionState,
    ResizeHandle, Tool,
};
pub use layer::{
    Fill, FontStyle, GradientStop, ImageContent, Layer, LayerId, LayerKind, LayerPatch,
    LayerVariant, ShapeContent, ShapeType, TextAlign, TextContent, TextDecoration, TextEffect,
    Typography,
};
pub use order::ReorderDirection;
pub use page::{Background, GuideAxis, Page, PaintItem};
pub use selection::{Selection, SelectionKind};
pub use viewport::Viewport;

/// Studio core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
