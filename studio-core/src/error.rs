//! Error types for editor boundary operations.
//!
//! Editing operations themselves never fail: updates to missing layers are
//! no-ops and geometry is clamped. Only values crossing the core boundary
//! (JSON, externally generated pages, configuration) can be rejected.

use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Errors that can occur at the editor boundary.
#[derive(Debug, Error)]
pub enum EditorError {
    /// A supplied page violates a structural invariant.
    #[error("Invalid page: {0}")]
    InvalidPage(#[from] PageViolation),

    /// Page, event or config serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A single structural invariant violation found in a page.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PageViolation {
    /// Two layers share the same identifier.
    #[error("duplicate layer id {0}")]
    DuplicateLayerId(String),

    /// Two groups share the same identifier.
    #[error("duplicate group id {0}")]
    DuplicateGroupId(String),

    /// A layer references a group that is not registered on the page.
    #[error("layer {layer} references unknown group {group}")]
    DanglingGroup {
        /// Offending layer.
        layer: String,
        /// Missing group.
        group: String,
    },

    /// A layer is smaller than the minimum size.
    #[error("layer {layer} is {width}x{height}, below the {min}px floor")]
    BelowMinimumSize {
        /// Offending layer.
        layer: String,
        /// Layer width.
        width: f32,
        /// Layer height.
        height: f32,
        /// Minimum allowed extent.
        min: f32,
    },

    /// Opacity outside `0.0..=1.0`.
    #[error("layer {layer} has opacity {opacity} outside 0..=1")]
    OpacityOutOfRange {
        /// Offending layer.
        layer: String,
        /// Stored opacity.
        opacity: f32,
    },

    /// NaN or infinite geometry.
    #[error("layer {0} has non-finite geometry")]
    NonFiniteGeometry(String),

    /// Page dimensions must be positive.
    #[error("page size {width}x{height} is not positive")]
    InvalidPageSize {
        /// Page width.
        width: f32,
        /// Page height.
        height: f32,
    },
}
