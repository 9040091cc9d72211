//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::{EditorError, EditorResult};

/// Minimum layer width/height in pixels.
pub const DEFAULT_MIN_LAYER_SIZE: f32 = 20.0;

/// Rotation snap increment in degrees.
pub const DEFAULT_ROTATION_SNAP: f32 = 15.0;

/// Tunable parameters for the editing engine.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Floor applied to width and height during resize.
    pub min_layer_size: f32,
    /// Rotation snap increment in degrees when the snap modifier is held.
    pub rotation_snap_degrees: f32,
    /// Hit radius of resize and rotate handles, in screen pixels.
    pub handle_radius: f32,
    /// Distance of the rotate handle above the layer's top edge.
    pub rotate_handle_offset: f32,
    /// Arrow-key nudge distance.
    pub nudge_step: f32,
    /// Arrow-key nudge distance with shift held; also the duplicate offset.
    pub nudge_step_large: f32,
    /// Maximum number of undo entries kept (`None` keeps all).
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_layer_size: DEFAULT_MIN_LAYER_SIZE,
            rotation_snap_degrees: DEFAULT_ROTATION_SNAP,
            handle_radius: 8.0,
            rotate_handle_offset: 24.0,
            nudge_step: 1.0,
            nudge_step_large: 10.0,
            history_limit: None,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> EditorResult<()> {
        let positive = [
            ("min_layer_size", self.min_layer_size),
            ("rotation_snap_degrees", self.rotation_snap_degrees),
            ("handle_radius", self.handle_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(EditorError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        let non_negative = [
            ("rotate_handle_offset", self.rotate_handle_offset),
            ("nudge_step", self.nudge_step),
            ("nudge_step_large", self.nudge_step_large),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(EditorError::InvalidConfig(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if self.history_limit == Some(0) {
            return Err(EditorError::InvalidConfig(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EditorConfig::from_json(r#"{"min_layer_size": 32.0}"#).expect("valid");
        assert!((config.min_layer_size - 32.0).abs() < f32::EPSILON);
        assert!((config.rotation_snap_degrees - DEFAULT_ROTATION_SNAP).abs() < f32::EPSILON);
        assert_eq!(config.history_limit, None);
    }

    #[test]
    fn test_rejects_non_positive_floor() {
        let err = EditorConfig::from_json(r#"{"min_layer_size": 0}"#).unwrap_err();
        assert!(err.to_string().contains("min_layer_size"));
    }

    #[test]
    fn test_rejects_zero_history_limit() {
        assert!(EditorConfig::from_json(r#"{"history_limit": 0}"#).is_err());
        assert!(EditorConfig::from_json(r#"{"history_limit": 50}"#).is_ok());
    }
}
