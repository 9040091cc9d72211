//! View transform between screen and page coordinates.

use serde::{Deserialize, Serialize};

use crate::Point;

/// Smallest zoom level.
pub const MIN_ZOOM: f32 = 0.1;

/// Largest zoom level.
pub const MAX_ZOOM: f32 = 8.0;

/// Zoom and pan of the editor view. Never part of the undo history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom level (1.0 = 100%).
    pub zoom: f32,
    /// Pan offset X.
    pub pan_x: f32,
    /// Pan offset Y.
    pub pan_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    /// Convert a screen point into page space.
    #[must_use]
    pub fn to_page(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    /// Convert a page point into screen space.
    #[must_use]
    pub fn to_screen(&self, page: Point) -> Point {
        Point::new(
            page.x * self.zoom + self.pan_x,
            page.y * self.zoom + self.pan_y,
        )
    }

    /// Convert a screen distance into a page distance.
    #[must_use]
    pub fn page_distance(&self, screen: f32) -> f32 {
        screen / self.zoom
    }

    /// Zoom by `factor`, keeping the page point under `anchor` fixed on screen.
    ///
    /// Returns whether the zoom level changed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (zoom - self.zoom).abs() < f32::EPSILON {
            return false;
        }
        let fixed = self.to_page(anchor);
        self.zoom = zoom;
        self.pan_x = anchor.x - fixed.x * zoom;
        self.pan_y = anchor.y - fixed.y * zoom;
        true
    }
}
