use serde::{Deserialize, Serialize};

use crate::counter::Position;

/// Detector bounding box, stored as top-left corner plus size (TLWH).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from corners (x1, y1, x2, y2).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Create a Rect from its center and size.
    #[inline]
    pub fn from_xywh(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self {
            x: cx - width / 2.0,
            y: cy - height / 2.0,
            width,
            height,
        }
    }

    /// Corners as `[x1, y1, x2, y2]`.
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Box center, `((x1 + x2) / 2, (y1 + y2) / 2)`, widened to f64.
    #[inline]
    pub fn center(&self) -> Position {
        let [x1, y1, x2, y2] = self.to_tlbr().map(f64::from);
        Position::new((x1 + x2) / 2.0, (y1 + y2) / 2.0)
    }
}
