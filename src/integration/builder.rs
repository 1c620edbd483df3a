//! Builder for creating TrackedDetection objects from various box formats.

use crate::integration::source::TrackedDetection;

/// Builder for `TrackedDetection`, accepting the box formats trackers emit.
#[derive(Debug, Clone, Default)]
pub struct TrackedDetectionBuilder {
    track_id: u64,
    class_id: i64,
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl TrackedDetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_id(mut self, track_id: u64) -> Self {
        self.track_id = track_id;
        self
    }

    pub fn class_id(mut self, class_id: i64) -> Self {
        self.class_id = class_id;
        self
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, l: f32, t: f32, w: f32, h: f32) -> Self {
        self.x1 = l;
        self.y1 = t;
        self.x2 = l + w;
        self.y2 = t + h;
        self
    }

    pub fn build(self) -> TrackedDetection {
        TrackedDetection::new(
            self.track_id,
            self.x1,
            self.y1,
            self.x2,
            self.y2,
            self.class_id,
        )
    }
}
