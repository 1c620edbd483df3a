//! Trait for per-frame sources of tracked detections.

use serde::{Deserialize, Serialize};

use crate::counter::Position;
use crate::integration::rect::Rect;

/// One tracked object in one frame, as reported by an external tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackedDetection {
    /// Identity kept stable by the tracker across frames
    pub track_id: u64,
    pub bbox: Rect,
    /// Raw detector class id, resolved through a `ClassResolver`
    pub class_id: i64,
}

impl TrackedDetection {
    pub fn new(track_id: u64, x1: f32, y1: f32, x2: f32, y2: f32, class_id: i64) -> Self {
        Self {
            track_id,
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            class_id,
        }
    }

    /// Position used for counting: the box center.
    pub fn center(&self) -> Position {
        self.bbox.center()
    }
}

/// Source of tracked detections, one batch per video frame.
///
/// Implement this to connect any detector/tracker combination to the
/// counting pipeline.
///
/// # Example
///
/// ```ignore
/// use traffic_counter::{TrackSource, TrackedDetection};
///
/// struct MyTracker {
///     // Your model and tracker here
/// }
///
/// impl TrackSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<Vec<TrackedDetection>>, Self::Error> {
///         // Decode a frame, detect, track
///         Ok(None)
///     }
/// }
/// ```
pub trait TrackSource {
    /// Error type for source failures.
    type Error;

    /// Tracked detections of the next frame, or `None` once the stream ends.
    ///
    /// A frame without detections is `Some(vec![])`, not `None`.
    fn next_frame(&mut self) -> Result<Option<Vec<TrackedDetection>>, Self::Error>;
}

/// Helper trait for converting tracker-specific outputs to `TrackedDetection`.
pub trait IntoTrackedDetections {
    fn into_tracked_detections(self) -> Vec<TrackedDetection>;
}

impl IntoTrackedDetections for Vec<TrackedDetection> {
    fn into_tracked_detections(self) -> Vec<TrackedDetection> {
        self
    }
}

impl<I: IntoTrackedDetections> TrackSource for std::vec::IntoIter<I> {
    type Error = std::convert::Infallible;

    fn next_frame(&mut self) -> Result<Option<Vec<TrackedDetection>>, Self::Error> {
        Ok(self.next().map(IntoTrackedDetections::into_tracked_detections))
    }
}
