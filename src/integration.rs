//! Integration module for connecting external detectors and trackers with
//! line counting.
//!
//! This module provides the per-frame input types, a trait for track sources,
//! a replay source for recorded tracker output, and the pipeline that feeds
//! box centers through the track history into the line counter.

mod builder;
mod pipeline;
mod rect;
mod replay;
mod source;

pub use builder::TrackedDetectionBuilder;
pub use pipeline::{CountingPipeline, FrameSummary};
pub use rect::Rect;
pub use replay::{ReplayError, ReplaySource};
pub use source::{IntoTrackedDetections, TrackSource, TrackedDetection};
