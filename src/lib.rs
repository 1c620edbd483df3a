//! Vehicle counting on user-defined detection lines.
//!
//! Each tracked vehicle keeps a short trail of box centers. A vehicle is
//! credited to a line when the movement between sampled positions intersects
//! the line segment, or, near the line, when its last two positions fall on
//! opposite sides. Every track is counted at most once per line.

pub mod config;
pub mod counter;
pub mod integration;

pub use config::{ConfigError, CounterConfig};
pub use counter::{
    ClassMap, ClassResolver, ClassTally, CountReport, CrossingEvent, DetectionLine, LineColor,
    LineCounter, Position, TrackHistory, VehicleClass,
};
pub use integration::{
    CountingPipeline, FrameSummary, IntoTrackedDetections, Rect, ReplayError, ReplaySource,
    TrackSource, TrackedDetection, TrackedDetectionBuilder,
};
