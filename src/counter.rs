pub mod geometry;
mod history;
mod line;
mod line_counter;
mod report;
mod vehicle_class;

pub use geometry::Position;
pub use history::{DEFAULT_HISTORY_LEN, TrackHistory};
pub use line::{DetectionLine, LineColor};
pub use line_counter::{ClassTally, CrossingEvent, DEFAULT_PROXIMITY_PX, LineCounter};
pub use report::{ClassShare, CountReport, LineReport};
pub use vehicle_class::{ClassMap, ClassResolver, VehicleClass};
