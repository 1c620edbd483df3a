//! Per-line crossing decision and counting.

use std::collections::HashSet;

use ndarray::{Array2, ArrayView1, Axis};

use crate::counter::geometry::{self, Position};
use crate::counter::history::TrackHistory;
use crate::counter::line::DetectionLine;
use crate::counter::report::CountReport;
use crate::counter::vehicle_class::VehicleClass;

/// Default fallback corridor half-width, in pixels.
pub const DEFAULT_PROXIMITY_PX: f64 = 8.0;

/// Per-class crossing counts for one line, or summed over lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassTally([u64; VehicleClass::COUNT]);

impl ClassTally {
    fn from_row(row: ArrayView1<'_, u64>) -> Self {
        let mut counts = [0; VehicleClass::COUNT];
        for (slot, value) in counts.iter_mut().zip(row.iter()) {
            *slot = *value;
        }
        Self(counts)
    }

    /// Get the count for one class.
    pub fn get(&self, class: VehicleClass) -> u64 {
        self.0[class.index()]
    }

    /// Sum over all classes.
    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// Classes with a non-zero count, in tally order.
    pub fn non_zero(&self) -> impl Iterator<Item = (VehicleClass, u64)> + '_ {
        VehicleClass::ALL
            .iter()
            .map(|class| (*class, self.get(*class)))
            .filter(|(_, count)| *count > 0)
    }
}

/// A track credited to a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossingEvent {
    pub line_index: usize,
    pub track_id: u64,
    pub class: VehicleClass,
    /// Line total after this crossing.
    pub line_total: u64,
}

/// Counts tracks crossing a fixed set of detection lines.
///
/// Each track is credited at most once per line for the lifetime of the
/// counter. Per-line state is kept in parallel, indexed by line index.
#[derive(Debug, Clone)]
pub struct LineCounter {
    lines: Vec<DetectionLine>,
    crossed: Vec<HashSet<u64>>,
    totals: Vec<u64>,
    /// Rows are lines, columns are `VehicleClass::index()`.
    tallies: Array2<u64>,
    proximity: f64,
}

impl LineCounter {
    /// Create a counter over `lines` with the default proximity.
    pub fn new(lines: Vec<DetectionLine>) -> Self {
        for line in lines.iter().filter(|line| line.is_degenerate()) {
            log::warn!("{} has coincident endpoints and will never count", line.name());
        }

        let n = lines.len();
        Self {
            lines,
            crossed: vec![HashSet::new(); n],
            totals: vec![0; n],
            tallies: Array2::zeros((n, VehicleClass::COUNT)),
            proximity: DEFAULT_PROXIMITY_PX,
        }
    }

    /// Set the distance under which the side-flip fallback applies.
    ///
    /// Non-finite or non-positive values are ignored and the current
    /// proximity is kept.
    pub fn with_proximity(mut self, proximity: f64) -> Self {
        if proximity.is_finite() && proximity > 0.0 {
            self.proximity = proximity;
        } else {
            log::warn!("ignoring proximity {}, keeping {}px", proximity, self.proximity);
        }
        self
    }

    /// Get the fallback proximity in pixels.
    pub fn proximity(&self) -> f64 {
        self.proximity
    }

    /// Get the configured lines, in index order.
    pub fn lines(&self) -> &[DetectionLine] {
        &self.lines
    }

    /// Check one tracked detection against every line and record crossings.
    ///
    /// `previous` is the track's second-to-last position read before
    /// `history` was updated with `current`; `history` must already contain
    /// `current`.
    pub fn check(
        &mut self,
        track_id: u64,
        current: Position,
        previous: Option<Position>,
        class: VehicleClass,
        history: &TrackHistory,
    ) -> Vec<CrossingEvent> {
        let Some(previous) = previous else {
            return Vec::new();
        };

        let mut events = Vec::new();
        for line_index in 0..self.lines.len() {
            if self.crossed[line_index].contains(&track_id) {
                continue;
            }
            if self.is_crossing(line_index, track_id, current, previous, history) {
                events.push(self.record(line_index, track_id, class));
            }
        }
        events
    }

    fn is_crossing(
        &self,
        line_index: usize,
        track_id: u64,
        current: Position,
        previous: Position,
        history: &TrackHistory,
    ) -> bool {
        let line = &self.lines[line_index];
        if line.is_degenerate() {
            return false;
        }
        let (start, end) = (line.start(), line.end());

        if geometry::segments_intersect(previous, current, start, end) {
            return true;
        }

        // Fallback: close to the line and on the other side than the entry
        // before `current`.
        let distance = geometry::distance_to_segment(current, start, end);
        if distance.is_nan() || distance >= self.proximity {
            return false;
        }
        if history.track_len(track_id) < 2 {
            return false;
        }
        let Some(before) = history.previous(track_id) else {
            return false;
        };
        geometry::side_of(before, start, end) * geometry::side_of(current, start, end) < 0.0
    }

    fn record(&mut self, line_index: usize, track_id: u64, class: VehicleClass) -> CrossingEvent {
        self.crossed[line_index].insert(track_id);
        self.totals[line_index] += 1;
        self.tallies[[line_index, class.index()]] += 1;

        let line_total = self.totals[line_index];
        log::info!(
            "vehicle {} ({}) crossed {}, line count {}",
            track_id,
            class,
            self.lines[line_index].name(),
            line_total
        );

        CrossingEvent {
            line_index,
            track_id,
            class,
            line_total,
        }
    }

    /// Whether the track has already been credited to the line.
    pub fn has_crossed(&self, line_index: usize, track_id: u64) -> bool {
        self.crossed
            .get(line_index)
            .is_some_and(|ids| ids.contains(&track_id))
    }

    /// Total crossings of one line. Zero for an out-of-range index.
    pub fn line_count(&self, line_index: usize) -> u64 {
        self.totals.get(line_index).copied().unwrap_or(0)
    }

    /// Get all line totals, in line index order.
    pub fn line_counts(&self) -> &[u64] {
        &self.totals
    }

    /// Per-class counts of one line. Empty for an out-of-range index.
    pub fn class_counts(&self, line_index: usize) -> ClassTally {
        if line_index >= self.lines.len() {
            return ClassTally::default();
        }
        ClassTally::from_row(self.tallies.row(line_index))
    }

    /// Per-class counts summed over all lines.
    pub fn class_totals(&self) -> ClassTally {
        ClassTally::from_row(self.tallies.sum_axis(Axis(0)).view())
    }

    /// Sum of all line totals. A track crossing two lines is counted twice.
    pub fn total_count(&self) -> u64 {
        self.totals.iter().sum()
    }

    /// Snapshot the current counts.
    pub fn report(&self) -> CountReport {
        CountReport::from_counter(self)
    }
}
