//! CountingPipeline for combining a track source with line counting.

use crate::config::CounterConfig;
use crate::counter::{
    ClassMap, ClassResolver, CountReport, CrossingEvent, LineCounter, TrackHistory,
};
use crate::integration::source::{TrackSource, TrackedDetection};

/// What happened while processing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    /// Zero-based index of the processed frame
    pub frame: u64,
    /// Number of tracked detections in the frame
    pub detections: usize,
    pub crossings: Vec<CrossingEvent>,
    /// Track histories dropped after the frame
    pub evicted: usize,
}

/// Drives a [`TrackSource`] through history and line counting, frame by frame.
///
/// Stopping between frames needs no cleanup: counts are consistent after
/// every processed frame.
pub struct CountingPipeline<S, C = ClassMap> {
    source: S,
    resolver: C,
    history: TrackHistory,
    counter: LineCounter,
    max_idle_frames: u64,
}

impl<S: TrackSource> CountingPipeline<S> {
    /// Create a pipeline using the configured lines, thresholds and class map.
    pub fn new(source: S, config: &CounterConfig) -> Self {
        Self::with_resolver(source, config, config.classes.clone())
    }
}

impl<S: TrackSource, C: ClassResolver> CountingPipeline<S, C> {
    /// Create a pipeline with a custom class resolver.
    pub fn with_resolver(source: S, config: &CounterConfig, resolver: C) -> Self {
        Self {
            source,
            resolver,
            history: config.history(),
            counter: config.counter(),
            max_idle_frames: config.max_idle_frames,
        }
    }

    /// Count one frame's detections without pulling from the source.
    pub fn process_detections(&mut self, detections: &[TrackedDetection]) -> FrameSummary {
        let frame = self.history.frame();
        let mut crossings = Vec::new();

        for det in detections {
            let track_id = det.track_id;
            let current = det.center();
            let previous = self.history.previous(track_id);
            self.history.update(track_id, current);

            let class = self.resolver.resolve(det.class_id);
            let events = self.counter.check(track_id, current, previous, class, &self.history);
            crossings.extend(events);
        }

        let evicted = self.history.evict_stale(self.max_idle_frames);
        if evicted > 0 {
            log::debug!(
                "frame {}: evicted {} idle track(s), {} remaining",
                frame,
                evicted,
                self.history.len()
            );
        }
        self.history.advance_frame();

        FrameSummary {
            frame,
            detections: detections.len(),
            crossings,
            evicted,
        }
    }

    /// Pull the next frame from the source and count it.
    ///
    /// Returns `Ok(None)` once the source is exhausted.
    pub fn process_frame(&mut self) -> Result<Option<FrameSummary>, S::Error> {
        match self.source.next_frame()? {
            Some(detections) => Ok(Some(self.process_detections(&detections))),
            None => Ok(None),
        }
    }

    /// Process frames until the source is exhausted and return the final counts.
    pub fn run(&mut self) -> Result<CountReport, S::Error> {
        while self.process_frame()?.is_some() {}
        Ok(self.counter.report())
    }

    /// Snapshot the counts so far.
    pub fn report(&self) -> CountReport {
        self.counter.report()
    }

    /// Get a reference to the underlying line counter.
    pub fn counter(&self) -> &LineCounter {
        &self.counter
    }

    /// Get a reference to the track history.
    pub fn history(&self) -> &TrackHistory {
        &self.history
    }

    /// Get a reference to the underlying track source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying track source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
