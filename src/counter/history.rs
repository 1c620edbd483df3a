//! Bounded per-track position history.

use std::collections::{HashMap, VecDeque};

use crate::counter::geometry::Position;

/// Default number of positions kept per track.
pub const DEFAULT_HISTORY_LEN: usize = 5;

#[derive(Debug, Clone)]
struct TrackTrail {
    positions: VecDeque<Position>,
    /// Frame clock value at the last `update`.
    last_seen: u64,
}

/// Recent box-center positions for every track identity, newest last.
///
/// Each trail is bounded and drops its oldest entry first. Trails are created
/// lazily by [`TrackHistory::update`] and only removed by
/// [`TrackHistory::evict_stale`].
#[derive(Debug, Clone)]
pub struct TrackHistory {
    trails: HashMap<u64, TrackTrail>,
    capacity: usize,
    frame: u64,
}

impl Default for TrackHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl TrackHistory {
    /// Create a history keeping at most `capacity` positions per track.
    ///
    /// Capacities below 2 are raised to 2, since a crossing needs a
    /// displacement.
    pub fn new(capacity: usize) -> Self {
        Self {
            trails: HashMap::new(),
            capacity: capacity.max(2),
            frame: 0,
        }
    }

    /// Maximum number of positions kept per track.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current value of the frame clock.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Append `position` to the track's trail, dropping the oldest entry when
    /// the trail is full.
    pub fn update(&mut self, track_id: u64, position: Position) {
        let frame = self.frame;
        let capacity = self.capacity;
        let trail = self.trails.entry(track_id).or_insert_with(|| TrackTrail {
            positions: VecDeque::with_capacity(capacity + 1),
            last_seen: frame,
        });

        trail.positions.push_back(position);
        if trail.positions.len() > capacity {
            trail.positions.pop_front();
        }
        trail.last_seen = frame;
    }

    /// Second-to-last recorded position, if the track has at least two.
    ///
    /// Query this before calling [`update`](Self::update) for the current
    /// frame: `update` shifts the trail this reads from.
    pub fn previous(&self, track_id: u64) -> Option<Position> {
        let positions = &self.trails.get(&track_id)?.positions;
        if positions.len() < 2 {
            return None;
        }
        positions.get(positions.len() - 2).copied()
    }

    /// Most recent position of the track.
    pub fn latest(&self, track_id: u64) -> Option<Position> {
        self.trails.get(&track_id)?.positions.back().copied()
    }

    /// Recorded positions of the track, oldest first. Empty for unknown tracks.
    pub fn positions(&self, track_id: u64) -> impl Iterator<Item = Position> + '_ {
        self.trails
            .get(&track_id)
            .into_iter()
            .flat_map(|trail| trail.positions.iter().copied())
    }

    /// Number of positions recorded for the track.
    pub fn track_len(&self, track_id: u64) -> usize {
        self.trails
            .get(&track_id)
            .map_or(0, |trail| trail.positions.len())
    }

    /// Whether the track currently has a trail.
    pub fn contains(&self, track_id: u64) -> bool {
        self.trails.contains_key(&track_id)
    }

    /// Number of tracks with a trail.
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    /// Whether no track has a trail.
    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    /// Advance the frame clock by one. Call once per processed frame.
    pub fn advance_frame(&mut self) {
        self.frame += 1;
    }

    /// Remove trails that have missed more than `max_idle_frames` frames,
    /// counted against the current frame clock.
    ///
    /// Returns the number of trails removed. `max_idle_frames == 0` disables
    /// eviction.
    pub fn evict_stale(&mut self, max_idle_frames: u64) -> usize {
        if max_idle_frames == 0 {
            return 0;
        }
        let frame = self.frame;
        let before = self.trails.len();
        self.trails
            .retain(|_, trail| frame.saturating_sub(trail.last_seen) <= max_idle_frames);
        before - self.trails.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_previous_needs_two_positions() {
        let mut history = TrackHistory::default();
        assert_eq!(history.previous(1), None);

        history.update(1, p(1.0, 1.0));
        assert_eq!(history.previous(1), None);
        assert_eq!(history.latest(1), Some(p(1.0, 1.0)));

        history.update(1, p(2.0, 2.0));
        assert_eq!(history.previous(1), Some(p(1.0, 1.0)));

        history.update(1, p(3.0, 3.0));
        assert_eq!(history.previous(1), Some(p(2.0, 2.0)));
    }

    #[test]
    fn test_trail_is_bounded_fifo() {
        let mut history = TrackHistory::default();
        for i in 0..6 {
            history.update(7, p(i as f64, 0.0));
        }
        let kept: Vec<f64> = history.positions(7).map(|pos| pos.x).collect();
        assert_eq!(kept, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(history.track_len(7), 5);
    }

    #[test]
    fn test_tracks_are_independent() {
        let mut history = TrackHistory::default();
        history.update(1, p(0.0, 0.0));
        history.update(2, p(10.0, 10.0));
        history.update(1, p(1.0, 0.0));

        assert_eq!(history.len(), 2);
        assert_eq!(history.track_len(1), 2);
        assert_eq!(history.track_len(2), 1);
        assert_eq!(history.positions(3).count(), 0);
    }

    #[test]
    fn test_capacity_floor() {
        let history = TrackHistory::new(0);
        assert_eq!(history.capacity(), 2);
    }

    #[test]
    fn test_evict_stale() {
        let mut history = TrackHistory::default();
        history.update(1, p(0.0, 0.0));
        history.update(2, p(0.0, 0.0));

        for _ in 0..3 {
            history.advance_frame();
            history.update(2, p(1.0, 1.0));
        }
        // Track 1 idle for 3 frames, track 2 for 0.
        assert_eq!(history.evict_stale(3), 0);
        assert_eq!(history.evict_stale(2), 1);
        assert!(!history.contains(1));
        assert!(history.contains(2));
    }

    #[test]
    fn test_evict_disabled() {
        let mut history = TrackHistory::default();
        history.update(1, p(0.0, 0.0));
        for _ in 0..1000 {
            history.advance_frame();
        }
        assert_eq!(history.evict_stale(0), 0);
        assert!(history.contains(1));
    }
}
