//! Replays recorded tracker output from a JSON-lines stream.
//!
//! Each non-blank line holds one frame:
//!
//! ```text
//! {"frame": 12, "tracks": [{"id": 3, "class": 2, "bbox": [410.0, 220.0, 470.0, 268.0]}]}
//! ```
//!
//! `bbox` is `[x1, y1, x2, y2]` in pixels. Lines are replayed in file order.
//! `frame` is optional. When it jumps ahead, one empty frame is yielded per
//! skipped frame number so the idle clock matches the recording.

use std::io::BufRead;

use serde::Deserialize;
use thiserror::Error;

use crate::integration::source::{TrackSource, TrackedDetection};

/// Most empty frames yielded for a single jump in `frame`.
pub const MAX_FILLED_GAP: u64 = 100_000;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read track log at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed track record at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct FrameRecord {
    #[serde(default)]
    frame: Option<u64>,
    #[serde(default)]
    tracks: Vec<TrackRecord>,
}

#[derive(Debug, Deserialize)]
struct TrackRecord {
    id: u64,
    class: i64,
    bbox: [f32; 4],
}

impl From<TrackRecord> for TrackedDetection {
    fn from(record: TrackRecord) -> Self {
        let [x1, y1, x2, y2] = record.bbox;
        TrackedDetection::new(record.id, x1, y1, x2, y2, record.class)
    }
}

/// [`TrackSource`] over a recorded track log.
pub struct ReplaySource<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    last_frame: Option<u64>,
    missing: u64,
    pending: Option<Vec<TrackedDetection>>,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            last_frame: None,
            missing: 0,
            pending: None,
        }
    }

    /// Number of log lines read so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Returns the number of empty frames to yield before a record numbered
    /// `frame`.
    fn gap_before(&mut self, frame: Option<u64>) -> u64 {
        let Some(frame) = frame else {
            return 0;
        };
        let Some(last) = self.last_frame else {
            self.last_frame = Some(frame);
            return 0;
        };
        if frame <= last {
            log::warn!(
                "line {}: frame {} does not advance past frame {}",
                self.line_no,
                frame,
                last
            );
            return 0;
        }
        self.last_frame = Some(frame);

        let gap = frame - last - 1;
        if gap > MAX_FILLED_GAP {
            log::warn!(
                "line {}: {} missing frame(s) before frame {}, filling {}",
                self.line_no,
                gap,
                frame,
                MAX_FILLED_GAP
            );
            return MAX_FILLED_GAP;
        }
        gap
    }
}

impl<R: BufRead> TrackSource for ReplaySource<R> {
    type Error = ReplayError;

    fn next_frame(&mut self) -> Result<Option<Vec<TrackedDetection>>, Self::Error> {
        if self.missing > 0 {
            self.missing -= 1;
            return Ok(Some(Vec::new()));
        }
        if let Some(tracks) = self.pending.take() {
            return Ok(Some(tracks));
        }

        let record = loop {
            let Some(line) = self.lines.next() else {
                return Ok(None);
            };
            self.line_no += 1;
            let line = line.map_err(|source| ReplayError::Io {
                line: self.line_no,
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            break serde_json::from_str::<FrameRecord>(&line).map_err(|source| {
                ReplayError::Parse {
                    line: self.line_no,
                    source,
                }
            })?;
        };
        let tracks = record.tracks.into_iter().map(TrackedDetection::from).collect();

        let gap = self.gap_before(record.frame);
        if gap == 0 {
            return Ok(Some(tracks));
        }
        self.missing = gap - 1;
        self.pending = Some(tracks);
        Ok(Some(Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_frames_in_order() {
        let log = [
            r#"{"frame": 1, "tracks": [{"id": 1, "class": 2, "bbox": [0, 0, 10, 10]}]}"#,
            "",
            concat!(
                r#"{"frame": 2, "tracks": [{"id": 1, "class": 2, "bbox": [0, 4, 10, 14]}, "#,
                r#"{"id": 2, "class": 7, "bbox": [50, 50, 70, 90]}]}"#,
            ),
            r#"{"frame": 3, "tracks": []}"#,
        ]
        .join("\n");
        let mut source = ReplaySource::new(log.as_bytes());

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first, vec![TrackedDetection::new(1, 0.0, 0.0, 10.0, 10.0, 2)]);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[1].track_id, 2);
        assert_eq!(second[1].class_id, 7);

        assert!(source.next_frame().unwrap().unwrap().is_empty());
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let log = "{\"tracks\": []}\n{\"tracks\": [{\"id\": 1}]}\n";
        let mut source = ReplaySource::new(log.as_bytes());
        assert!(source.next_frame().unwrap().is_some());

        match source.next_frame() {
            Err(ReplayError::Parse { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_skipped_frame_numbers_yield_empty_frames() {
        let log = [
            r#"{"frame": 7, "tracks": [{"id": 1, "class": 2, "bbox": [0, 0, 10, 10]}]}"#,
            r#"{"frame": 10, "tracks": [{"id": 1, "class": 2, "bbox": [0, 4, 10, 14]}]}"#,
            r#"{"frame": 11, "tracks": []}"#,
        ]
        .join("\n");
        let mut source = ReplaySource::new(log.as_bytes());

        let sizes: Vec<usize> = std::iter::from_fn(|| source.next_frame().unwrap())
            .map(|frame| frame.len())
            .collect();
        assert_eq!(sizes, vec![1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_unnumbered_or_repeated_frames_are_not_filled() {
        let log = [
            r#"{"tracks": [{"id": 1, "class": 2, "bbox": [0, 0, 10, 10]}]}"#,
            r#"{"frame": 4, "tracks": []}"#,
            r#"{"frame": 4, "tracks": []}"#,
            r#"{"frame": 2, "tracks": []}"#,
            r#"{"tracks": []}"#,
        ]
        .join("\n");
        let mut source = ReplaySource::new(log.as_bytes());

        let mut frames = 0;
        while source.next_frame().unwrap().is_some() {
            frames += 1;
        }
        assert_eq!(frames, 5);
        assert_eq!(source.line_no(), 5);
    }
}
