//! Detection lines configured before counting starts.

use serde::{Deserialize, Serialize};

use crate::counter::geometry::{self, Position};

/// Display color as a BGR byte triple, the channel order of the video stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineColor(pub [u8; 3]);

impl LineColor {
    /// Colors assigned to lines in configuration order when none is given.
    pub const PALETTE: [LineColor; 6] = [
        LineColor([0, 0, 255]),
        LineColor([0, 255, 0]),
        LineColor([255, 0, 0]),
        LineColor([255, 255, 0]),
        LineColor([255, 0, 255]),
        LineColor([0, 255, 255]),
    ];

    /// Palette color for the line at `index`, cycling when lines outnumber colors.
    pub fn for_index(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }
}

/// A counting line segment in frame-pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionLine {
    start: Position,
    end: Position,
    name: String,
    color: LineColor,
}

impl DetectionLine {
    /// Create a line from `start` to `end` with an explicit name and color.
    pub fn new(start: Position, end: Position, name: impl Into<String>, color: LineColor) -> Self {
        Self {
            start,
            end,
            name: name.into(),
            color,
        }
    }

    /// Line with the default name (`Line {index + 1}`) and palette color.
    pub fn numbered(index: usize, start: Position, end: Position) -> Self {
        Self::new(
            start,
            end,
            format!("Line {}", index + 1),
            LineColor::for_index(index),
        )
    }

    /// Get the first endpoint.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Get the second endpoint.
    pub fn end(&self) -> Position {
        self.end
    }

    /// Get the display name used in logs and reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the BGR drawing color.
    pub fn color(&self) -> LineColor {
        self.color
    }

    /// Midpoint, where renderers place the line label.
    pub fn midpoint(&self) -> Position {
        nalgebra::center(&self.start, &self.end)
    }

    /// True when both endpoints coincide. Such a line never counts anything.
    pub fn is_degenerate(&self) -> bool {
        geometry::is_degenerate(self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_line_defaults() {
        let line = DetectionLine::numbered(0, Position::new(0.0, 0.0), Position::new(10.0, 0.0));
        assert_eq!(line.name(), "Line 1");
        assert_eq!(line.color(), LineColor([0, 0, 255]));

        let seventh = DetectionLine::numbered(6, Position::new(0.0, 0.0), Position::new(1.0, 0.0));
        assert_eq!(seventh.name(), "Line 7");
        assert_eq!(seventh.color(), LineColor::PALETTE[0]);
    }

    #[test]
    fn test_midpoint_and_degenerate() {
        let line = DetectionLine::numbered(0, Position::new(0.0, 0.0), Position::new(10.0, 20.0));
        assert_eq!(line.midpoint(), Position::new(5.0, 10.0));
        assert!(!line.is_degenerate());

        let dot = DetectionLine::numbered(1, Position::new(3.0, 3.0), Position::new(3.0, 3.0));
        assert!(dot.is_degenerate());
    }
}
