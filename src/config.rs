//! Counter configuration loaded from TOML.
//!
//! ```toml
//! [counter]
//! history_len = 5
//! proximity_px = 8.0
//! max_idle_frames = 150
//!
//! [classes]
//! car = [2]
//! truck = [7, 8]
//!
//! [[lines]]
//! name = "North gate"
//! start = [100.0, 400.0]
//! end = [900.0, 400.0]
//! color = [0, 0, 255]
//! ```
//!
//! Every key except `lines` is optional.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::counter::{
    ClassMap, DEFAULT_HISTORY_LEN, DEFAULT_PROXIMITY_PX, DetectionLine, LineColor, LineCounter,
    Position, TrackHistory, VehicleClass,
};

/// Frames a track may go unseen before its history is dropped.
pub const DEFAULT_MAX_IDLE_FRAMES: u64 = 150;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("at least one detection line is required")]
    NoLines,
    #[error("line {index} has a non-finite coordinate")]
    NonFiniteLine { index: usize },
    #[error("history_len must be at least 2, got {0}")]
    HistoryTooShort(usize),
    #[error("proximity_px must be positive and finite, got {0}")]
    InvalidProximity(f64),
    #[error("class id {class_id} is mapped to both {first} and {second}")]
    ConflictingClassId {
        class_id: i64,
        first: VehicleClass,
        second: VehicleClass,
    },
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    counter: Option<CounterSection>,
    classes: Option<ClassesSection>,
    #[serde(default)]
    lines: Vec<LineSection>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct CounterSection {
    history_len: Option<usize>,
    proximity_px: Option<f64>,
    max_idle_frames: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ClassesSection {
    car: Option<Vec<i64>>,
    motorcycle: Option<Vec<i64>>,
    bus: Option<Vec<i64>>,
    truck: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LineSection {
    name: Option<String>,
    start: [f64; 2],
    end: [f64; 2],
    color: Option<[u8; 3]>,
}

/// Validated counter configuration.
#[derive(Debug, Clone)]
pub struct CounterConfig {
    pub lines: Vec<DetectionLine>,
    pub history_len: usize,
    pub proximity_px: f64,
    /// Zero disables history eviction.
    pub max_idle_frames: u64,
    pub classes: ClassMap,
}

impl CounterConfig {
    /// Configuration for `lines` with every other setting at its default.
    pub fn with_lines(lines: Vec<DetectionLine>) -> Self {
        Self {
            lines,
            history_len: DEFAULT_HISTORY_LEN,
            proximity_px: DEFAULT_PROXIMITY_PX,
            max_idle_frames: DEFAULT_MAX_IDLE_FRAMES,
            classes: ClassMap::coco(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml(&raw)?;
        log::info!(
            "loaded {} detection line(s) from {}",
            cfg.lines.len(),
            path.display()
        );
        Ok(cfg)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(raw)?;
        let cfg = Self::from_file(file)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let counter = file.counter.unwrap_or_default();
        let classes = match file.classes {
            Some(section) => class_map(section)?,
            None => ClassMap::coco(),
        };

        let lines = file
            .lines
            .into_iter()
            .enumerate()
            .map(|(index, line)| {
                let start = Position::new(line.start[0], line.start[1]);
                let end = Position::new(line.end[0], line.end[1]);
                let name = line.name.unwrap_or_else(|| format!("Line {}", index + 1));
                let color = line
                    .color
                    .map(LineColor)
                    .unwrap_or_else(|| LineColor::for_index(index));
                DetectionLine::new(start, end, name, color)
            })
            .collect();

        Ok(Self {
            lines,
            history_len: counter.history_len.unwrap_or(DEFAULT_HISTORY_LEN),
            proximity_px: counter.proximity_px.unwrap_or(DEFAULT_PROXIMITY_PX),
            max_idle_frames: counter.max_idle_frames.unwrap_or(DEFAULT_MAX_IDLE_FRAMES),
            classes,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lines.is_empty() {
            return Err(ConfigError::NoLines);
        }
        for (index, line) in self.lines.iter().enumerate() {
            let coords = [line.start().x, line.start().y, line.end().x, line.end().y];
            if coords.iter().any(|c| !c.is_finite()) {
                return Err(ConfigError::NonFiniteLine { index });
            }
        }
        if self.history_len < 2 {
            return Err(ConfigError::HistoryTooShort(self.history_len));
        }
        if !(self.proximity_px.is_finite() && self.proximity_px > 0.0) {
            return Err(ConfigError::InvalidProximity(self.proximity_px));
        }
        Ok(())
    }

    /// Empty history sized by this configuration.
    pub fn history(&self) -> TrackHistory {
        TrackHistory::new(self.history_len)
    }

    /// Fresh counter over the configured lines.
    pub fn counter(&self) -> LineCounter {
        LineCounter::new(self.lines.clone()).with_proximity(self.proximity_px)
    }
}

fn class_map(section: ClassesSection) -> Result<ClassMap, ConfigError> {
    let mut map = ClassMap::empty();
    let groups = [
        (VehicleClass::Car, section.car),
        (VehicleClass::Motorcycle, section.motorcycle),
        (VehicleClass::Bus, section.bus),
        (VehicleClass::Truck, section.truck),
    ];
    for (class, ids) in groups {
        for class_id in ids.unwrap_or_default() {
            if let Some(first) = map.insert(class_id, class) {
                if first != class {
                    return Err(ConfigError::ConflictingClassId {
                        class_id,
                        first,
                        second: class,
                    });
                }
            }
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::ClassResolver;

    const MINIMAL: &str = r#"
[[lines]]
start = [0.0, 100.0]
end = [640.0, 100.0]
"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = CounterConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(cfg.lines.len(), 1);
        assert_eq!(cfg.lines[0].name(), "Line 1");
        assert_eq!(cfg.lines[0].color(), LineColor::PALETTE[0]);
        assert_eq!(cfg.history_len, 5);
        assert_eq!(cfg.proximity_px, 8.0);
        assert_eq!(cfg.max_idle_frames, DEFAULT_MAX_IDLE_FRAMES);
        assert_eq!(cfg.classes, ClassMap::coco());
    }

    #[test]
    fn test_full_config() {
        let raw = r#"
[counter]
history_len = 8
proximity_px = 12.5
max_idle_frames = 0

[classes]
car = [1, 2]
truck = [7]

[[lines]]
name = "North"
start = [0.0, 0.0]
end = [10.0, 0.0]
color = [1, 2, 3]

[[lines]]
start = [0.0, 5.0]
end = [10.0, 5.0]
"#;
        let cfg = CounterConfig::from_toml(raw).unwrap();
        assert_eq!(cfg.history_len, 8);
        assert_eq!(cfg.proximity_px, 12.5);
        assert_eq!(cfg.max_idle_frames, 0);
        assert_eq!(cfg.classes.resolve(1), VehicleClass::Car);
        assert_eq!(cfg.classes.resolve(7), VehicleClass::Truck);
        assert_eq!(cfg.classes.resolve(5), VehicleClass::Unknown);
        assert_eq!(cfg.lines[0].name(), "North");
        assert_eq!(cfg.lines[0].color(), LineColor([1, 2, 3]));
        assert_eq!(cfg.lines[1].name(), "Line 2");
        assert_eq!(cfg.lines[1].color(), LineColor::PALETTE[1]);

        assert_eq!(cfg.counter().proximity(), 12.5);
        assert_eq!(cfg.history().capacity(), 8);
    }

    #[test]
    fn test_rejects_missing_lines() {
        let err = CounterConfig::from_toml("[counter]\nhistory_len = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::NoLines));
    }

    #[test]
    fn test_rejects_short_history() {
        let raw = format!("[counter]\nhistory_len = 1\n{MINIMAL}");
        let err = CounterConfig::from_toml(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::HistoryTooShort(1)));
    }

    #[test]
    fn test_rejects_bad_proximity() {
        let raw = format!("[counter]\nproximity_px = 0.0\n{MINIMAL}");
        let err = CounterConfig::from_toml(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProximity(_)));
    }

    #[test]
    fn test_rejects_non_finite_line() {
        let raw = "[[lines]]\nstart = [0.0, nan]\nend = [1.0, 1.0]\n";
        let err = CounterConfig::from_toml(raw).unwrap_err();
        assert!(matches!(err, ConfigError::NonFiniteLine { index: 0 }));
    }

    #[test]
    fn test_rejects_conflicting_class_ids() {
        let raw = format!("[classes]\ncar = [2]\nbus = [2]\n{MINIMAL}");
        let err = CounterConfig::from_toml(&raw).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConflictingClassId {
                class_id: 2,
                first: VehicleClass::Car,
                second: VehicleClass::Bus,
            }
        ));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let raw = format!("[counter]\nthreshold = 3\n{MINIMAL}");
        assert!(matches!(
            CounterConfig::from_toml(&raw).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_degenerate_line_is_accepted() {
        let raw = "[[lines]]\nstart = [5.0, 5.0]\nend = [5.0, 5.0]\n";
        let cfg = CounterConfig::from_toml(raw).unwrap();
        assert!(cfg.lines[0].is_degenerate());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let cfg = CounterConfig::load(&path).unwrap();
        assert_eq!(cfg.lines.len(), 1);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            CounterConfig::load(&missing).unwrap_err(),
            ConfigError::Read { .. }
        ));
    }
}
