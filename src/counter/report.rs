//! Snapshot of all counts for printing or export.

use std::fmt;

use serde::Serialize;

use crate::counter::line_counter::{ClassTally, LineCounter};
use crate::counter::vehicle_class::VehicleClass;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassShare {
    pub class: VehicleClass,
    pub count: u64,
    /// Percentage of the enclosing total.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineReport {
    pub name: String,
    pub count: u64,
    /// Percentage of the total across all lines.
    pub percent: f64,
    /// Non-zero classes only.
    pub classes: Vec<ClassShare>,
}

/// Counts across all lines at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountReport {
    /// Sum of line totals, not deduplicated across lines.
    pub total: u64,
    pub lines: Vec<LineReport>,
    /// Non-zero classes summed over all lines.
    pub classes: Vec<ClassShare>,
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn shares(tally: &ClassTally, whole: u64) -> Vec<ClassShare> {
    tally
        .non_zero()
        .map(|(class, count)| ClassShare {
            class,
            count,
            percent: percent(count, whole),
        })
        .collect()
}

impl CountReport {
    /// Snapshot the counts of `counter`.
    pub fn from_counter(counter: &LineCounter) -> Self {
        let total = counter.total_count();
        let lines = counter
            .lines()
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let count = counter.line_count(i);
                LineReport {
                    name: line.name().to_string(),
                    count,
                    percent: percent(count, total),
                    classes: shares(&counter.class_counts(i), count),
                }
            })
            .collect();

        Self {
            total,
            lines,
            classes: shares(&counter.class_totals(), total),
        }
    }
}

impl fmt::Display for CountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        let thin = "-".repeat(30);

        writeln!(f, "{rule}")?;
        writeln!(f, "Vehicle counts by line")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Total vehicles: {}", self.total)?;
        writeln!(f, "{thin}")?;

        for line in &self.lines {
            writeln!(f, "{}: {} ({:.1}%)", line.name, line.count, line.percent)?;
            for share in &line.classes {
                writeln!(f, "  {}: {} ({:.1}%)", share.class, share.count, share.percent)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "{thin}")?;
        writeln!(f, "All lines by vehicle type:")?;
        for share in &self.classes {
            writeln!(f, "{}: {} ({:.1}%)", share.class, share.count, share.percent)?;
        }
        write!(f, "{rule}")
    }
}
