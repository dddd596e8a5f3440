//! Contamination sources feeding the field generator.

use super::tile::{Severity, TileRecord};

/// A fixed source location that raises the load of nearby tiles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotspot {
    pub x: i32,
    pub y: i32,
    pub peak_load: f32,
    pub severity_hint: Severity,
    pub note: &'static str,
}

impl Hotspot {
    pub const fn new(x: i32, y: i32, peak_load: f32, severity_hint: Severity) -> Self {
        Self {
            x,
            y,
            peak_load,
            severity_hint,
            note: "",
        }
    }

    pub const fn with_note(mut self, note: &'static str) -> Self {
        self.note = note;
        self
    }

    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.x as f32;
        let dy = y - self.y as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Sharp short-range falloff plus a shallow long-range tail.
    pub fn influence_at(&self, x: f32, y: f32) -> f32 {
        let d = self.distance_to(x, y);
        (-d / 2.5).exp() + 0.15 * (-d / 8.0).exp()
    }
}

impl std::fmt::Display for Hotspot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} source at {},{})", self.note, self.severity_hint, self.x, self.y)
    }
}

/// The hotspot with the strongest pull on `record`, looked up in the table
/// the record was generated from.
pub fn dominant_source<'a>(record: &TileRecord, hotspots: &'a [Hotspot]) -> Option<&'a Hotspot> {
    record.dominant_hotspot.and_then(|index| hotspots.get(index))
}

pub const DEFAULT_HOTSPOTS: [Hotspot; 5] = [
    Hotspot::new(2, 2, 450.0, Severity::Critical)
        .with_note("Main entrance - High foot traffic contamination"),
    Hotspot::new(18, 13, 380.0, Severity::High)
        .with_note("Equipment splash zone - Requires immediate attention"),
    Hotspot::new(10, 7, 280.0, Severity::Medium)
        .with_note("Central pathway - Moderate contamination"),
    Hotspot::new(15, 3, 150.0, Severity::Low)
        .with_note("Secondary work area - Low contamination"),
    Hotspot::new(5, 12, 320.0, Severity::High)
        .with_note("Near ventilation unit - Elevated levels"),
];
