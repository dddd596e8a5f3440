//! Tile identity, per-tile records and the dataset that holds them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::calendar::CalendarDate;
use super::color::Rgb;
use crate::error::ConfigError;

/// Room footprint in tiles. Both sides are strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomDims {
    width: u32,
    height: u32,
}

impl RoomDims {
    /// Validates the footprint. Non-positive sides are rejected, never clamped.
    pub fn new(width: i64, height: i64) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidRoomDimensions { width, height };
        if width <= 0 || height <= 0 {
            return Err(invalid());
        }
        Ok(Self {
            width: u32::try_from(width).map_err(|_| invalid())?,
            height: u32::try_from(height).map_err(|_| invalid())?,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// World-space centre of the tile grid on the floor plane, as `(x, z)`.
    pub fn centroid(&self) -> (f32, f32) {
        (
            (self.width as f32 - 1.0) / 2.0,
            (self.height as f32 - 1.0) / 2.0,
        )
    }

    pub fn contains(&self, key: TileKey) -> bool {
        key.x < self.width && key.y < self.height
    }

    /// Every tile key, column by column.
    pub fn keys(&self) -> impl Iterator<Item = TileKey> + '_ {
        (0..self.width).flat_map(move |x| (0..self.height).map(move |y| TileKey::new(x, y)))
    }
}

impl Default for RoomDims {
    fn default() -> Self {
        Self {
            width: super::ROOM_W,
            height: super::ROOM_H,
        }
    }
}

/// Grid coordinate of a tile. Displays as `"x_y"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileKey {
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.x, self.y)
    }
}

impl FromStr for TileKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedTileKey(s.to_string());
        let (x, y) = s.split_once('_').ok_or_else(malformed)?;
        Ok(Self {
            x: x.parse().map_err(|_| malformed())?,
            y: y.parse().map_err(|_| malformed())?,
        })
    }
}

/// Four-level contamination classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_load(load: f32) -> Self {
        if load > 350.0 {
            Severity::Critical
        } else if load > 200.0 {
            Severity::High
        } else if load > 100.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Short status note shown alongside a tile.
    pub fn note(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical contamination level - Immediate cleaning required",
            Severity::High => "High contamination - Schedule deep cleaning",
            Severity::Medium => "Moderate contamination - Monitor closely",
            Severity::Low => "Normal background contamination levels",
        }
    }

    /// Suggested cleaning action.
    pub fn recommendation(&self) -> &'static str {
        match self {
            Severity::Critical => concat!(
                "Immediate deep cleaning and disinfection required. ",
                "Consider temporary area closure."
            ),
            Severity::High => {
                "Schedule enhanced cleaning within 24 hours. Increase monitoring frequency."
            }
            Severity::Medium => {
                "Standard cleaning protocol. Monitor for trends over next sampling period."
            }
            Severity::Low => "Maintain current cleaning schedule. Continue routine monitoring.",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five tracked species, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    StaphylococcusAureus,
    EscherichiaColi,
    BacillusSubtilis,
    PseudomonasAeruginosa,
    EnterococcusFaecalis,
}

impl Species {
    pub const ALL: [Species; 5] = [
        Species::StaphylococcusAureus,
        Species::EscherichiaColi,
        Species::BacillusSubtilis,
        Species::PseudomonasAeruginosa,
        Species::EnterococcusFaecalis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Species::StaphylococcusAureus => "Staphylococcus aureus",
            Species::EscherichiaColi => "Escherichia coli",
            Species::BacillusSubtilis => "Bacillus subtilis",
            Species::PseudomonasAeruginosa => "Pseudomonas aeruginosa",
            Species::EnterococcusFaecalis => "Enterococcus faecalis",
        }
    }

    /// Fraction of a tile's total load attributed to this species.
    pub fn share(&self) -> f32 {
        match self {
            Species::StaphylococcusAureus => 0.30,
            Species::EscherichiaColi => 0.25,
            Species::BacillusSubtilis => 0.20,
            Species::PseudomonasAeruginosa => 0.15,
            Species::EnterococcusFaecalis => 0.10,
        }
    }

    /// Upper bound of the uniform jitter added on top of the share.
    pub fn jitter(&self) -> f32 {
        match self {
            Species::StaphylococcusAureus => 10.0,
            Species::EscherichiaColi => 8.0,
            Species::BacillusSubtilis => 6.0,
            Species::PseudomonasAeruginosa => 5.0,
            Species::EnterococcusFaecalis => 3.0,
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            Species::StaphylococcusAureus => Rgb::from_hex(0xef4444),
            Species::EscherichiaColi => Rgb::from_hex(0xf59e0b),
            Species::BacillusSubtilis => Rgb::from_hex(0x10b981),
            Species::PseudomonasAeruginosa => Rgb::from_hex(0x06b6d4),
            Species::EnterococcusFaecalis => Rgb::from_hex(0x8b5cf6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacteriaCount {
    pub species: Species,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSeriesPoint {
    pub date: CalendarDate,
    pub load: f32,
}

/// Everything known about one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRecord {
    pub key: TileKey,
    pub spot_name: String,
    pub sample_date: CalendarDate,
    pub total_load: f32,
    pub severity: Severity,
    pub bacteria: Vec<BacteriaCount>,
    /// Seven daily points, oldest first, ending on `sample_date`.
    pub time_series: Vec<TimeSeriesPoint>,
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity in percent.
    pub humidity: f32,
    pub last_cleaned: CalendarDate,
    pub notes: &'static str,
    /// Index of the hotspot with the strongest influence on this tile.
    pub dominant_hotspot: Option<usize>,
}

impl TileRecord {
    pub fn recommendation(&self) -> &'static str {
        self.severity.recommendation()
    }
}

/// Read-only mapping from tile key to record.
#[derive(Debug, Clone, PartialEq)]
pub struct TileDataset {
    dims: RoomDims,
    records: BTreeMap<TileKey, TileRecord>,
}

impl TileDataset {
    pub fn new(dims: RoomDims) -> Self {
        Self {
            dims,
            records: BTreeMap::new(),
        }
    }

    /// Collects records for `dims`, dropping any that fall outside the room.
    pub fn from_records(dims: RoomDims, records: impl IntoIterator<Item = TileRecord>) -> Self {
        let mut dataset = Self::new(dims);
        for record in records {
            dataset.insert(record);
        }
        dataset
    }

    /// Inserts or replaces a record. Returns `false` when the key lies outside the room.
    pub fn insert(&mut self, record: TileRecord) -> bool {
        if !self.dims.contains(record.key) {
            log::warn!("ignoring record for out-of-room tile {}", record.key);
            return false;
        }
        self.records.insert(record.key, record);
        true
    }

    pub fn dims(&self) -> RoomDims {
        self.dims
    }

    pub fn get(&self, key: &TileKey) -> Option<&TileRecord> {
        self.records.get(key)
    }

    /// Like [`get`](Self::get) but a missing tile is a configuration error.
    pub fn require(&self, key: &TileKey) -> Result<&TileRecord, ConfigError> {
        self.records.get(key).ok_or(ConfigError::MissingTile(*key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when every tile of the room has a record.
    pub fn is_complete(&self) -> bool {
        self.records.len() == self.dims.tile_count()
    }

    /// Tile with the highest total load. Ties resolve to the smallest key.
    pub fn hottest(&self) -> Option<&TileRecord> {
        self.records.values().fold(None, |best: Option<&TileRecord>, record| match best {
            Some(current) if current.total_load >= record.total_load => Some(current),
            _ => Some(record),
        })
    }
}
