//! # Contamination Field
//!
//! Synthetic per-tile contamination data for a rectangular room, plus the
//! colour ramp used to display it.
//!
//! ## Key Components
//!
//! - [`generate_field`] - Builds a [`TileDataset`] from a hotspot table and an explicit RNG
//! - [`color_for`] - Maps a load value onto the heatmap colour ramp
//! - [`RoomDims`] - Validated room footprint in tiles
//!
//! ## Usage
//!
//! ```no_run
//! use spotmap::field::{generate_seeded, FieldParams, RoomDims, DEFAULT_HOTSPOTS};
//!
//! let dims = RoomDims::new(20, 15).unwrap();
//! let dataset = generate_seeded(dims, &DEFAULT_HOTSPOTS, &FieldParams::now(), 42);
//! assert_eq!(dataset.len(), 300);
//! ```

pub mod calendar;
pub mod color;
pub mod generator;
pub mod hotspot;
pub mod tile;

pub use calendar::CalendarDate;
pub use color::{color_for, Rgb};
pub use generator::{generate_field, generate_seeded, FieldParams};
pub use hotspot::{dominant_source, Hotspot, DEFAULT_HOTSPOTS};
pub use tile::{
    BacteriaCount, RoomDims, Severity, Species, TileDataset, TileKey, TileRecord,
    TimeSeriesPoint,
};

/// Default room width in tiles.
pub const ROOM_W: u32 = 20;
/// Default room depth in tiles.
pub const ROOM_H: u32 = 15;
/// Edge length of one tile in world units.
pub const TILE_SIZE: f32 = 1.0;
/// Upper bound of a tile's total load.
pub const MAX_LOAD: f32 = 500.0;
