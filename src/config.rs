//! Viewer configuration and env parsing.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::field::{generate_seeded, FieldParams, Hotspot, RoomDims, TileDataset, DEFAULT_HOTSPOTS};
use crate::gfx::scene::WallLayout;

pub const ROOM_W_ENV: &str = "SPOTMAP_ROOM_W";
pub const ROOM_H_ENV: &str = "SPOTMAP_ROOM_H";
pub const SEED_ENV: &str = "SPOTMAP_SEED";
pub const EXPORT_DIR_ENV: &str = "SPOTMAP_EXPORT_DIR";
pub const ENCLOSED_WALLS_ENV: &str = "SPOTMAP_ENCLOSED_WALLS";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub room: RoomDims,
    /// Fixed RNG seed; a fresh one is drawn per run when unset.
    pub seed: Option<u64>,
    pub hotspots: Vec<Hotspot>,
    pub walls: WallLayout,
    pub export_dir: PathBuf,
    pub window_size: (u32, u32),
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            room: RoomDims::default(),
            seed: None,
            hotspots: DEFAULT_HOTSPOTS.to_vec(),
            walls: WallLayout::default(),
            export_dir: PathBuf::from("."),
            window_size: (1200, 800),
        }
    }
}

impl ViewerConfig {
    /// Reads overrides from the environment.
    ///
    /// Unparseable values are logged and replaced by defaults. Dimensions
    /// that parse but are not positive are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let width = env_parsed::<i64>(ROOM_W_ENV).unwrap_or(defaults.room.width() as i64);
        let height = env_parsed::<i64>(ROOM_H_ENV).unwrap_or(defaults.room.height() as i64);
        let room = RoomDims::new(width, height)?;

        let walls = match env_parsed::<Toggle>(ENCLOSED_WALLS_ENV) {
            Some(Toggle(true)) => WallLayout::Enclosed,
            Some(Toggle(false)) => WallLayout::ThreeSided,
            None => defaults.walls,
        };

        let export_dir = std::env::var(EXPORT_DIR_ENV)
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.export_dir);

        Ok(Self {
            room,
            seed: env_parsed(SEED_ENV),
            walls,
            export_dir,
            ..defaults
        })
    }

    /// Seed for this run: the configured one, or a random draw.
    pub fn effective_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Generates the dataset for this configuration.
    pub fn generate_dataset(&self, params: &FieldParams) -> TileDataset {
        let seed = self.effective_seed();
        log::info!(
            "generating {}x{} field with seed {seed}",
            self.room.width(),
            self.room.height()
        );
        generate_seeded(self.room, &self.hotspots, params, seed)
    }
}

/// Boolean env flag accepting the usual spellings.
struct Toggle(bool);

impl std::str::FromStr for Toggle {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Toggle(true)),
            "0" | "false" | "no" | "off" => Ok(Toggle(false)),
            _ => Err(()),
        }
    }
}

/// Parses an env var, logging and discarding values that do not parse.
fn env_parsed<T: std::str::FromStr>(key: &'static str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("{}, using default", ConfigError::InvalidEnvValue { key, value: raw });
            None
        }
    }
}
