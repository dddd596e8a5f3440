//! Synthetic contamination field.
//!
//! Every tile gets a little background noise, a contribution from each
//! hotspot, and a gentle spatial wave. All randomness comes from the RNG the
//! caller passes in, so a fixed seed reproduces a dataset exactly.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::calendar::CalendarDate;
use super::hotspot::Hotspot;
use super::tile::{
    BacteriaCount, RoomDims, Severity, Species, TileDataset, TileKey, TileRecord,
    TimeSeriesPoint,
};
use super::MAX_LOAD;

const BASE_NOISE: std::ops::Range<u32> = 5..15;
const WAVE_AMPLITUDE: f32 = 8.0;
const WAVE_PERIOD_MS: f64 = 100_000.0;
const HISTORY_DAYS: i64 = 7;

/// Inputs that are not random but vary between runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldParams {
    /// Phase offset of the spatial wave, in radians.
    pub phase: f32,
    /// Sample date; the time series ends on this day.
    pub today: CalendarDate,
}

impl FieldParams {
    pub fn new(phase: f32, today: CalendarDate) -> Self {
        Self { phase, today }
    }

    /// Parameters derived from a wall-clock instant.
    pub fn at(time: SystemTime) -> Self {
        let millis = time
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_millis() as f64)
            .unwrap_or(0.0);
        Self {
            phase: (millis / WAVE_PERIOD_MS).rem_euclid(std::f64::consts::TAU) as f32,
            today: CalendarDate::from_system_time(time),
        }
    }

    pub fn now() -> Self {
        Self::at(SystemTime::now())
    }
}

/// Generates one record per tile of `dims`.
///
/// An empty hotspot list is valid and produces background noise plus the wave.
pub fn generate_field<R: Rng>(
    dims: RoomDims,
    hotspots: &[Hotspot],
    params: &FieldParams,
    rng: &mut R,
) -> TileDataset {
    let started = Instant::now();
    let records = dims
        .keys()
        .map(|key| generate_tile(key, hotspots, params, rng))
        .collect::<Vec<_>>();
    let dataset = TileDataset::from_records(dims, records);

    log::debug!(
        "generated {} tiles from {} hotspots in {:?}",
        dataset.len(),
        hotspots.len(),
        started.elapsed()
    );
    dataset
}

/// Convenience wrapper seeding a fresh [`ChaCha8Rng`].
pub fn generate_seeded(
    dims: RoomDims,
    hotspots: &[Hotspot],
    params: &FieldParams,
    seed: u64,
) -> TileDataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate_field(dims, hotspots, params, &mut rng)
}

fn generate_tile<R: Rng>(
    key: TileKey,
    hotspots: &[Hotspot],
    params: &FieldParams,
    rng: &mut R,
) -> TileRecord {
    let (x, y) = (key.x as f32, key.y as f32);
    let mut load = rng.random_range(BASE_NOISE) as f32;

    let mut max_influence = 0.0_f32;
    let mut dominant_hotspot = None;
    for (index, hotspot) in hotspots.iter().enumerate() {
        let influence = hotspot.influence_at(x, y);
        if influence > max_influence {
            max_influence = influence;
            dominant_hotspot = Some(index);
        }
        let jitter = rng.random_range(0.95..1.05_f32);
        load += (hotspot.peak_load * influence * jitter).round();
    }

    load += (WAVE_AMPLITUDE * ((x + y) / 3.0 + params.phase).sin()).round();
    let total_load = load.clamp(0.0, MAX_LOAD);
    let severity = Severity::from_load(total_load);

    let bacteria = Species::ALL
        .iter()
        .map(|&species| {
            let jitter = rng.random::<f32>() * species.jitter();
            BacteriaCount {
                species,
                count: (total_load * species.share() + jitter).floor().max(0.0) as u32,
            }
        })
        .collect();

    let time_series = (0..HISTORY_DAYS)
        .rev()
        .map(|days_ago| TimeSeriesPoint {
            date: params.today.minus_days(days_ago),
            load: (total_load * rng.random_range(0.8..1.2_f32)).round(),
        })
        .collect();

    let temperature = rng.random_range(20.0..30.0_f32).round();
    let humidity = rng.random_range(40.0..60.0_f32).round();
    let last_cleaned = params.today.minus_days(rng.random_range(0..HISTORY_DAYS));

    TileRecord {
        key,
        spot_name: format!("Tile {}-{}", key.x + 1, key.y + 1),
        sample_date: params.today,
        total_load,
        severity,
        bacteria,
        time_series,
        temperature,
        humidity,
        last_cleaned,
        notes: severity.note(),
        dominant_hotspot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::hotspot::DEFAULT_HOTSPOTS;

    const SEED: u64 = 0x5EED;

    fn params() -> FieldParams {
        FieldParams::new(0.0, CalendarDate::from_ymd(2024, 3, 4).unwrap())
    }

    #[test]
    fn covers_every_tile_of_the_room() {
        let dims = RoomDims::new(20, 15).unwrap();
        let dataset = generate_seeded(dims, &DEFAULT_HOTSPOTS, &params(), SEED);
        assert!(dataset.is_complete());
        assert_eq!(dataset.len(), 300);
    }

    #[test]
    fn same_seed_reproduces_the_dataset() {
        let dims = RoomDims::default();
        let a = generate_seeded(dims, &DEFAULT_HOTSPOTS, &params(), SEED);
        let b = generate_seeded(dims, &DEFAULT_HOTSPOTS, &params(), SEED);
        let c = generate_seeded(dims, &DEFAULT_HOTSPOTS, &params(), SEED + 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn loads_stay_in_range_and_match_severity() {
        let dataset = generate_seeded(RoomDims::default(), &DEFAULT_HOTSPOTS, &params(), SEED);
        for record in dataset.iter() {
            assert!((0.0..=MAX_LOAD).contains(&record.total_load));
            assert_eq!(record.severity, Severity::from_load(record.total_load));
            assert_eq!(record.notes, record.severity.note());
            assert_eq!(record.total_load, record.total_load.round());
        }
    }

    #[test]
    fn empty_hotspot_list_is_background_only() {
        let dataset = generate_seeded(RoomDims::new(6, 4).unwrap(), &[], &params(), SEED);
        for record in dataset.iter() {
            // base noise 5..15 plus a wave of at most +-8
            assert!(record.total_load <= 14.0 + WAVE_AMPLITUDE);
            assert_eq!(record.dominant_hotspot, None);
            assert_eq!(record.severity, Severity::Low);
        }
    }

    #[test]
    fn time_series_ends_on_sample_date() {
        let dims = RoomDims::new(3, 3).unwrap();
        let dataset = generate_seeded(dims, &DEFAULT_HOTSPOTS, &params(), SEED);
        let record = dataset.require(&TileKey::new(1, 2)).unwrap();
        assert_eq!(record.time_series.len(), 7);
        assert_eq!(record.time_series[6].date, record.sample_date);
        assert_eq!(record.time_series[0].date.to_string(), "2024-02-27");
        for point in &record.time_series {
            assert!(point.load >= (record.total_load * 0.8).floor());
            assert!(point.load <= (record.total_load * 1.2).ceil());
        }
    }

    #[test]
    fn ambient_readings_are_in_range() {
        let dataset = generate_seeded(RoomDims::default(), &DEFAULT_HOTSPOTS, &params(), SEED);
        for record in dataset.iter() {
            assert!((20.0..=30.0).contains(&record.temperature));
            assert!((40.0..=60.0).contains(&record.humidity));
            let age =
                record.sample_date.days_since_epoch() - record.last_cleaned.days_since_epoch();
            assert!((0..7).contains(&age));
            assert_eq!(record.spot_name, format!("Tile {}-{}", record.key.x + 1, record.key.y + 1));
        }
    }

    #[test]
    fn bacteria_follow_fixed_shares() {
        let dataset = generate_seeded(RoomDims::default(), &DEFAULT_HOTSPOTS, &params(), SEED);
        let record = dataset.require(&TileKey::new(2, 2)).unwrap();
        assert_eq!(record.bacteria.len(), 5);
        for entry in &record.bacteria {
            let floor = (record.total_load * entry.species.share()).floor() as u32;
            let ceiling =
                (record.total_load * entry.species.share() + entry.species.jitter()) as u32;
            assert!(entry.count >= floor && entry.count <= ceiling, "{entry:?}");
        }
    }

    #[test]
    fn dominant_hotspot_is_nearest_source() {
        let dataset = generate_seeded(RoomDims::default(), &DEFAULT_HOTSPOTS, &params(), SEED);
        let record = dataset.require(&TileKey::new(18, 13)).unwrap();
        assert_eq!(record.dominant_hotspot, Some(1));
    }

    #[test]
    fn wave_phase_is_bounded() {
        let params = FieldParams::now();
        assert!((0.0..=std::f32::consts::TAU).contains(&params.phase));
    }
}
