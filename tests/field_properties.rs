use spotmap::field::{
    generate_seeded, CalendarDate, FieldParams, Hotspot, RoomDims, Severity, TileKey, MAX_LOAD,
};

const SEEDS: u64 = 24;

fn params() -> FieldParams {
    FieldParams::new(0.0, CalendarDate::from_ymd(2024, 6, 1).unwrap())
}

fn mean_row_loads(dims: RoomDims, hotspots: &[Hotspot]) -> Vec<f32> {
    let mut sums = vec![0.0_f32; dims.width() as usize];
    for seed in 0..SEEDS {
        let data = generate_seeded(dims, hotspots, &params(), seed);
        for (x, sum) in sums.iter_mut().enumerate() {
            *sum += data.get(&TileKey::new(x as u32, 0)).unwrap().total_load;
        }
    }
    sums.into_iter().map(|s| s / SEEDS as f32).collect()
}

#[test]
fn load_falls_away_from_a_single_hotspot() {
    let dims = RoomDims::new(12, 4).unwrap();
    let hotspots = [Hotspot::new(0, 0, 450.0, Severity::Critical)];

    for seed in 0..SEEDS {
        let data = generate_seeded(dims, &hotspots, &params(), seed);
        assert_eq!(data.hottest().map(|r| r.key), Some(TileKey::new(0, 0)));
    }

    let loads = mean_row_loads(dims, &hotspots);
    for pair in loads.windows(2) {
        assert!(pair[1] <= pair[0] + 5.0, "load rose away from hotspot: {loads:?}");
    }
    assert!(loads[0] > 400.0);
    assert!(loads[11] < 60.0);
}

#[test]
fn hotspot_tile_is_the_hottest_for_every_seed() {
    let dims = RoomDims::new(10, 8).unwrap();
    let hotspots = [Hotspot::new(6, 3, 380.0, Severity::High)];

    for seed in 0..SEEDS {
        let data = generate_seeded(dims, &hotspots, &params(), seed);
        assert_eq!(data.hottest().map(|r| r.key), Some(TileKey::new(6, 3)));
    }
}

#[test]
fn empty_hotspot_list_leaves_background_only() {
    let dims = RoomDims::new(8, 8).unwrap();
    let data = generate_seeded(dims, &[], &params(), 5);

    assert_eq!(data.len(), 64);
    assert!(data.iter().all(|r| r.total_load <= 23.0));
    assert!(data.iter().all(|r| r.dominant_hotspot.is_none()));
}

#[test]
fn records_are_internally_consistent() {
    let dims = RoomDims::new(20, 15).unwrap();
    let data = generate_seeded(dims, &spotmap::field::DEFAULT_HOTSPOTS, &params(), 77);

    assert!(data.is_complete());
    for record in data.iter() {
        assert!((0.0..=MAX_LOAD).contains(&record.total_load));
        assert_eq!(record.severity, Severity::from_load(record.total_load));
        assert_eq!(record.time_series.len(), 7);
        assert_eq!(record.time_series.last().map(|p| p.date), Some(record.sample_date));
        assert!(record.last_cleaned <= record.sample_date);
    }
}

#[test]
fn seeds_reproduce_and_distinguish_datasets() {
    let dims = RoomDims::new(6, 6).unwrap();
    let hotspots = spotmap::field::DEFAULT_HOTSPOTS;

    let a = generate_seeded(dims, &hotspots, &params(), 1);
    let b = generate_seeded(dims, &hotspots, &params(), 1);
    let c = generate_seeded(dims, &hotspots, &params(), 2);
    assert_eq!(a, b);
    assert_ne!(a, c);
}
