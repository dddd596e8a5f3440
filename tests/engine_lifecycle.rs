use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use cgmath::Vector4;
use image::RgbaImage;

use spotmap::field::{generate_seeded, FieldParams, RoomDims, TileKey, DEFAULT_HOTSPOTS};
use spotmap::gfx::camera::ViewMode;
use spotmap::gfx::picking::PointerEvent;
use spotmap::gfx::rendering::{DrawList, RenderBackend};
use spotmap::gfx::scene::builder::{HOVER_EMISSIVE, SELECT_EMISSIVE};
use spotmap::{EngineError, HeatmapEngine, ViewerConfig};

const VIEWPORT: (u32, u32) = (800, 600);

#[derive(Debug, Clone, PartialEq)]
struct FrameSummary {
    items: usize,
    rings: usize,
}

#[derive(Default)]
struct RecordingBackend {
    frames: Vec<FrameSummary>,
    captures: usize,
    resizes: Vec<(u32, u32)>,
}

impl RenderBackend for RecordingBackend {
    fn render(&mut self, frame: &DrawList<'_>) -> Result<(), EngineError> {
        self.frames.push(FrameSummary {
            items: frame.len(),
            rings: frame.items_labelled("selection_ring").count(),
        });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.resizes.push((width, height));
    }

    fn capture(&mut self, _frame: &DrawList<'_>) -> Result<RgbaImage, EngineError> {
        self.captures += 1;
        Ok(RgbaImage::new(VIEWPORT.0, VIEWPORT.1))
    }

    fn surface_size(&self) -> (u32, u32) {
        VIEWPORT
    }
}

fn engine() -> HeatmapEngine<RecordingBackend> {
    let mut engine = iso_engine();
    engine.set_view_mode(ViewMode::Top);
    engine
}

fn iso_engine() -> HeatmapEngine<RecordingBackend> {
    let config = ViewerConfig {
        room: RoomDims::new(6, 5).unwrap(),
        seed: Some(21),
        ..ViewerConfig::default()
    };
    let dataset = generate_seeded(config.room, &DEFAULT_HOTSPOTS, &FieldParams::now(), 21);
    HeatmapEngine::new(RecordingBackend::default(), Arc::new(dataset), &config, VIEWPORT).unwrap()
}

/// Window position of a tile centre under the current camera.
fn pointer_over(engine: &HeatmapEngine<RecordingBackend>, index: usize) -> PointerEvent {
    let p = engine.scene().tile_position(index).unwrap();
    let clip = engine.camera().view_proj() * Vector4::new(p.x, p.y, p.z, 1.0);
    let (ndc_x, ndc_y) = (clip.x / clip.w, clip.y / clip.w);
    let (w, h) = engine.viewport();
    PointerEvent::new(
        (ndc_x + 1.0) * 0.5 * w as f32,
        (1.0 - ndc_y) * 0.5 * h as f32,
    )
}

fn emissive(engine: &HeatmapEngine<RecordingBackend>, index: usize) -> [f32; 3] {
    let tile = engine.scene().tile(index).unwrap();
    engine.scene().arena.get(tile.node).unwrap().material.emissive
}

#[test]
fn frames_keep_running_until_disposed() {
    let mut engine = engine();
    assert!(engine.frame(Duration::ZERO).unwrap());
    assert!(engine.frame(Duration::from_millis(16)).unwrap());

    let frames = &engine.backend().unwrap().frames;
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].items, engine.scene().arena.len());
    assert_eq!(frames[0].rings, 0);
}

#[test]
fn dispose_is_idempotent_and_silences_the_engine() {
    let mut engine = engine();
    engine.dispose();
    engine.dispose();

    assert!(engine.is_disposed());
    assert!(engine.backend().is_none());
    assert!(!engine.frame_loop().is_pending());
    assert!(!engine.frame(Duration::from_secs(1)).unwrap());

    let pose = engine.camera().pose();
    engine.set_view_mode(ViewMode::Walk);
    engine.resize(1024, 768);
    engine.reset();
    assert_eq!(engine.view_mode(), ViewMode::Top);
    assert_eq!(engine.camera().pose(), pose);
    assert_eq!(engine.viewport(), VIEWPORT);

    assert!(engine.pointer_move(PointerEvent::new(400.0, 300.0)).is_none());
    assert!(engine.pointer_click(PointerEvent::new(400.0, 300.0)).is_none());
    assert!(matches!(engine.export_image(), Err(EngineError::Disposed)));
}

#[test]
fn at_most_one_tile_is_selected() {
    let mut engine = engine();
    let first = engine.scene().tile_index(&TileKey::new(1, 1)).unwrap();
    let second = engine.scene().tile_index(&TileKey::new(4, 3)).unwrap();

    let hit = engine.pointer_click(pointer_over(&engine, first)).unwrap();
    assert_eq!(hit.tile_index, first);
    let hit = engine.pointer_click(pointer_over(&engine, second)).unwrap();
    assert_eq!(hit.tile_index, second);

    assert_eq!(engine.pick_state().selected, Some(second));
    assert_eq!(engine.scene().ring_count(), 1);
    assert!(engine.scene().tile(first).unwrap().decoration.is_none());
    assert_eq!(
        emissive(&engine, first),
        engine.scene().tile(first).unwrap().rest_emissive()
    );

    engine.frame(Duration::from_millis(100)).unwrap();
    let frames = &engine.backend().unwrap().frames;
    assert_eq!(frames.last().map(|f| f.rings), Some(1));
}

#[test]
fn hover_never_overrides_selection() {
    let mut engine = engine();
    let selected = engine.scene().tile_index(&TileKey::new(2, 2)).unwrap();
    let neighbour = engine.scene().tile_index(&TileKey::new(3, 2)).unwrap();

    engine.pointer_click(pointer_over(&engine, selected));
    engine.pointer_move(pointer_over(&engine, selected));
    assert_eq!(emissive(&engine, selected), SELECT_EMISSIVE.to_array());

    engine.pointer_move(pointer_over(&engine, neighbour));
    assert_eq!(engine.pick_state().hovered, Some(neighbour));
    assert_eq!(emissive(&engine, neighbour), HOVER_EMISSIVE.to_array());
    assert_eq!(emissive(&engine, selected), SELECT_EMISSIVE.to_array());
}

#[test]
fn callbacks_report_hover_and_selection() {
    let mut engine = engine();
    let hovered = Rc::new(RefCell::new(Vec::new()));
    let cleared = Rc::new(Cell::new(0));
    let selected = Rc::new(RefCell::new(None));

    let sink = hovered.clone();
    engine.on_hover(move |record, _| sink.borrow_mut().push(record.key));
    let count = cleared.clone();
    engine.on_clear_hover(move || count.set(count.get() + 1));
    let slot = selected.clone();
    engine.on_select(move |record| *slot.borrow_mut() = Some(record.key));

    let index = engine.scene().tile_index(&TileKey::new(0, 4)).unwrap();
    engine.pointer_move(pointer_over(&engine, index));
    engine.pointer_click(pointer_over(&engine, index));
    // far corner of the viewport looks past the room
    engine.pointer_move(PointerEvent::new(1.0, 1.0));

    assert_eq!(hovered.borrow().as_slice(), &[TileKey::new(0, 4)]);
    assert_eq!(*selected.borrow(), Some(TileKey::new(0, 4)));
    assert_eq!(cleared.get(), 1);
    assert_eq!(engine.pick_state().hovered, None);
}

#[test]
fn reset_returns_to_iso_without_selection() {
    let mut engine = engine();
    let index = engine.scene().tile_index(&TileKey::new(2, 1)).unwrap();
    engine.pointer_click(pointer_over(&engine, index));
    engine.set_view_mode(ViewMode::Walk);

    engine.reset();

    assert_eq!(engine.view_mode(), ViewMode::Iso);
    assert_eq!(engine.pick_state().selected, None);
    assert_eq!(engine.scene().ring_count(), 0);
}

#[test]
fn reset_matches_a_fresh_iso_engine() {
    let fresh = iso_engine();
    let mut engine = engine();

    let index = engine.scene().tile_index(&TileKey::new(4, 1)).unwrap();
    engine.pointer_click(pointer_over(&engine, index)).unwrap();
    engine.set_view_mode(ViewMode::Walk);
    for frame in 0..5 {
        engine.frame(Duration::from_millis(frame * 16)).unwrap();
    }

    engine.reset();

    let (camera, expected) = (engine.camera(), fresh.camera());
    assert!(camera.pose().approx_eq(&expected.pose(), 1e-4));
    assert!((camera.distance() - expected.distance()).abs() < 1e-4);
    assert!((camera.polar() - expected.polar()).abs() < 1e-4);
    assert!((camera.azimuth() - expected.azimuth()).abs() < 1e-4);
}

#[test]
fn zero_sized_resize_is_ignored() {
    let mut engine = engine();
    engine.resize(0, 600);
    engine.resize(1024, 0);
    assert_eq!(engine.viewport(), VIEWPORT);
    assert!(engine.backend().unwrap().resizes.is_empty());

    engine.resize(1024, 768);
    assert_eq!(engine.viewport(), (1024, 768));
    assert!((engine.camera().aspect - 1024.0 / 768.0).abs() < 1e-6);
    assert_eq!(engine.backend().unwrap().resizes, vec![(1024, 768)]);
}

#[test]
fn save_image_writes_a_dated_png() {
    let mut engine = engine();
    let dir = std::env::temp_dir().join(format!("spotmap-export-{}", std::process::id()));

    let path = engine.save_image(&dir).unwrap();

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("bacteria-heatmap-"));
    assert!(name.ends_with(".png"));
    assert!(path.exists());
    assert_eq!(engine.backend().unwrap().captures, 1);

    let _ = std::fs::remove_dir_all(&dir);
}
