//! Frame scheduling and composition.
//!
//! [`compose_frame`] is a pure function of the scene, the pick state, the
//! camera and the frame time; everything that changes between frames is
//! advanced beforehand by the engine.

use std::time::Duration;

use cgmath::{InnerSpace, Vector3};

use crate::gfx::camera::OrbitCamera;
use crate::gfx::picking::PickState;
use crate::gfx::rendering::{DrawItem, DrawList};
use crate::gfx::resources::GlobalUniform;
use crate::gfx::scene::{RenderLayer, SceneHandle};

/// Ring rotation added every frame, in radians.
pub const RING_SPIN_PER_FRAME: f32 = 0.02;

/// Host-side frame request state.
///
/// A frame runs only if one was requested; once disposed no further frames
/// can be requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameLoop {
    pending: bool,
    disposed: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&mut self) {
        if !self.disposed {
            self.pending = true;
        }
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Consumes the pending request. Returns false if there was none.
    pub fn begin_frame(&mut self) -> bool {
        if self.disposed || !self.pending {
            return false;
        }
        self.pending = false;
        self.frames += 1;
        true
    }

    /// Cancels the pending request and refuses all later ones.
    pub fn dispose(&mut self) {
        self.cancel();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

/// Opacity of the selection ring at `time`.
pub fn ring_pulse(time: Duration) -> f32 {
    let ms = time.as_secs_f64() * 1000.0;
    0.6 + 0.2 * (ms * 0.005).sin() as f32
}

/// Turns every attached selection ring one step.
pub fn spin_rings(scene: &mut SceneHandle) {
    let rings: Vec<_> = scene.tiles().iter().filter_map(|tile| tile.decoration).collect();
    for ring in rings {
        if let Some(node) = scene.arena.get_mut(ring) {
            node.transform.rotation.y += RING_SPIN_PER_FRAME;
        }
    }
}

/// Builds the draw list for one frame.
///
/// Items are ordered by layer; within a layer opaque items come first in
/// arena order, then transparent items from far to near.
pub fn compose_frame<'a>(
    scene: &'a SceneHandle,
    pick_state: &PickState,
    camera: &OrbitCamera,
    time: Duration,
) -> DrawList<'a> {
    let selected_ring = pick_state
        .selected
        .and_then(|index| scene.tile(index))
        .and_then(|tile| tile.decoration);

    let mut items: Vec<DrawItem> = scene
        .arena
        .iter()
        .filter(|(id, _)| scene.arena.is_visible(*id))
        .filter_map(|(id, node)| {
            let model = scene.arena.world_matrix(id)?;
            let geometry = scene.meshes.get(node.mesh)?;
            let opacity = if Some(id) == selected_ring {
                ring_pulse(time)
            } else {
                node.material.opacity
            };
            Some(DrawItem {
                node: id,
                label: node.label,
                mesh: node.mesh,
                topology: geometry.topology,
                layer: node.layer,
                model,
                color: node.material.color.with_alpha(opacity),
                emissive: node.material.emissive,
                unlit: node.material.unlit,
            })
        })
        .collect();

    let eye = camera.eye;
    let depth = |item: &DrawItem| {
        let [x, y, z] = item.world_position();
        (Vector3::new(x, y, z) - eye).magnitude2()
    };
    items.sort_by(|a, b| {
        a.layer
            .cmp(&b.layer)
            .then(a.is_transparent().cmp(&b.is_transparent()))
            .then_with(|| {
                if a.is_transparent() && b.is_transparent() {
                    depth(b).total_cmp(&depth(a))
                } else {
                    std::cmp::Ordering::Equal
                }
            })
    });

    DrawList {
        meshes: &scene.meshes,
        globals: GlobalUniform::new(camera.camera_uniform(), &scene.lights, &scene.fog),
        clear_color: scene.background,
        items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{generate_seeded, FieldParams, RoomDims, DEFAULT_HOTSPOTS};
    use crate::gfx::picking::PickingController;
    use crate::gfx::scene::SceneBuilder;
    use std::sync::Arc;

    fn setup() -> (SceneHandle, OrbitCamera) {
        let dims = RoomDims::new(4, 3).unwrap();
        let data = generate_seeded(dims, &DEFAULT_HOTSPOTS, &FieldParams::now(), 11);
        let scene = SceneBuilder::new(dims).build(Arc::new(data)).unwrap();
        (scene, OrbitCamera::new(dims, 1.5))
    }

    #[test]
    fn frame_loop_runs_only_requested_frames() {
        let mut frames = FrameLoop::new();
        assert!(!frames.begin_frame());
        frames.request();
        assert!(frames.is_pending());
        assert!(frames.begin_frame());
        assert!(!frames.begin_frame());
        assert_eq!(frames.frame_count(), 1);
    }

    #[test]
    fn disposed_loop_refuses_requests() {
        let mut frames = FrameLoop::new();
        frames.request();
        frames.dispose();
        assert!(!frames.is_pending());
        frames.request();
        assert!(!frames.is_pending());
        assert!(!frames.begin_frame());
    }

    #[test]
    fn ring_pulse_stays_in_band() {
        assert!((ring_pulse(Duration::ZERO) - 0.6).abs() < 1e-6);
        for ms in (0..2000).step_by(37) {
            let opacity = ring_pulse(Duration::from_millis(ms));
            assert!((0.4..=0.8).contains(&opacity));
        }
    }

    #[test]
    fn composition_is_deterministic_and_layered() {
        let (scene, camera) = setup();
        let state = PickState::default();
        let time = Duration::from_millis(500);

        let first = compose_frame(&scene, &state, &camera, time);
        let second = compose_frame(&scene, &state, &camera, time);
        assert_eq!(first.items, second.items);
        assert_eq!(first.len(), scene.arena.len());

        assert_eq!(first.items.first().map(|i| i.label), Some("floor"));
        let layers: Vec<_> = first.items.iter().map(|i| i.layer).collect();
        assert!(layers.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn selected_ring_pulses_and_spins() {
        let (mut scene, mut camera) = setup();
        let mut picker = PickingController::new();
        picker.select(&mut scene, &mut camera, 5);

        let time = Duration::from_millis(314);
        let list = compose_frame(&scene, &picker.state(), &camera, time);
        let ring = list.items_labelled("selection_ring").next().unwrap();
        assert_eq!(ring.layer, RenderLayer::Decoration);
        assert!((ring.color[3] - ring_pulse(time)).abs() < 1e-6);
        assert!(ring.unlit);

        let ring_id = scene.tile(5).unwrap().decoration.unwrap();
        spin_rings(&mut scene);
        spin_rings(&mut scene);
        let rotation = scene.arena.get(ring_id).unwrap().transform.rotation.y;
        assert!((rotation - 2.0 * RING_SPIN_PER_FRAME).abs() < 1e-6);
    }

    #[test]
    fn transparent_items_draw_far_to_near() {
        let (scene, camera) = setup();
        let list = compose_frame(&scene, &PickState::default(), &camera, Duration::ZERO);
        let eye = camera.eye;
        let tiles: Vec<f32> = list
            .items_labelled("tile")
            .map(|item| {
                let [x, y, z] = item.world_position();
                (Vector3::new(x, y, z) - eye).magnitude2()
            })
            .collect();
        assert!(tiles.windows(2).all(|w| w[0] >= w[1]));
    }
}
