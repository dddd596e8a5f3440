use cgmath::Vector3;

use spotmap::field::RoomDims;
use spotmap::gfx::camera::{OrbitCamera, ViewMode};

fn room() -> RoomDims {
    RoomDims::new(20, 15).unwrap()
}

#[test]
fn every_mode_looks_at_the_room_centre() {
    let mut camera = OrbitCamera::new(room(), 1.5);
    for mode in [ViewMode::Top, ViewMode::Iso, ViewMode::Walk] {
        camera.set_mode(mode);
        assert_eq!(camera.mode(), mode);
        assert_eq!(camera.target, Vector3::new(9.5, 0.0, 7.0));
        assert!(camera.polar() <= camera.bounds.max_polar + 1e-5);
        assert!(camera.polar() >= camera.bounds.min_polar - 1e-5);
    }
}

#[test]
fn top_view_looks_straight_down_without_degenerating() {
    let mut camera = OrbitCamera::new(room(), 1.5);
    camera.set_mode(ViewMode::Top);

    assert!(camera.polar() < 1e-2);
    let view_proj = camera.view_proj();
    assert!(view_proj.x.x.is_finite() && view_proj.w.w.is_finite());
}

#[test]
fn returning_to_iso_restores_the_initial_pose() {
    let fresh = OrbitCamera::new(room(), 1.5);
    let mut camera = fresh;

    camera.set_mode(ViewMode::Top);
    camera.rotate(0.8, 0.3);
    camera.zoom(1.4);
    camera.update();
    camera.set_mode(ViewMode::Walk);
    camera.retarget(Vector3::new(3.0, 0.0, 2.0));
    camera.set_mode(ViewMode::Iso);

    assert!(camera.pose().approx_eq(&fresh.pose(), 1e-4));
}

#[test]
fn walk_mode_stays_above_the_floor() {
    let mut camera = OrbitCamera::new(room(), 1.5);
    camera.set_mode(ViewMode::Walk);
    camera.rotate(0.0, 10.0);
    for _ in 0..200 {
        camera.update();
    }

    assert!(camera.polar() <= std::f32::consts::PI / 2.5 + 1e-5);
    assert!(camera.eye.y > 0.0);
}

#[test]
fn zoom_respects_distance_bounds() {
    let mut camera = OrbitCamera::new(room(), 1.5);
    camera.zoom(100.0);
    camera.update();
    assert!((camera.distance() - camera.bounds.max_distance).abs() < 1e-3);

    camera.zoom(1e-4);
    camera.update();
    assert!((camera.distance() - camera.bounds.min_distance).abs() < 1e-3);
}
