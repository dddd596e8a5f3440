use super::camera_utils::{Camera, CameraUniform};
use crate::field::RoomDims;
use cgmath::*;
use std::f32::consts::PI;
use std::fmt;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Fraction of the pending rotation applied per update.
pub const DAMPING_FACTOR: f32 = 0.05;
/// Pending rotation below this is dropped.
const SETTLE_EPSILON: f32 = 1e-6;

/// Preset camera poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    Top,
    #[default]
    Iso,
    Walk,
}

impl ViewMode {
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::Top => "top",
            ViewMode::Iso => "iso",
            ViewMode::Walk => "walk",
        }
    }

    fn max_polar(&self) -> f32 {
        match self {
            ViewMode::Top => PI / 2.0,
            ViewMode::Iso => PI / 2.2,
            ViewMode::Walk => PI / 2.5,
        }
    }

    fn eye(&self, dims: RoomDims) -> Vector3<f32> {
        let (cx, cz) = dims.centroid();
        let (w, h) = (dims.width() as f32, dims.height() as f32);
        match self {
            ViewMode::Top => Vector3::new(cx, 25.0, cz),
            ViewMode::Iso => Vector3::new(w * 0.8, w.max(h) * 0.8, h * 1.2),
            ViewMode::Walk => Vector3::new(2.0, 2.0, 2.0),
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Eye and target of a camera at rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
}

impl CameraPose {
    pub fn approx_eq(&self, other: &CameraPose, tolerance: f32) -> bool {
        (self.eye - other.eye).magnitude() <= tolerance
            && (self.target - other.target).magnitude() <= tolerance
    }
}

/// Orbit camera around a target point, Y up.
///
/// The eye is stored in cartesian form; spherical coordinates relative to the
/// target are derived on demand. Polar angle is measured from +Y.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub damping: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_scale: f32,
    mode: ViewMode,
    dims: RoomDims,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    /// Creates a camera in [`ViewMode::Iso`] for the given room.
    pub fn new(dims: RoomDims, aspect: f32) -> Self {
        let mut camera = Self {
            eye: Vector3::zero(),
            target: Vector3::zero(),
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            damping: DAMPING_FACTOR,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_scale: 1.0,
            mode: ViewMode::Iso,
            dims,
            aspect,
            fovy: Deg(45.0).into(),
            znear: 0.1,
            zfar: 1000.0,
        };
        camera.set_mode(ViewMode::Iso);
        camera
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Jumps to a preset pose looking at the room centroid.
    pub fn set_mode(&mut self, mode: ViewMode) {
        let (cx, cz) = self.dims.centroid();
        self.mode = mode;
        self.bounds.max_polar = mode.max_polar();
        self.eye = mode.eye(self.dims);
        self.target = Vector3::new(cx, 0.0, cz);
        self.clear_pending();
        self.apply_spherical(self.azimuth(), self.polar(), self.distance());
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            eye: self.eye,
            target: self.target,
        }
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).magnitude()
    }

    /// Angle between the view offset and +Y.
    pub fn polar(&self) -> f32 {
        let offset = self.eye - self.target;
        let distance = offset.magnitude();
        if distance <= f32::EPSILON {
            return 0.0;
        }
        (offset.y / distance).clamp(-1.0, 1.0).acos()
    }

    /// Rotation of the view offset around +Y, measured from +Z.
    pub fn azimuth(&self) -> f32 {
        let offset = self.eye - self.target;
        offset.x.atan2(offset.z)
    }

    /// Queues an orbit; applied gradually by [`OrbitCamera::update`].
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.pending_azimuth += d_azimuth;
        self.pending_polar += d_polar;
    }

    /// Queues a distance change. `scale > 1` moves away from the target.
    pub fn zoom(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.pending_scale *= scale;
        }
    }

    /// Moves the target to `point`, shifting the eye by the same offset.
    pub fn retarget(&mut self, point: Vector3<f32>) {
        let shift = point - self.target;
        self.target = point;
        self.eye += shift;
    }

    /// One damping step. Returns whether the camera is still settling.
    pub fn update(&mut self) -> bool {
        let azimuth = self.azimuth() + self.pending_azimuth * self.damping;
        let polar = self.polar() + self.pending_polar * self.damping;
        let distance = self.distance() * self.pending_scale;
        self.apply_spherical(azimuth, polar, distance);

        self.pending_azimuth *= 1.0 - self.damping;
        self.pending_polar *= 1.0 - self.damping;
        self.pending_scale = 1.0;

        let settling = self.pending_azimuth.abs() > SETTLE_EPSILON
            || self.pending_polar.abs() > SETTLE_EPSILON;
        if !settling {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
        }
        settling
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.build_view_projection_matrix()
    }

    /// Uniform data for the current pose.
    pub fn camera_uniform(&self) -> CameraUniform {
        CameraUniform::new(self.eye, self.build_view_projection_matrix())
    }

    fn clear_pending(&mut self) {
        self.pending_azimuth = 0.0;
        self.pending_polar = 0.0;
        self.pending_scale = 1.0;
    }

    fn apply_spherical(&mut self, azimuth: f32, polar: f32, distance: f32) {
        let polar = polar.clamp(self.bounds.min_polar, self.bounds.max_polar);
        let distance = distance.clamp(self.bounds.min_distance, self.bounds.max_distance);
        self.eye = calculate_cartesian_eye_position(polar, azimuth, distance, self.target);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCameraBounds {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Kept above zero so the view never looks straight down the up axis.
    pub min_polar: f32,
    pub max_polar: f32,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: 8.0,
            max_distance: 80.0,
            min_polar: 1e-3,
            max_polar: PI / 2.2,
        }
    }
}

fn calculate_cartesian_eye_position(
    polar: f32,
    azimuth: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * polar.sin() * azimuth.sin(),
        distance * polar.cos(),
        distance * polar.sin() * azimuth.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(RoomDims::default(), 16.0 / 9.0)
    }

    #[test]
    fn iso_pose_looks_at_centroid() {
        let camera = camera();
        assert_eq!(camera.mode(), ViewMode::Iso);
        assert_eq!(camera.target, Vector3::new(9.5, 0.0, 7.0));
        assert!((camera.eye - Vector3::new(16.0, 16.0, 18.0)).magnitude() < 1e-3);
    }

    #[test]
    fn top_view_stays_just_off_vertical() {
        let mut camera = camera();
        camera.set_mode(ViewMode::Top);
        assert!((camera.distance() - 25.0).abs() < 1e-3);
        assert!(camera.polar() > 0.0);
        assert!(camera.polar() < 0.01);

        let vp = camera.view_proj();
        assert!(vp.x.x.is_finite() && vp.w.w.is_finite());
    }

    #[test]
    fn walk_view_respects_polar_limit() {
        let mut camera = camera();
        camera.set_mode(ViewMode::Walk);
        assert!(camera.polar() <= PI / 2.5 + 1e-4);
        assert!(camera.distance() >= 8.0);
    }

    #[test]
    fn distance_is_clamped() {
        let mut camera = camera();
        camera.zoom(100.0);
        camera.update();
        assert!((camera.distance() - 80.0).abs() < 1e-3);

        camera.zoom(0.001);
        camera.update();
        assert!((camera.distance() - 8.0).abs() < 1e-3);
    }

    #[test]
    fn rotation_is_damped() {
        let mut camera = camera();
        let start = camera.azimuth();
        camera.rotate(1.0, 0.0);
        assert!(camera.update());
        let moved = camera.azimuth() - start;
        assert!((moved - DAMPING_FACTOR).abs() < 1e-4);

        for _ in 0..1000 {
            camera.update();
        }
        assert!(!camera.update());
        assert!((camera.azimuth() - start - 1.0).abs() < 1e-2);
    }

    #[test]
    fn retarget_preserves_distance_and_pitch() {
        let mut camera = camera();
        let (distance, polar, azimuth) = (camera.distance(), camera.polar(), camera.azimuth());
        camera.retarget(Vector3::new(3.0, 0.0, 4.0));
        assert_eq!(camera.target, Vector3::new(3.0, 0.0, 4.0));
        assert!((camera.distance() - distance).abs() < 1e-4);
        assert!((camera.polar() - polar).abs() < 1e-4);
        assert!((camera.azimuth() - azimuth).abs() < 1e-4);
    }

    #[test]
    fn target_projects_to_screen_centre_inside_depth_range() {
        for mode in [ViewMode::Top, ViewMode::Iso, ViewMode::Walk] {
            let mut camera = camera();
            camera.set_mode(mode);
            let t = camera.target;
            let clip = camera.view_proj() * Vector4::new(t.x, t.y, t.z, 1.0);
            assert!(clip.w > 0.0, "{mode}: target behind the camera");

            let (x, y, z) = (clip.x / clip.w, clip.y / clip.w, clip.z / clip.w);
            assert!(x.abs() < 1e-4 && y.abs() < 1e-4, "{mode}: ndc ({x}, {y})");
            assert!((0.0..1.0).contains(&z), "{mode}: depth {z}");
            // clip w is the view-space distance along the view axis
            assert!((clip.w - camera.distance()).abs() < 1e-2, "{mode}: w {}", clip.w);
        }
    }

    #[test]
    fn nearer_points_get_smaller_depth() {
        let camera = camera();
        let depth = |p: Vector3<f32>| {
            let clip = camera.view_proj() * p.extend(1.0);
            clip.z / clip.w
        };
        let towards_eye = camera.target + (camera.eye - camera.target) * 0.5;
        assert!(depth(towards_eye) < depth(camera.target));
    }

    #[test]
    fn zero_sized_resize_keeps_aspect() {
        let mut camera = camera();
        camera.resize_projection(0, 600);
        assert!((camera.aspect - 16.0 / 9.0).abs() < 1e-6);
        camera.resize_projection(800, 400);
        assert!((camera.aspect - 2.0).abs() < 1e-6);
    }
}
