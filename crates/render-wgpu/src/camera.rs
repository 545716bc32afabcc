use glam::{Mat4, Vec3};
use knotfade_shading::Transforms;

/// Orbit camera circling a target point.
///
/// Drag input accumulates into a pending rotation that `update` applies a
/// fraction of each frame, so motion eases out after the pointer stops.
/// Camera motion lives entirely on the host side; the shader only sees the
/// resulting matrices and position.
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Angle around the Y axis; zero looks down -Z from +Z.
    pub yaw: f32,
    /// Elevation above the XZ plane.
    pub pitch: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Radians of rotation per pixel of drag.
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    /// Fraction of pending rotation applied per frame, in (0, 1].
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
}

const MAX_PITCH: f32 = 89.0 * std::f32::consts::PI / 180.0;

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 3.0,
            yaw: 0.0,
            pitch: 0.0,
            fov: 90.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            rotate_speed: 0.005,
            zoom_speed: 1.0,
            damping: 0.05,
            min_distance: 0.5,
            max_distance: 100.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn position(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    pub fn up(&self) -> Vec3 {
        self.right().cross(self.forward()).normalize()
    }

    /// Queue a rotation from a pointer drag of `dx`, `dy` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_yaw -= dx * self.rotate_speed;
        self.pending_pitch += dy * self.rotate_speed;
    }

    /// Move the target in the view plane by a drag of `dx`, `dy` pixels.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        // World units per pixel at the target's depth.
        let scale = 2.0 * self.distance * (self.fov * 0.5).tan() / viewport_height.max(1.0);
        let offset = -self.right() * dx * scale + self.up() * dy * scale;
        self.target += offset;
    }

    /// Dolly towards (positive `scroll`) or away from the target.
    pub fn zoom(&mut self, scroll: f32) {
        let factor = 0.95_f32.powf(scroll * self.zoom_speed);
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Apply one frame's share of the pending rotation.
    pub fn update(&mut self) {
        let share = self.damping.clamp(f32::EPSILON, 1.0);
        let dyaw = self.pending_yaw * share;
        let dpitch = self.pending_pitch * share;
        self.pending_yaw -= dyaw;
        self.pending_pitch -= dpitch;

        self.yaw += dyaw;
        self.pitch = (self.pitch + dpitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Matrices and eye position for the vertex stage.
    pub fn transforms(&self, model: Mat4) -> Transforms {
        Transforms {
            model,
            view: self.view_matrix(),
            projection: self.projection_matrix(),
            camera_position: self.position(),
        }
    }
}
