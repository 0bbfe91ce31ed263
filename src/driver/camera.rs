//! Look-around camera for flat (debug) viewing
//!
//! The viewer stays at the origin, inside the sphere, and turns its head.
//! Default orientation looks down -Z, the centre of 180° content.

use glam::{Mat4, Vec3};

const PITCH_LIMIT: f32 = 1.5;
const MIN_FOV_DEGREES: f32 = 30.0;
const MAX_FOV_DEGREES: f32 = 120.0;

/// Yaw/pitch camera at the origin
#[derive(Debug, Clone)]
pub struct LookCamera {
    /// Horizontal angle (yaw) in radians, positive turns right
    yaw: f32,
    /// Vertical angle (pitch) in radians, positive looks up
    pitch: f32,
    /// Vertical field of view in radians
    fov: f32,
    /// Aspect ratio (width/height) for projection
    aspect: f32,
    near: f32,
    far: f32,
}

impl LookCamera {
    /// Create a camera with the given vertical field of view in degrees
    pub fn new(fov_degrees: f32) -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            fov: fov_degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES).to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.05,
            far: 100.0,
        }
    }

    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(Vec3::ZERO, self.forward(), Vec3::Y)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_for_aspect(self.aspect)
    }

    /// Projection for a different aspect ratio (e.g. one eye's viewport)
    pub fn projection_for_aspect(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect.max(f32::EPSILON), self.near, self.far)
    }

    /// Handle mouse drag to turn the head
    pub fn on_mouse_drag(&mut self, delta: (f32, f32), sensitivity: f32) {
        self.yaw += delta.0 * sensitivity;
        self.pitch = (self.pitch - delta.1 * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Handle scroll to zoom (narrows the field of view)
    pub fn on_scroll(&mut self, delta: f32) {
        let degrees = self.fov.to_degrees() * (1.0 - delta * 0.1);
        self.fov = degrees.clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES).to_radians();
    }

    /// Update aspect ratio on resize
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Vertical field of view in degrees
    pub fn fov_degrees(&self) -> f32 {
        self.fov.to_degrees()
    }

    /// Set head orientation
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Look straight ahead again
    pub fn reset(&mut self) {
        self.yaw = 0.0;
        self.pitch = 0.0;
    }
}

impl Default for LookCamera {
    fn default() -> Self {
        Self::new(90.0)
    }
}
