use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Divisor applied to raw pointer coordinates to get radians.
pub const DEFAULT_SPEED: f32 = 50.0;

/// Clip-space depth convention of the graphics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthRange {
    /// GL-style clip space, z in [-1, 1].
    NegOneToOne,
    /// wgpu/Vulkan/Metal clip space, z in [0, 1].
    ZeroToOne,
}

/// Fixed camera placement and perspective parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSetup {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraSetup {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, -8.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraSetup {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32, depth: DepthRange) -> Mat4 {
        let fov = self.fov_degrees.to_radians();
        match depth {
            DepthRange::NegOneToOne => Mat4::perspective_rh_gl(fov, aspect, self.near, self.far),
            DepthRange::ZeroToOne => Mat4::perspective_rh(fov, aspect, self.near, self.far),
        }
    }
}

/// World rotation for the given raw pointer angles.
///
/// Yaw about Y by `angle_x / speed`, then pitch about X by `angle_y / speed`,
/// both starting from identity: `world = yaw * pitch`.
pub fn world_rotation(angle_x: f32, angle_y: f32, speed: f32) -> Mat4 {
    let yaw = Mat4::from_rotation_y(angle_x / speed);
    let pitch = Mat4::from_rotation_x(angle_y / speed);
    yaw * pitch
}

/// The three transform matrices uploaded to the shader program.
///
/// View and projection have no setters; only `world` changes after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    world: Mat4,
    view: Mat4,
    projection: Mat4,
}

impl TransformState {
    /// World starts at identity; view and projection are fixed here.
    pub fn new(camera: &CameraSetup, aspect: f32, depth: DepthRange) -> Self {
        Self {
            world: Mat4::IDENTITY,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(aspect, depth),
        }
    }

    pub fn world(&self) -> Mat4 {
        self.world
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Overwrite the world matrix from the current angles and return it.
    pub fn update_world(&mut self, angle_x: f32, angle_y: f32, speed: f32) -> Mat4 {
        self.world = world_rotation(angle_x, angle_y, speed);
        self.world
    }
}
