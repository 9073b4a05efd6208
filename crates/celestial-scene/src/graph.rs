//! CPU side of the scene: camera, lights and the node hierarchy.
//!
//! ```text
//! stars
//! group (tilted, orbits)
//! ├── planet (spins about Y)
//! ├── disk (laid flat, spins about local Z)
//! └── particles (laid flat, spins about local Z)
//! ```

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};

use celestial_render::{Camera, PhysicalSize};

use crate::driver::SceneAnimation;
use crate::sampling::linear_rgb;

pub const CAMERA_POSITION: Vec3 = Vec3::new(15.0, 12.0, 25.0);
pub const CAMERA_FOV_DEGREES: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

pub const AMBIENT_COLOR: u32 = 0xffffff;
pub const AMBIENT_INTENSITY: f32 = 0.2;
pub const POINT_LIGHT_COLOR: u32 = 0x60a5fa;
pub const POINT_LIGHT_INTENSITY: f32 = 2.5;
pub const POINT_LIGHT_POSITION: Vec3 = Vec3::new(10.0, 10.0, 10.0);

/// Tilt of the main group about X, in radians.
pub const GROUP_TILT: f32 = 0.2;

pub const PLANET_RADIUS: f32 = 3.2;
pub const PLANET_SEGMENTS: u32 = 64;

pub const DISK_SIZE: f32 = 22.0;
pub const DISK_SEGMENTS: u32 = 128;
pub const DISK_COLOR: u32 = 0x1e40af;
pub const DISK_SECONDARY_COLOR: u32 = 0x60a5fa;

pub const STAR_OPACITY: f32 = 0.5;
pub const PARTICLE_OPACITY: f32 = 0.8;

/// A light with a linear colour and a scalar intensity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    /// Colour pre-multiplied by intensity, as the shaders consume it.
    pub fn radiance(&self) -> Vec3 {
        self.color * self.intensity
    }
}

/// A node's local rotation as XYZ Euler angles (radians).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Node {
    pub rotation: Vec3,
}

impl Node {
    fn tilted(x: f32) -> Self {
        Self {
            rotation: Vec3::new(x, 0.0, 0.0),
        }
    }

    /// Local transform, applying Z first and X last (XYZ order).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
    }
}

/// Camera, lights and node transforms of the mounted scene.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub camera: Camera,
    pub ambient: Light,
    pub point_light: Light,
    pub point_light_position: Vec3,
    pub group: Node,
    pub planet: Node,
    pub disk: Node,
    pub particles: Node,
    /// Elapsed time fed to the shader programs.
    pub time: f32,
}

impl SceneGraph {
    /// Wire the fixed scene for a window of `viewport` physical pixels.
    pub fn new(viewport: PhysicalSize) -> Self {
        let mut camera = Camera::look_at(
            CAMERA_POSITION,
            Vec3::ZERO,
            CAMERA_FOV_DEGREES.to_radians(),
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        camera.set_aspect_ratio(viewport.width as f32, viewport.height as f32);

        Self {
            camera,
            ambient: Light {
                color: linear_rgb(AMBIENT_COLOR),
                intensity: AMBIENT_INTENSITY,
            },
            point_light: Light {
                color: linear_rgb(POINT_LIGHT_COLOR),
                intensity: POINT_LIGHT_INTENSITY,
            },
            point_light_position: POINT_LIGHT_POSITION,
            group: Node::tilted(GROUP_TILT),
            planet: Node::default(),
            disk: Node::tilted(-FRAC_PI_2),
            particles: Node::tilted(-FRAC_PI_2),
            time: 0.0,
        }
    }

    /// Track a new viewport: aspect becomes exactly width / height.
    ///
    /// Takes the window size, not the render target, which may be rounded
    /// after pixel-ratio capping.
    pub fn resize(&mut self, viewport: PhysicalSize) {
        self.camera
            .set_aspect_ratio(viewport.width as f32, viewport.height as f32);
    }

    /// Set time and node rotations for one frame.
    pub fn apply(&mut self, animation: &SceneAnimation) {
        self.time = animation.time;
        self.planet.rotation.y = animation.planet_spin;
        self.disk.rotation.z = animation.disk_spin;
        self.particles.rotation.z = animation.particle_spin;
        self.group.rotation.y = animation.group_orbit;
    }

    pub fn stars_model(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    pub fn planet_model(&self) -> Mat4 {
        self.group.matrix() * self.planet.matrix()
    }

    pub fn disk_model(&self) -> Mat4 {
        self.group.matrix() * self.disk.matrix()
    }

    pub fn particles_model(&self) -> Mat4 {
        self.group.matrix() * self.particles.matrix()
    }
}
