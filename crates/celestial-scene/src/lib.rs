//! The animated planet scene: point-cloud sampling, mesh generation, WGSL
//! programs, the scene graph, GPU upload, the frame driver and teardown.

pub mod builder;
pub mod driver;
pub mod geometry;
pub mod graph;
pub mod lifecycle;
pub mod sampling;
pub mod shaders;

pub use builder::{Scene, SceneBuilder, SceneResources};
pub use driver::{
    AnimationDriver, DriverState, FrameHost, FrameRequest, SceneAnimation, SceneClock,
};
pub use geometry::{MeshData, plane, uv_sphere};
pub use graph::{Light, Node, SceneGraph};
pub use lifecycle::{Release, SceneLifecycle};
pub use sampling::{ScenePopulation, linear_rgb, sample_particle_ring, sample_starfield};
pub use shaders::{DiskUniforms, PlanetUniforms, PointsUniforms};
