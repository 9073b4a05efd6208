//! Point-cloud sampling for the background starfield and the orbiting particle ring.
//!
//! Sampling is CPU-only and deterministic for a given seed, so it can be
//! tested without a GPU.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use celestial_config::SceneConfig;
use celestial_render::{VertexPositionColor, srgb_to_linear};

/// Inner particle colour (#3b82f6).
pub const PARTICLE_INNER_COLOR: u32 = 0x3b82f6;
/// Colour particles are blended toward (#ffffff).
pub const PARTICLE_OUTER_COLOR: u32 = 0xffffff;
/// Maximum blend factor toward [`PARTICLE_OUTER_COLOR`].
pub const PARTICLE_MAX_BLEND: f32 = 0.5;
/// Total thickness of the particle ring.
pub const PARTICLE_RING_THICKNESS: f32 = 0.4;
/// Exponent applied to the radial sample; > 1 packs particles toward the inner edge.
pub const PARTICLE_RADIAL_EXPONENT: f32 = 1.5;

/// Convert a 0xRRGGBB sRGB colour to linear RGB.
pub fn linear_rgb(hex: u32) -> Vec3 {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f64 / 255.0) as f32;
    Vec3::new(channel(16), channel(8), channel(0))
}

/// Both point clouds of one mounted scene.
#[derive(Debug, Clone)]
pub struct ScenePopulation {
    pub seed: u64,
    pub stars: Vec<VertexPositionColor>,
    pub particles: Vec<VertexPositionColor>,
}

impl ScenePopulation {
    /// Sample stars then particles from one seeded stream.
    ///
    /// When the config has no fixed seed a fresh one is drawn, so every mount
    /// gets a different sky.
    pub fn sample(config: &SceneConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let stars = sample_starfield(&mut rng, config.star_count, config.star_radius);
        let particles = sample_particle_ring(
            &mut rng,
            config.particle_count,
            config.ring_inner_radius,
            config.ring_spread,
        );

        tracing::debug!(
            seed,
            stars = stars.len(),
            particles = particles.len(),
            "Sampled scene population"
        );

        Self {
            seed,
            stars,
            particles,
        }
    }
}

/// Points uniformly distributed over a sphere of `radius`.
///
/// θ is uniform in [0, 2π) and φ = acos(2u − 1), which gives a uniform
/// density per unit area. Stars are white; opacity is applied by the tint.
pub fn sample_starfield<R: Rng>(rng: &mut R, count: u32, radius: f32) -> Vec<VertexPositionColor> {
    (0..count)
        .map(|_| {
            let theta = std::f32::consts::TAU * rng.random::<f32>();
            let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
            let position = Vec3::new(
                phi.sin() * theta.cos(),
                phi.sin() * theta.sin(),
                phi.cos(),
            ) * radius;

            VertexPositionColor {
                position: position.to_array(),
                color: [1.0; 4],
            }
        })
        .collect()
}

/// Particles in a flat annulus in the local XY plane.
///
/// The ring is rotated into the disk plane by its node transform. Local Z
/// carries the small vertical jitter.
pub fn sample_particle_ring<R: Rng>(
    rng: &mut R,
    count: u32,
    inner_radius: f32,
    spread: f32,
) -> Vec<VertexPositionColor> {
    let inner = linear_rgb(PARTICLE_INNER_COLOR);
    let outer = linear_rgb(PARTICLE_OUTER_COLOR);

    (0..count)
        .map(|_| {
            let angle = (rng.random::<f32>() * std::f32::consts::TAU)
                .rem_euclid(std::f32::consts::TAU);
            let radius = inner_radius + rng.random::<f32>().powf(PARTICLE_RADIAL_EXPONENT) * spread;
            let height = (rng.random::<f32>() - 0.5) * PARTICLE_RING_THICKNESS;
            let color = inner.lerp(outer, rng.random::<f32>() * PARTICLE_MAX_BLEND);

            VertexPositionColor {
                position: [angle.cos() * radius, angle.sin() * radius, height],
                color: color.extend(1.0).to_array(),
            }
        })
        .collect()
}
