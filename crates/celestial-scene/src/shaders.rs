//! WGSL programs for the planet surface, the accretion disk and the point clouds.
//!
//! Every program reads the camera from group 0 and its own uniform block from
//! group 1. Output depends only on vertex inputs and uniforms.

use bytemuck::{Pod, Zeroable};

/// Planet surface uniforms.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PlanetUniforms {
    /// World transform of the sphere.
    pub model: [[f32; 4]; 4],
    /// Ambient light colour pre-multiplied by intensity; w unused.
    pub ambient: [f32; 4],
    /// Point light position in world space; w unused.
    pub light_position: [f32; 4],
    /// Point light colour pre-multiplied by intensity; w unused.
    pub light_color: [f32; 4],
    /// Elapsed scene time in seconds.
    pub time: f32,
    pub _padding: [f32; 3],
}

/// Accretion disk uniforms.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DiskUniforms {
    pub model: [[f32; 4]; 4],
    /// Base colour in linear RGB; w unused.
    pub color: [f32; 4],
    /// Highlight colour in linear RGB; w unused.
    pub secondary_color: [f32; 4],
    pub time: f32,
    pub _padding: [f32; 3],
}

/// Point cloud uniforms shared by the starfield and the particle ring.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PointsUniforms {
    pub model: [[f32; 4]; 4],
    /// Multiplied into each vertex colour; alpha carries the layer opacity.
    pub tint: [f32; 4],
}

const CAMERA_BLOCK: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> camera: Camera;
"#;

const PLANET_BODY: &str = r#"
struct Planet {
    model: mat4x4<f32>,
    ambient: vec4<f32>,
    light_position: vec4<f32>,
    light_color: vec4<f32>,
    time: f32,
};

@group(1) @binding(0)
var<uniform> planet: Planet;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_planet(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = planet.model * vec4<f32>(in.position, 1.0);
    out.clip_position = camera.view_proj * world;
    out.world_position = world.xyz;
    // Model is a pure rotation, so it transforms normals directly.
    out.world_normal = (planet.model * vec4<f32>(in.normal, 0.0)).xyz;
    out.uv = in.uv;
    return out;
}

fn hash(p: vec2<f32>) -> f32 {
    return fract(sin(dot(p, vec2<f32>(127.1, 311.7))) * 43758.5453);
}

fn value_noise(p: vec2<f32>) -> f32 {
    let i = floor(p);
    let f = fract(p);
    let u = f * f * (3.0 - 2.0 * f);
    let a = hash(i);
    let b = hash(i + vec2<f32>(1.0, 0.0));
    let c = hash(i + vec2<f32>(0.0, 1.0));
    let d = hash(i + vec2<f32>(1.0, 1.0));
    return mix(mix(a, b, u.x), mix(c, d, u.x), u.y);
}

fn turbulence(p: vec2<f32>) -> f32 {
    var sum = 0.0;
    var amplitude = 0.5;
    var q = p;
    for (var octave = 0; octave < 4; octave++) {
        sum += amplitude * value_noise(q);
        q = q * 2.03 + vec2<f32>(17.0, 9.0);
        amplitude *= 0.5;
    }
    return sum;
}

@fragment
fn fs_planet(in: VertexOutput) -> @location(0) vec4<f32> {
    let latitude = in.uv.y;
    let swirl = turbulence(vec2<f32>(in.uv.x * 8.0 + planet.time * 0.02, latitude * 14.0));
    let bands = sin(latitude * 42.0 + swirl * 5.0 + planet.time * 0.1) * 0.5 + 0.5;

    let deep = vec3<f32>(0.01, 0.04, 0.22);
    let pale = vec3<f32>(0.22, 0.5, 0.95);
    let storm = vec3<f32>(0.75, 0.88, 1.0);
    var albedo = mix(deep, pale, bands);
    albedo = mix(albedo, storm, smoothstep(0.62, 0.8, swirl) * 0.35);

    let n = normalize(in.world_normal);
    let l = normalize(planet.light_position.xyz - in.world_position);
    let v = normalize(camera.position.xyz - in.world_position);
    let diffuse = max(dot(n, l), 0.0);
    let rim = pow(1.0 - max(dot(n, v), 0.0), 3.0);

    let lit = albedo * (planet.ambient.rgb + planet.light_color.rgb * diffuse)
        + vec3<f32>(0.2, 0.45, 1.0) * rim * 0.6;
    return vec4<f32>(lit, 1.0);
}
"#;

const DISK_BODY: &str = r#"
struct Disk {
    model: mat4x4<f32>,
    color: vec4<f32>,
    secondary_color: vec4<f32>,
    time: f32,
};

@group(1) @binding(0)
var<uniform> disk: Disk;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_disk(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * disk.model * vec4<f32>(in.position, 1.0);
    out.uv = in.uv;
    return out;
}

@fragment
fn fs_disk(in: VertexOutput) -> @location(0) vec4<f32> {
    let centered = in.uv - vec2<f32>(0.5, 0.5);
    // 0 at the centre, 1 at the middle of each plane edge.
    let r = length(centered) * 2.0;
    let angle = atan2(centered.y, centered.x);

    let inner_fade = smoothstep(0.3, 0.42, r);
    let outer_fade = 1.0 - smoothstep(0.72, 1.0, r);

    let swirl = sin(angle * 3.0 + r * 14.0 - disk.time * 0.6) * 0.5 + 0.5;
    let streaks = sin(angle * 19.0 - r * 36.0 + disk.time * 1.3) * 0.5 + 0.5;
    let blend = clamp(swirl * 0.7 + streaks * 0.3, 0.0, 1.0);

    let color = mix(disk.color.rgb, disk.secondary_color.rgb, blend);
    let alpha = inner_fade * outer_fade * (0.3 + 0.7 * blend) * 0.85;
    return vec4<f32>(color, alpha);
}
"#;

const POINTS_BODY: &str = r#"
struct Points {
    model: mat4x4<f32>,
    tint: vec4<f32>,
};

@group(1) @binding(0)
var<uniform> points: Points;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_points(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = camera.view_proj * points.model * vec4<f32>(in.position, 1.0);
    out.color = in.color * points.tint;
    return out;
}

@fragment
fn fs_points(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Full WGSL source for the planet program.
pub fn planet_shader_source() -> String {
    format!("{CAMERA_BLOCK}{PLANET_BODY}")
}

/// Full WGSL source for the accretion disk program.
pub fn disk_shader_source() -> String {
    format!("{CAMERA_BLOCK}{DISK_BODY}")
}

/// Full WGSL source for the point-cloud program.
pub fn points_shader_source() -> String {
    format!("{CAMERA_BLOCK}{POINTS_BODY}")
}
