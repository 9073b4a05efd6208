//! GPU upload of the scene: pipelines, buffers and bind groups.
//!
//! [`SceneBuilder::build`] samples the point clouds, generates the meshes and
//! uploads everything into a [`SceneResources`] bundle, paired with the CPU
//! [`SceneGraph`] in a [`Scene`].

use celestial_config::SceneConfig;
use celestial_render::{
    BufferAllocator, CameraUniform, DepthBuffer, IndexData, MeshBuffer, PhysicalSize, PointBuffer,
    VertexPositionColor, VertexPositionNormalUv,
};

use crate::driver::SceneAnimation;
use crate::geometry::{MeshData, plane, uv_sphere};
use crate::graph::{
    DISK_COLOR, DISK_SECONDARY_COLOR, DISK_SEGMENTS, DISK_SIZE, PARTICLE_OPACITY, PLANET_RADIUS,
    PLANET_SEGMENTS, STAR_OPACITY, SceneGraph,
};
use crate::lifecycle::Release;
use crate::sampling::{ScenePopulation, linear_rgb};
use crate::shaders::{
    DiskUniforms, PlanetUniforms, PointsUniforms, disk_shader_source, planet_shader_source,
    points_shader_source,
};

/// `src * alpha + dst`, leaving destination alpha untouched.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::Zero,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// An indexed mesh with its own uniform block and pipeline.
struct MeshLayer {
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

/// A point cloud with its own uniform block and pipeline.
struct PointLayer {
    points: PointBuffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipeline: wgpu::RenderPipeline,
}

/// Every GPU allocation of a mounted scene.
pub struct SceneResources {
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    stars: PointLayer,
    planet: MeshLayer,
    disk: MeshLayer,
    particles: PointLayer,
    depth: DepthBuffer,
}

impl SceneResources {
    pub fn planet_index_count(&self) -> u32 {
        self.planet.mesh.index_count
    }

    pub fn disk_index_count(&self) -> u32 {
        self.disk.mesh.index_count
    }

    pub fn star_count(&self) -> u32 {
        self.stars.points.count
    }

    pub fn particle_count(&self) -> u32 {
        self.particles.points.count
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }
}

impl Release for SceneResources {
    fn release(self) {
        let Self {
            camera_buffer,
            camera_bind_group,
            stars,
            planet,
            disk,
            particles,
            depth,
        } = self;

        drop(camera_bind_group);
        camera_buffer.destroy();
        for layer in [planet, disk] {
            layer.mesh.destroy();
            layer.uniform_buffer.destroy();
        }
        for layer in [stars, particles] {
            layer.points.destroy();
            layer.uniform_buffer.destroy();
        }
        depth.destroy();
        tracing::info!("Scene GPU resources released");
    }
}

/// A mounted scene: CPU graph plus GPU bundle.
pub struct Scene {
    pub graph: SceneGraph,
    pub resources: SceneResources,
}

impl Scene {
    /// Track a resize: the camera follows the viewport, the depth buffer the render target.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        viewport: PhysicalSize,
        render: PhysicalSize,
    ) {
        self.graph.resize(viewport);
        self.resources.depth.resize(device, render.width, render.height);
    }

    /// Apply one frame's animation and upload every uniform block.
    pub fn prepare(&mut self, queue: &wgpu::Queue, animation: &SceneAnimation) {
        self.graph.apply(animation);
        let graph = &self.graph;
        let r = &self.resources;

        queue.write_buffer(
            &r.camera_buffer,
            0,
            bytemuck::bytes_of(&graph.camera.to_uniform()),
        );
        queue.write_buffer(
            &r.planet.uniform_buffer,
            0,
            bytemuck::bytes_of(&planet_uniforms(graph)),
        );
        queue.write_buffer(
            &r.disk.uniform_buffer,
            0,
            bytemuck::bytes_of(&disk_uniforms(graph)),
        );
        queue.write_buffer(
            &r.stars.uniform_buffer,
            0,
            bytemuck::bytes_of(&points_uniforms(graph.stars_model(), STAR_OPACITY)),
        );
        queue.write_buffer(
            &r.particles.uniform_buffer,
            0,
            bytemuck::bytes_of(&points_uniforms(
                graph.particles_model(),
                PARTICLE_OPACITY,
            )),
        );
    }

    /// Record the draw calls: stars, planet, then the two additive layers.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        let r = &self.resources;
        pass.set_bind_group(0, &r.camera_bind_group, &[]);

        pass.set_pipeline(&r.stars.pipeline);
        pass.set_bind_group(1, &r.stars.bind_group, &[]);
        r.stars.points.draw(pass);

        for layer in [&r.planet, &r.disk] {
            pass.set_pipeline(&layer.pipeline);
            pass.set_bind_group(1, &layer.bind_group, &[]);
            layer.mesh.bind(pass);
            layer.mesh.draw(pass);
        }

        pass.set_pipeline(&r.particles.pipeline);
        pass.set_bind_group(1, &r.particles.bind_group, &[]);
        r.particles.points.draw(pass);
    }

    /// Depth attachment for the scene pass.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.resources.depth.view
    }
}

impl Release for Scene {
    fn release(self) {
        self.resources.release();
    }
}

fn planet_uniforms(graph: &SceneGraph) -> PlanetUniforms {
    PlanetUniforms {
        model: graph.planet_model().to_cols_array_2d(),
        ambient: graph.ambient.radiance().extend(0.0).to_array(),
        light_position: graph.point_light_position.extend(1.0).to_array(),
        light_color: graph.point_light.radiance().extend(0.0).to_array(),
        time: graph.time,
        _padding: [0.0; 3],
    }
}

fn disk_uniforms(graph: &SceneGraph) -> DiskUniforms {
    DiskUniforms {
        model: graph.disk_model().to_cols_array_2d(),
        color: linear_rgb(DISK_COLOR).extend(1.0).to_array(),
        secondary_color: linear_rgb(DISK_SECONDARY_COLOR).extend(1.0).to_array(),
        time: graph.time,
        _padding: [0.0; 3],
    }
}

fn points_uniforms(model: glam::Mat4, opacity: f32) -> PointsUniforms {
    PointsUniforms {
        model: model.to_cols_array_2d(),
        tint: [1.0, 1.0, 1.0, opacity],
    }
}

/// Fixed-function state that differs between the scene's pipelines.
struct PipelineSpec<'a> {
    label: &'a str,
    source: String,
    vertex_entry: &'a str,
    fragment_entry: &'a str,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    topology: wgpu::PrimitiveTopology,
    cull_mode: Option<wgpu::Face>,
    depth: wgpu::DepthStencilState,
    blend: Option<wgpu::BlendState>,
}

/// Builds a [`Scene`] for one surface format.
pub struct SceneBuilder<'a> {
    device: &'a wgpu::Device,
    format: wgpu::TextureFormat,
    camera_layout: wgpu::BindGroupLayout,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(device: &'a wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let camera_layout = uniform_layout(
            device,
            "scene-camera-bgl",
            std::mem::size_of::<CameraUniform>(),
        );
        Self {
            device,
            format,
            camera_layout,
        }
    }

    /// Sample, generate and upload the whole scene.
    ///
    /// `viewport` is the window size in physical pixels and sets the camera
    /// aspect; `render` is the render target size and sizes the depth buffer.
    pub fn build(
        &self,
        config: &SceneConfig,
        viewport: PhysicalSize,
        render: PhysicalSize,
    ) -> Scene {
        let population = ScenePopulation::sample(config);
        let graph = SceneGraph::new(viewport);
        let allocator = BufferAllocator::new(self.device);

        let camera_buffer = allocator.create_uniform("scene-camera", &graph.camera.to_uniform());
        let camera_bind_group = bind_uniform(
            self.device,
            "scene-camera-bg",
            &self.camera_layout,
            &camera_buffer,
        );

        let stars = self.point_layer(
            &allocator,
            "stars",
            &population.stars,
            points_uniforms(graph.stars_model(), STAR_OPACITY),
            Some(wgpu::BlendState::ALPHA_BLENDING),
        );

        let planet = self.mesh_layer(
            &allocator,
            &uv_sphere(PLANET_RADIUS, PLANET_SEGMENTS, PLANET_SEGMENTS),
            &planet_uniforms(&graph),
            PipelineSpec {
                label: "planet",
                source: planet_shader_source(),
                vertex_entry: "vs_planet",
                fragment_entry: "fs_planet",
                vertex_layout: VertexPositionNormalUv::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                depth: DepthBuffer::opaque_state(),
                blend: None,
            },
        );

        let disk = self.mesh_layer(
            &allocator,
            &plane(DISK_SIZE, DISK_SIZE, DISK_SEGMENTS, DISK_SEGMENTS),
            &disk_uniforms(&graph),
            PipelineSpec {
                label: "disk",
                source: disk_shader_source(),
                vertex_entry: "vs_disk",
                fragment_entry: "fs_disk",
                vertex_layout: VertexPositionNormalUv::layout(),
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                depth: DepthBuffer::read_only_state(),
                blend: Some(ADDITIVE),
            },
        );

        let particles = self.point_layer(
            &allocator,
            "particles",
            &population.particles,
            points_uniforms(graph.particles_model(), PARTICLE_OPACITY),
            Some(ADDITIVE),
        );

        let depth = DepthBuffer::new(self.device, render.width, render.height);

        tracing::info!(
            seed = population.seed,
            stars = stars.points.count,
            particles = particles.points.count,
            planet_triangles = planet.mesh.index_count / 3,
            disk_triangles = disk.mesh.index_count / 3,
            "Scene built"
        );

        Scene {
            graph,
            resources: SceneResources {
                camera_buffer,
                camera_bind_group,
                stars,
                planet,
                disk,
                particles,
                depth,
            },
        }
    }

    fn mesh_layer<U: bytemuck::Pod>(
        &self,
        allocator: &BufferAllocator,
        data: &MeshData,
        uniforms: &U,
        spec: PipelineSpec,
    ) -> MeshLayer {
        let label = spec.label;
        let mesh = allocator.create_mesh(
            label,
            bytemuck::cast_slice(&data.vertices),
            IndexData::U32(&data.indices),
        );
        let layout = uniform_layout(
            self.device,
            &format!("{label}-uniform-bgl"),
            std::mem::size_of::<U>(),
        );
        let uniform_buffer = allocator.create_uniform(&format!("{label}-uniforms"), uniforms);
        let bind_group = bind_uniform(
            self.device,
            &format!("{label}-uniform-bg"),
            &layout,
            &uniform_buffer,
        );
        let pipeline = self.pipeline(&layout, spec);

        MeshLayer {
            mesh,
            uniform_buffer,
            bind_group,
            pipeline,
        }
    }

    fn point_layer(
        &self,
        allocator: &BufferAllocator,
        label: &str,
        points: &[VertexPositionColor],
        uniforms: PointsUniforms,
        blend: Option<wgpu::BlendState>,
    ) -> PointLayer {
        let layout = uniform_layout(
            self.device,
            &format!("{label}-uniform-bgl"),
            std::mem::size_of::<PointsUniforms>(),
        );
        let uniform_buffer = allocator.create_uniform(&format!("{label}-uniforms"), &uniforms);
        let bind_group = bind_uniform(
            self.device,
            &format!("{label}-uniform-bg"),
            &layout,
            &uniform_buffer,
        );
        let pipeline = self.pipeline(
            &layout,
            PipelineSpec {
                label,
                source: points_shader_source(),
                vertex_entry: "vs_points",
                fragment_entry: "fs_points",
                vertex_layout: VertexPositionColor::layout(),
                topology: wgpu::PrimitiveTopology::PointList,
                cull_mode: None,
                depth: DepthBuffer::read_only_state(),
                blend,
            },
        );

        PointLayer {
            points: allocator.create_points(label, points),
            uniform_buffer,
            bind_group,
            pipeline,
        }
    }

    fn pipeline(
        &self,
        uniform_layout: &wgpu::BindGroupLayout,
        spec: PipelineSpec,
    ) -> wgpu::RenderPipeline {
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&format!("{}-shader", spec.label)),
                source: wgpu::ShaderSource::Wgsl(spec.source.into()),
            });

        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{}-pipeline-layout", spec.label)),
                bind_group_layouts: &[&self.camera_layout, uniform_layout],
                immediate_size: 0,
            });

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{}-pipeline", spec.label)),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some(spec.vertex_entry),
                    buffers: &[spec.vertex_layout],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    topology: spec.topology,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: spec.cull_mode,
                    ..Default::default()
                },
                depth_stencil: Some(spec.depth),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some(spec.fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: spec.blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                multiview_mask: None,
                cache: None,
            })
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str, size: usize) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(size as u64),
            },
            count: None,
        }],
    })
}

fn bind_uniform(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use celestial_render::{SurfaceWrapper, request_headless_device};

    const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    fn small_config() -> SceneConfig {
        SceneConfig {
            star_count: 300,
            particle_count: 200,
            seed: Some(8),
            ..SceneConfig::default()
        }
    }

    fn size(width: u32, height: u32) -> PhysicalSize {
        PhysicalSize { width, height }
    }

    #[test]
    fn test_uniform_blocks_from_graph() {
        let mut graph = SceneGraph::new(size(800, 600));
        graph.apply(&SceneAnimation::at(4.0));

        let planet = planet_uniforms(&graph);
        assert_eq!(planet.time, 4.0);
        assert_eq!(planet.light_position, [10.0, 10.0, 10.0, 1.0]);
        assert_eq!(planet.model, graph.planet_model().to_cols_array_2d());

        let disk = disk_uniforms(&graph);
        assert_eq!(disk.time, 4.0);
        assert_ne!(disk.color, disk.secondary_color);

        let stars = points_uniforms(graph.stars_model(), STAR_OPACITY);
        assert_eq!(stars.tint[3], 0.5);
    }

    #[test]
    fn test_build_uploads_every_layer() {
        let Some((device, _queue)) = request_headless_device() else {
            return;
        };
        let scene = SceneBuilder::new(&device, TARGET_FORMAT).build(
            &small_config(),
            size(640, 480),
            size(640, 480),
        );

        let r = &scene.resources;
        assert_eq!(r.star_count(), 300);
        assert_eq!(r.particle_count(), 200);
        assert_eq!(r.planet_index_count(), (64 * 64 * 2 - 128) * 3);
        assert_eq!(r.disk_index_count(), 128 * 128 * 2 * 3);
        assert_eq!(r.depth().width(), 640);
        assert_eq!(scene.graph.camera.aspect_ratio, 640.0 / 480.0);

        scene.release();
    }

    #[test]
    fn test_resize_updates_camera_and_depth() {
        let Some((device, _queue)) = request_headless_device() else {
            return;
        };
        let mut scene = SceneBuilder::new(&device, TARGET_FORMAT).build(
            &small_config(),
            size(640, 480),
            size(640, 480),
        );

        scene.resize(&device, size(1000, 300), size(1000, 300));
        assert_eq!(scene.graph.camera.aspect_ratio, 1000.0 / 300.0);
        assert_eq!(scene.resources.depth().width(), 1000);
        assert_eq!(scene.resources.depth().height(), 300);

        // Repeating the same size is a no-op.
        scene.resize(&device, size(1000, 300), size(1000, 300));
        assert_eq!(scene.resources.depth().width(), 1000);

        scene.release();
    }

    #[test]
    fn test_prepare_applies_animation() {
        let Some((device, queue)) = request_headless_device() else {
            return;
        };
        let mut scene = SceneBuilder::new(&device, TARGET_FORMAT).build(
            &small_config(),
            size(640, 480),
            size(640, 480),
        );

        scene.prepare(&queue, &SceneAnimation::at(3.0));
        assert_eq!(scene.graph.time, 3.0);
        assert!((scene.graph.group.rotation.y - 0.15).abs() < 1e-6);

        scene.release();
    }

    #[test]
    fn test_capped_resize_keeps_viewport_aspect() {
        let Some((device, _queue)) = request_headless_device() else {
            return;
        };
        let mut wrapper = SurfaceWrapper::new(1280, 720, 3.0, 2.0);
        let mut scene = SceneBuilder::new(&device, TARGET_FORMAT).build(
            &small_config(),
            wrapper.physical_size(),
            wrapper.render_size(),
        );

        let event = wrapper.handle_resize(1001, 601).unwrap();
        assert_ne!(event.render, event.physical);
        scene.resize(&device, event.physical, event.render);

        assert_eq!(scene.graph.camera.aspect_ratio, 1001.0 / 601.0);
        assert_eq!(scene.resources.depth().width(), event.render.width);
        assert_eq!(scene.resources.depth().height(), event.render.height);

        scene.release();
    }

    #[test]
    fn test_empty_point_clouds_draw() {
        let Some((device, queue)) = request_headless_device() else {
            return;
        };
        let config = SceneConfig {
            star_count: 0,
            particle_count: 0,
            seed: Some(1),
            ..SceneConfig::default()
        };
        let mut scene =
            SceneBuilder::new(&device, TARGET_FORMAT).build(&config, size(64, 64), size(64, 64));
        assert_eq!(scene.resources.star_count(), 0);
        assert_eq!(scene.resources.particle_count(), 0);
        scene.prepare(&queue, &SceneAnimation::at(1.0));

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test-target"),
            size: wgpu::Extent3d {
                width: 64,
                height: 64,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("test-encoder"),
        });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("test-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: scene.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(DepthBuffer::CLEAR_VALUE),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            scene.draw(&mut pass);
        }
        queue.submit([encoder.finish()]);

        target.destroy();
        scene.release();
    }
}
