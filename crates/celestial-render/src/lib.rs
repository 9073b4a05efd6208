//! wgpu rendering foundation: device and surface context, surface sizing,
//! camera, buffers, reverse-Z depth and render pass helpers.

pub mod buffer;
pub mod camera;
pub mod depth;
pub mod gpu;
pub mod pass;
pub mod surface;

pub use buffer::{
    BufferAllocator, IndexData, MeshBuffer, PointBuffer, VertexPositionColor,
    VertexPositionNormalUv,
};
pub use camera::{Camera, CameraUniform};
pub use depth::DepthBuffer;
pub use gpu::{
    RenderContext, RenderContextError, SurfaceError, init_render_context_blocking,
    request_headless_device,
};
pub use pass::{FrameEncoder, RenderPassBuilder, color_from_hex, srgb_to_linear};
pub use surface::{PhysicalSize, SurfaceResizeEvent, SurfaceWrapper};
