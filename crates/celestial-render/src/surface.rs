//! Window surface size tracking with a capped pixel ratio.
//!
//! The window reports physical pixels and a scale factor. The scene renders at
//! `logical size × min(scale_factor, max_pixel_ratio)` so that very dense
//! displays do not multiply the fragment cost of the additive layers.

/// Minimum surface dimension (prevents zero-size panics).
pub const MIN_SURFACE_DIMENSION: u32 = 1;

/// Pixel dimensions of a surface or render target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

/// Event produced when the surface dimensions or scale factor change.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceResizeEvent {
    /// Window size in physical pixels.
    pub physical: PhysicalSize,
    /// Size the render target should be configured at.
    pub render: PhysicalSize,
    /// Pixel ratio actually used for rendering.
    pub pixel_ratio: f64,
}

/// Tracks window dimensions and derives the render target size.
///
/// Zero-size windows (minimized, or Wayland before the first configure) are
/// clamped to 1×1.
pub struct SurfaceWrapper {
    physical_width: u32,
    physical_height: u32,
    scale_factor: f64,
    max_pixel_ratio: f64,
}

impl SurfaceWrapper {
    /// Create a wrapper from the initial physical size, scale factor and pixel-ratio cap.
    ///
    /// A non-positive cap disables capping.
    pub fn new(
        physical_width: u32,
        physical_height: u32,
        scale_factor: f64,
        max_pixel_ratio: f64,
    ) -> Self {
        Self {
            physical_width: physical_width.max(MIN_SURFACE_DIMENSION),
            physical_height: physical_height.max(MIN_SURFACE_DIMENSION),
            scale_factor: sanitize_scale(scale_factor),
            max_pixel_ratio,
        }
    }

    /// Handle a window resize. Returns an event only if the physical size changed.
    pub fn handle_resize(
        &mut self,
        physical_width: u32,
        physical_height: u32,
    ) -> Option<SurfaceResizeEvent> {
        let width = physical_width.max(MIN_SURFACE_DIMENSION);
        let height = physical_height.max(MIN_SURFACE_DIMENSION);

        if width == self.physical_width && height == self.physical_height {
            return None;
        }

        self.physical_width = width;
        self.physical_height = height;
        Some(self.resize_event())
    }

    /// Handle a scale factor change (window moved between displays).
    ///
    /// Always returns an event since the render size depends on the scale
    /// factor even when the physical size is unchanged.
    pub fn handle_scale_factor_changed(
        &mut self,
        new_scale_factor: f64,
        new_physical_width: u32,
        new_physical_height: u32,
    ) -> SurfaceResizeEvent {
        self.scale_factor = sanitize_scale(new_scale_factor);
        self.physical_width = new_physical_width.max(MIN_SURFACE_DIMENSION);
        self.physical_height = new_physical_height.max(MIN_SURFACE_DIMENSION);
        self.resize_event()
    }

    /// Window size in physical pixels.
    pub fn physical_size(&self) -> PhysicalSize {
        PhysicalSize {
            width: self.physical_width,
            height: self.physical_height,
        }
    }

    /// Device pixels per logical pixel used for rendering.
    pub fn pixel_ratio(&self) -> f64 {
        if self.max_pixel_ratio > 0.0 {
            self.scale_factor.min(self.max_pixel_ratio)
        } else {
            self.scale_factor
        }
    }

    /// Render target size: logical size times the capped pixel ratio.
    pub fn render_size(&self) -> PhysicalSize {
        let ratio = self.pixel_ratio() / self.scale_factor;
        PhysicalSize {
            width: scale_dimension(self.physical_width, ratio),
            height: scale_dimension(self.physical_height, ratio),
        }
    }

    /// Current scale factor reported by the window.
    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn resize_event(&self) -> SurfaceResizeEvent {
        SurfaceResizeEvent {
            physical: self.physical_size(),
            render: self.render_size(),
            pixel_ratio: self.pixel_ratio(),
        }
    }
}

fn sanitize_scale(scale_factor: f64) -> f64 {
    if scale_factor.is_finite() && scale_factor > 0.0 {
        scale_factor
    } else {
        1.0
    }
}

fn scale_dimension(value: u32, ratio: f64) -> u32 {
    ((value as f64 * ratio).round() as u32).max(MIN_SURFACE_DIMENSION)
}
