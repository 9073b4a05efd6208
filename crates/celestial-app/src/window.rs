//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]. The redraw request
//! is the frame-scheduling primitive: the animation driver asks for a frame,
//! the window requests a redraw, and `RedrawRequested` delivers it.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use celestial_config::Config;
use celestial_cosmic::RecordSource;
use celestial_render::{
    DepthBuffer, FrameEncoder, RenderContext, RenderPassBuilder, SurfaceError,
    SurfaceResizeEvent, SurfaceWrapper, color_from_hex, init_render_context_blocking,
};
use celestial_scene::{
    FrameHost, FrameRequest, Scene, SceneAnimation, SceneBuilder, SceneLifecycle,
};

use crate::coordinator::{AppCoordinator, Settlement};
use crate::overlay::LoadingOverlay;
use crate::panel::{PanelProps, PromptInput, PromptKey, render_panel};

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ))
}

/// Hands out frame requests and remembers the one outstanding.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<FrameRequest>,
}

impl FrameScheduler {
    pub fn request(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        request
    }

    /// Forget `request` if it is the outstanding one.
    pub fn cancel(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }

    /// Deliver the outstanding request, if any.
    pub fn take_pending(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

/// The window side of the scene: frame scheduling plus the GPU context.
pub struct WindowHost {
    window: Arc<Window>,
    gpu: RenderContext,
    scheduler: FrameScheduler,
}

impl FrameHost for WindowHost {
    fn request_frame(&mut self) -> FrameRequest {
        let request = self.scheduler.request();
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.scheduler.cancel(request);
    }

    fn detach_surface(&mut self) {
        self.gpu.detach_surface();
    }
}

/// Everything that exists only while the window is up.
struct Mounted {
    host: WindowHost,
    lifecycle: SceneLifecycle<Scene>,
    overlay: Option<LoadingOverlay>,
}

/// Map a key press onto the prompt editor.
pub fn prompt_key(logical_key: &Key, text: Option<&str>) -> Option<PromptKey> {
    match logical_key {
        Key::Named(NamedKey::Enter) => Some(PromptKey::Enter),
        Key::Named(NamedKey::Backspace) => Some(PromptKey::Backspace),
        _ => text
            .filter(|t| !t.is_empty())
            .map(|t| PromptKey::Text(t.to_string())),
    }
}

/// Application state: config, coordinator, prompt and the mounted scene.
pub struct AppState<S: RecordSource> {
    config: Config,
    surface_wrapper: SurfaceWrapper,
    coordinator: AppCoordinator<S>,
    prompt: PromptInput,
    mounted: Option<Mounted>,
    title: String,
}

impl<S: RecordSource> AppState<S> {
    pub fn new(config: Config, source: S) -> Self {
        let surface_wrapper = SurfaceWrapper::new(
            config.window.width,
            config.window.height,
            1.0,
            config.render.max_pixel_ratio,
        );
        Self {
            title: config.window.title.clone(),
            config,
            surface_wrapper,
            coordinator: AppCoordinator::new(source),
            prompt: PromptInput::default(),
            mounted: None,
        }
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) {
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let inner = window.inner_size();
        self.surface_wrapper = SurfaceWrapper::new(
            inner.width,
            inner.height,
            window.scale_factor(),
            self.config.render.max_pixel_ratio,
        );
        let render = self.surface_wrapper.render_size();
        info!(
            "Surface initialized: {}x{} window, {}x{} render (pixel ratio {:.2})",
            inner.width,
            inner.height,
            render.width,
            render.height,
            self.surface_wrapper.pixel_ratio()
        );

        let gpu = match init_render_context_blocking(
            window.clone(),
            (render.width, render.height),
            self.config.window.vsync,
        ) {
            Ok(gpu) => gpu,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                event_loop.exit();
                return;
            }
        };

        let scene = SceneBuilder::new(&gpu.device, gpu.surface_format).build(
            &self.config.scene,
            self.surface_wrapper.physical_size(),
            render,
        );
        let overlay = LoadingOverlay::new(
            &gpu.device,
            gpu.surface_format,
            self.config.render.overlay_opacity,
        );

        let mut host = WindowHost {
            window,
            gpu,
            scheduler: FrameScheduler::default(),
        };
        let lifecycle = SceneLifecycle::mount(scene, &mut host);
        self.mounted = Some(Mounted {
            host,
            lifecycle,
            overlay: Some(overlay),
        });
        self.refresh_title();
    }

    fn teardown(&mut self) {
        if let Some(mut mounted) = self.mounted.take() {
            mounted.lifecycle.teardown(&mut mounted.host);
            if let Some(overlay) = mounted.overlay.take() {
                overlay.destroy();
            }
        }
    }

    fn apply_resize(&mut self, resize: SurfaceResizeEvent) {
        let render = resize.render;
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.host.gpu.resize(render.width, render.height);
            if let Some(scene) = mounted.lifecycle.resources_mut() {
                scene.resize(&mounted.host.gpu.device, resize.physical, render);
            }
        }
        info!(
            "Resized to {}x{} (render {}x{}, pixel ratio {:.2})",
            resize.physical.width,
            resize.physical.height,
            render.width,
            render.height,
            resize.pixel_ratio
        );
    }

    fn handle_key(&mut self, key: PromptKey) {
        let disabled = self.coordinator.is_loading();
        if let Some(text) = self.prompt.handle_key(key, disabled) {
            self.coordinator.submit(&text);
        }
        self.refresh_title();
    }

    /// Mirror the panel headline into the window title when it changes.
    fn refresh_title(&mut self) {
        let view = render_panel(PanelProps::new(self.coordinator.state(), self.prompt.text()));
        let title = format!("{} | {}", self.config.window.title, view.title_line());
        if title != self.title {
            if let Some(mounted) = &self.mounted {
                mounted.host.window.set_title(&title);
            }
            self.title = title;
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.coordinator.poll() == Settlement::Applied {
            let view = render_panel(PanelProps::new(self.coordinator.state(), self.prompt.text()));
            info!("Panel updated\n{view}");
        }
        self.coordinator.tick(Instant::now());
        self.refresh_title();

        let loading = self.coordinator.is_loading();
        let clear = color_from_hex(self.config.render.background);
        let Some(mounted) = self.mounted.as_mut() else {
            return;
        };
        mounted.lifecycle.observe_loading(loading);

        let Some(request) = mounted.host.scheduler.take_pending() else {
            return;
        };
        let Mounted {
            host,
            lifecycle,
            overlay,
        } = mounted;
        let overlay = if loading { overlay.as_ref() } else { None };

        let mut outcome = Ok(());
        lifecycle.frame(request, host, |scene, animation, host| {
            outcome = render_frame(scene, animation, &host.gpu, overlay, clear);
        });

        match outcome {
            Ok(()) => {}
            Err(SurfaceError::Lost) => {
                let size = self.surface_wrapper.render_size();
                if let Some(mounted) = self.mounted.as_mut() {
                    mounted.host.gpu.resize(size.width, size.height);
                }
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                self.teardown();
                event_loop.exit();
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
            Err(SurfaceError::Detached) => {}
        }
    }
}

/// Upload the frame's uniforms and record one pass: scene, then overlay.
fn render_frame(
    scene: &mut Scene,
    animation: &SceneAnimation,
    gpu: &RenderContext,
    overlay: Option<&LoadingOverlay>,
    clear: wgpu::Color,
) -> Result<(), SurfaceError> {
    scene.prepare(&gpu.queue, animation);
    let texture = gpu.get_current_texture()?;
    let mut frame = FrameEncoder::new(&gpu.device, &gpu.queue, texture);
    let builder = RenderPassBuilder::new()
        .label("scene-pass")
        .clear_color(clear)
        .depth(scene.depth_view().clone(), DepthBuffer::CLEAR_VALUE);
    {
        let mut pass = frame.begin_render_pass(&builder);
        scene.draw(&mut pass);
        if let Some(overlay) = overlay {
            overlay.draw(&mut pass);
        }
    }
    frame.submit();
    Ok(())
}

impl<S: RecordSource> ApplicationHandler for AppState<S> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.mounted.is_none() {
            self.mount(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                self.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(resize) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.apply_resize(resize);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let Some(inner) = self.mounted.as_ref().map(|m| m.host.window.inner_size()) else {
                    return;
                };
                let resize = self.surface_wrapper.handle_scale_factor_changed(
                    scale_factor,
                    inner.width,
                    inner.height,
                );
                self.apply_resize(resize);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let Some(key) = prompt_key(&event.logical_key, event.text.as_deref()) {
                    self.handle_key(key);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Create the event loop and run until the window closes.
pub fn run<S: RecordSource>(config: Config, source: S) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, source);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_tracks_one_pending_request() {
        let mut scheduler = FrameScheduler::default();
        let first = scheduler.request();
        let second = scheduler.request();
        assert_ne!(first, second);

        // A stale cancel leaves the newer request alone.
        scheduler.cancel(first);
        assert_eq!(scheduler.take_pending(), Some(second));
        assert_eq!(scheduler.take_pending(), None);
    }

    #[test]
    fn test_scheduler_cancel_clears_pending() {
        let mut scheduler = FrameScheduler::default();
        let request = scheduler.request();
        scheduler.cancel(request);
        assert_eq!(scheduler.take_pending(), None);
    }

    #[test]
    fn test_prompt_key_mapping() {
        assert_eq!(
            prompt_key(&Key::Named(NamedKey::Enter), Some("\r")),
            Some(PromptKey::Enter)
        );
        assert_eq!(
            prompt_key(&Key::Named(NamedKey::Backspace), None),
            Some(PromptKey::Backspace)
        );
        assert_eq!(
            prompt_key(&Key::Character("k".into()), Some("k")),
            Some(PromptKey::Text("k".to_string()))
        );
        assert_eq!(
            prompt_key(&Key::Named(NamedKey::Space), Some(" ")),
            Some(PromptKey::Text(" ".to_string()))
        );
        assert_eq!(prompt_key(&Key::Named(NamedKey::Shift), None), None);
    }

    #[test]
    fn test_window_attributes_from_config() {
        let config = Config::default();
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Celestial");
    }
}
