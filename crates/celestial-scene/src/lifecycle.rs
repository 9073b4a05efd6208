//! Mount/teardown of a scene and its GPU resources.
//!
//! Teardown always runs in the same order: cancel the pending frame, detach
//! the render surface, then release the resource bundle. It is idempotent,
//! and dropping a mounted lifecycle still releases the bundle.

use std::time::Duration;

use crate::driver::{AnimationDriver, FrameHost, FrameRequest, SceneAnimation, SceneClock};

/// A bundle of GPU allocations released in one step.
///
/// `release` consumes the bundle, so nothing can be freed twice.
pub trait Release {
    fn release(self);
}

/// A mounted scene: the driver, the clock and the resource bundle.
pub struct SceneLifecycle<R: Release> {
    driver: AnimationDriver,
    clock: SceneClock,
    resources: Option<R>,
    loading: bool,
}

impl<R: Release> SceneLifecycle<R> {
    /// Mount `resources` and request the first frame.
    pub fn mount<H: FrameHost>(resources: R, host: &mut H) -> Self {
        let driver = AnimationDriver::start(host);
        tracing::info!("Scene mounted");
        Self {
            driver,
            clock: SceneClock::start(),
            resources: Some(resources),
            loading: false,
        }
    }

    /// Handle a delivered frame using the mount clock.
    pub fn frame<H, F>(&mut self, request: FrameRequest, host: &mut H, render: F) -> bool
    where
        H: FrameHost,
        F: FnOnce(&mut R, &SceneAnimation, &mut H),
    {
        let elapsed = self.clock.elapsed();
        self.frame_at(request, elapsed, host, render)
    }

    /// Handle a delivered frame at an explicit elapsed time.
    ///
    /// Renders nothing once the scene has been torn down.
    pub fn frame_at<H, F>(
        &mut self,
        request: FrameRequest,
        elapsed: Duration,
        host: &mut H,
        render: F,
    ) -> bool
    where
        H: FrameHost,
        F: FnOnce(&mut R, &SceneAnimation, &mut H),
    {
        let Some(resources) = self.resources.as_mut() else {
            return false;
        };
        self.driver
            .tick(request, elapsed, host, |animation, host| {
                render(resources, animation, host)
            })
    }

    /// Mutable access to the mounted resources, e.g. for resize.
    pub fn resources_mut(&mut self) -> Option<&mut R> {
        self.resources.as_mut()
    }

    pub fn is_mounted(&self) -> bool {
        self.resources.is_some()
    }

    pub fn driver(&self) -> &AnimationDriver {
        &self.driver
    }

    /// Observe the coordinator's loading flag.
    ///
    /// The scene keeps animating while a request is in flight; the flag is
    /// only recorded.
    pub fn observe_loading(&mut self, loading: bool) {
        if self.loading != loading {
            tracing::trace!(loading, "Scene observed loading change");
            self.loading = loading;
        }
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Cancel, detach, release. Returns `false` if already torn down.
    pub fn teardown<H: FrameHost>(&mut self, host: &mut H) -> bool {
        let Some(resources) = self.resources.take() else {
            return false;
        };
        self.driver.stop(host);
        host.detach_surface();
        resources.release();
        tracing::info!(frames = self.driver.frames(), "Scene torn down");
        true
    }
}

impl<R: Release> Drop for SceneLifecycle<R> {
    fn drop(&mut self) {
        if let Some(resources) = self.resources.take() {
            tracing::warn!("Scene dropped without teardown, releasing resources");
            resources.release();
        }
    }
}
