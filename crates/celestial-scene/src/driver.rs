//! Per-frame animation driver.
//!
//! The driver is an explicit state machine over frame requests issued by a
//! [`FrameHost`]. A tick only does work when it answers the request the
//! driver is waiting on; stale ticks and ticks after [`AnimationDriver::stop`]
//! are ignored.

use std::time::{Duration, Instant};

/// Planet spin about its Y axis, radians per second.
pub const PLANET_SPIN_RATE: f32 = 0.03;
/// Disk spin about its local Z axis, radians per second.
pub const DISK_SPIN_RATE: f32 = 0.08;
/// Particle ring spin about its local Z axis, radians per second.
pub const PARTICLE_SPIN_RATE: f32 = 0.04;
/// Orbit of the whole group about Y, radians per second.
pub const GROUP_ORBIT_RATE: f32 = 0.05;

/// Handle for one scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// What the scene needs from the window system.
pub trait FrameHost {
    /// Schedule one frame callback and return its handle.
    fn request_frame(&mut self) -> FrameRequest;

    /// Revoke a scheduled frame. Unknown or already-delivered requests are ignored.
    fn cancel_frame(&mut self, request: FrameRequest);

    /// Detach the render surface from the window.
    fn detach_surface(&mut self);
}

/// Animation values for one frame, derived only from elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneAnimation {
    pub time: f32,
    pub planet_spin: f32,
    pub disk_spin: f32,
    pub particle_spin: f32,
    pub group_orbit: f32,
}

impl SceneAnimation {
    /// Animation state `elapsed` seconds after mount.
    pub fn at(elapsed: f32) -> Self {
        Self {
            time: elapsed,
            planet_spin: elapsed * PLANET_SPIN_RATE,
            disk_spin: elapsed * DISK_SPIN_RATE,
            particle_spin: elapsed * PARTICLE_SPIN_RATE,
            group_orbit: elapsed * GROUP_ORBIT_RATE,
        }
    }
}

/// Monotonic clock started at mount.
#[derive(Debug, Clone, Copy)]
pub struct SceneClock {
    started: Instant,
}

impl SceneClock {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Driver state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Waiting for the given frame.
    Running(FrameRequest),
    /// No frame pending; ticks are ignored.
    Stopped,
}

/// Advances the scene once per delivered frame and reschedules itself.
#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
    frames: u64,
}

impl AnimationDriver {
    /// Start running by requesting the first frame.
    pub fn start<H: FrameHost>(host: &mut H) -> Self {
        let request = host.request_frame();
        tracing::debug!(?request, "Animation driver started");
        Self {
            state: DriverState::Running(request),
            frames: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running(_))
    }

    /// Number of frames rendered since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Handle a delivered frame.
    ///
    /// If `request` is the pending one: compute the animation at `elapsed`,
    /// call `render` exactly once, then request the next frame. Returns
    /// whether a frame was rendered.
    pub fn tick<H, F>(
        &mut self,
        request: FrameRequest,
        elapsed: Duration,
        host: &mut H,
        render: F,
    ) -> bool
    where
        H: FrameHost,
        F: FnOnce(&SceneAnimation, &mut H),
    {
        match self.state {
            DriverState::Running(pending) if pending == request => {
                let animation = SceneAnimation::at(elapsed.as_secs_f32());
                render(&animation, host);
                self.frames += 1;
                self.state = DriverState::Running(host.request_frame());
                true
            }
            DriverState::Running(pending) => {
                tracing::trace!(?request, ?pending, "Ignoring stale frame");
                false
            }
            DriverState::Stopped => false,
        }
    }

    /// Cancel the pending frame and stop. Returns `false` if already stopped.
    pub fn stop<H: FrameHost>(&mut self, host: &mut H) -> bool {
        match std::mem::replace(&mut self.state, DriverState::Stopped) {
            DriverState::Running(pending) => {
                host.cancel_frame(pending);
                tracing::debug!(frames = self.frames, "Animation driver stopped");
                true
            }
            DriverState::Stopped => false,
        }
    }
}
