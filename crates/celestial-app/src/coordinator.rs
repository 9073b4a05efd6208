//! Holds the displayed record and the loading flag, and runs gateway calls
//! off the UI thread.
//!
//! Each submission spawns one worker thread that settles through a channel.
//! [`AppCoordinator::poll`] is called once per frame to apply the reply.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};

use celestial_cosmic::{CosmicReply, PlanetRecord, RecordSource};

/// Status shown right after launch.
pub const SCANNING_MESSAGE: &str = "Scanning the deep void for signals...";
/// Status shown once the boot delay has passed.
pub const SYNCED_MESSAGE: &str = "Deep space signal synchronized.";
/// How long the scanning status stays up.
pub const BOOT_DELAY: Duration = Duration::from_millis(1500);

/// Everything the panel renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiState {
    pub current_record: PlanetRecord,
    pub status_message: String,
    pub is_loading: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            current_record: PlanetRecord::initial(),
            status_message: SCANNING_MESSAGE.to_string(),
            is_loading: false,
        }
    }
}

/// What a call to [`AppCoordinator::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    Dispatched,
    /// Empty or whitespace-only text.
    IgnoredEmpty,
    /// A request is already in flight.
    IgnoredBusy,
    /// The worker thread could not be started.
    Failed,
}

/// What a call to [`AppCoordinator::poll`] observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Idle,
    Pending,
    /// A reply was applied.
    Applied,
    /// The worker went away without replying.
    Abandoned,
}

pub struct AppCoordinator<S: RecordSource> {
    source: Arc<S>,
    state: UiState,
    started: Instant,
    in_flight: Option<Receiver<CosmicReply>>,
    dispatched: u64,
}

impl<S: RecordSource> AppCoordinator<S> {
    pub fn new(source: S) -> Self {
        Self::with_start(source, Instant::now())
    }

    pub fn with_start(source: S, started: Instant) -> Self {
        Self {
            source: Arc::new(source),
            state: UiState::default(),
            started,
            in_flight: None,
            dispatched: 0,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    /// Number of gateway calls dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Swap the boot status for the synchronized one once the delay elapses.
    ///
    /// Only applies while the boot status is still showing.
    pub fn tick(&mut self, now: Instant) {
        if now.duration_since(self.started) >= BOOT_DELAY
            && self.state.status_message == SCANNING_MESSAGE
        {
            self.state.status_message = SYNCED_MESSAGE.to_string();
        }
    }

    /// Start a lookup for `text`.
    pub fn submit(&mut self, text: &str) -> Submission {
        let prompt = text.trim();
        if prompt.is_empty() {
            return Submission::IgnoredEmpty;
        }
        if self.state.is_loading {
            tracing::debug!("Lookup already in flight, ignoring submission");
            return Submission::IgnoredBusy;
        }

        let (tx, rx) = crossbeam_channel::bounded(1);
        let source = Arc::clone(&self.source);
        let prompt = prompt.to_string();
        let spawned = thread::Builder::new()
            .name("cosmic-lookup".to_string())
            .spawn(move || {
                let reply = source.fetch_record(&prompt);
                // The coordinator may be gone by now; a late reply is dropped.
                let _ = tx.send(reply);
            });

        match spawned {
            Ok(_) => {
                self.state.is_loading = true;
                self.in_flight = Some(rx);
                self.dispatched += 1;
                tracing::info!("Lookup dispatched");
                Submission::Dispatched
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn lookup worker");
                Submission::Failed
            }
        }
    }

    /// Apply a settled reply, if any. Loading is cleared on every settlement.
    pub fn poll(&mut self) -> Settlement {
        let Some(rx) = self.in_flight.as_ref() else {
            return Settlement::Idle;
        };
        let outcome = match rx.try_recv() {
            Ok(reply) => Some(reply),
            Err(TryRecvError::Empty) => return Settlement::Pending,
            Err(TryRecvError::Disconnected) => None,
        };
        self.settle(outcome)
    }

    /// Block until the in-flight request settles or `timeout` passes.
    pub fn wait_for_settlement(&mut self, timeout: Duration) -> Settlement {
        let Some(rx) = self.in_flight.as_ref() else {
            return Settlement::Idle;
        };
        let outcome = match rx.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => return Settlement::Pending,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => None,
        };
        self.settle(outcome)
    }

    fn settle(&mut self, outcome: Option<CosmicReply>) -> Settlement {
        self.in_flight = None;
        self.state.is_loading = false;
        match outcome {
            Some(reply) => {
                self.state.current_record = reply.record;
                self.state.status_message = reply.message;
                Settlement::Applied
            }
            None => {
                tracing::error!("Lookup worker ended without a reply");
                Settlement::Abandoned
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    const WAIT: Duration = Duration::from_secs(5);

    /// Source that replies with a fixed record and counts calls.
    struct FixedSource {
        calls: AtomicUsize,
        prompts: Mutex<Vec<String>>,
    }

    impl FixedSource {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    fn kepler() -> CosmicReply {
        CosmicReply {
            record: PlanetRecord {
                name: "Kepler-442b".to_string(),
                description: "d".to_string(),
                age: "a".to_string(),
                mass: "m".to_string(),
                temperature: "t".to_string(),
                atmosphere: vec!["N2".to_string()],
            },
            message: "Signal acquired.".to_string(),
        }
    }

    impl RecordSource for FixedSource {
        fn fetch_record(&self, prompt: &str) -> CosmicReply {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            kepler()
        }
    }

    /// Source whose worker panics instead of replying.
    struct PanickingSource;

    impl RecordSource for PanickingSource {
        fn fetch_record(&self, _prompt: &str) -> CosmicReply {
            panic!("lookup exploded")
        }
    }

    /// Source that blocks until released.
    struct GatedSource {
        gate: Receiver<()>,
    }

    impl RecordSource for GatedSource {
        fn fetch_record(&self, _prompt: &str) -> CosmicReply {
            let _ = self.gate.recv();
            CosmicReply::fallback()
        }
    }

    #[test]
    fn test_initial_state() {
        let c = AppCoordinator::new(FixedSource::new());
        assert_eq!(c.state().current_record, PlanetRecord::initial());
        assert_eq!(c.state().status_message, SCANNING_MESSAGE);
        assert!(!c.is_loading());
    }

    #[test]
    fn test_whitespace_submission_is_ignored() {
        let mut c = AppCoordinator::new(FixedSource::new());
        let before = c.state().clone();

        assert_eq!(c.submit(""), Submission::IgnoredEmpty);
        assert_eq!(c.submit("   \t\n"), Submission::IgnoredEmpty);

        assert_eq!(c.state(), &before);
        assert_eq!(c.dispatched(), 0);
        assert_eq!(c.poll(), Settlement::Idle);
        assert_eq!(c.source.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_submission_loads_then_settles_once() {
        let mut c = AppCoordinator::new(FixedSource::new());

        assert_eq!(c.submit("  Kepler-442b "), Submission::Dispatched);
        assert!(c.is_loading());

        assert_eq!(c.wait_for_settlement(WAIT), Settlement::Applied);
        assert!(!c.is_loading());
        assert_eq!(c.state().current_record.name, "Kepler-442b");
        assert_eq!(c.state().status_message, "Signal acquired.");

        assert_eq!(c.poll(), Settlement::Idle);
        assert_eq!(c.source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*c.source.prompts.lock().unwrap(), ["Kepler-442b"]);
    }

    #[test]
    fn test_submission_while_loading_is_ignored() {
        let (release, gate) = crossbeam_channel::bounded(1);
        let mut c = AppCoordinator::new(GatedSource { gate });

        assert_eq!(c.submit("first"), Submission::Dispatched);
        assert_eq!(c.submit("second"), Submission::IgnoredBusy);
        assert_eq!(c.poll(), Settlement::Pending);
        assert_eq!(c.dispatched(), 1);

        release.send(()).unwrap();
        assert_eq!(c.wait_for_settlement(WAIT), Settlement::Applied);
        assert_eq!(c.state().current_record, PlanetRecord::fallback());
    }

    #[test]
    fn test_worker_panic_still_clears_loading() {
        let mut c = AppCoordinator::new(PanickingSource);
        assert_eq!(c.submit("Kepler-442b"), Submission::Dispatched);

        assert_eq!(c.wait_for_settlement(WAIT), Settlement::Abandoned);
        assert!(!c.is_loading());
        assert_eq!(c.state().current_record, PlanetRecord::initial());
    }

    #[test]
    fn test_boot_status_switches_after_delay() {
        let start = Instant::now();
        let mut c = AppCoordinator::with_start(FixedSource::new(), start);

        c.tick(start + Duration::from_millis(1000));
        assert_eq!(c.state().status_message, SCANNING_MESSAGE);

        c.tick(start + BOOT_DELAY);
        assert_eq!(c.state().status_message, SYNCED_MESSAGE);
    }

    #[test]
    fn test_boot_status_does_not_overwrite_reply() {
        let start = Instant::now();
        let mut c = AppCoordinator::with_start(FixedSource::new(), start);
        c.submit("Kepler-442b");
        c.wait_for_settlement(WAIT);

        c.tick(start + Duration::from_secs(10));
        assert_eq!(c.state().status_message, "Signal acquired.");
    }
}
