//! Celestial application: coordinator, panel, loading overlay and the winit shell.

pub mod coordinator;
pub mod overlay;
pub mod panel;
pub mod window;

pub use coordinator::{AppCoordinator, Settlement, Submission, UiState};
pub use panel::{PanelProps, PanelView, PromptInput, PromptKey, render_panel};
pub use window::{AppState, run};
