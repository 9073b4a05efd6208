//! Stats/prompt panel: a pure view of [`UiState`] plus the prompt editor.

use std::fmt;

use celestial_cosmic::PlanetRecord;

use crate::coordinator::UiState;

pub const PROMPT_PLACEHOLDER: &str = "Search other celestial bodies...";
pub const LOADING_TITLE: &str = "RECALIBRATING LENS...";

pub const STATUS_LINES: [&str; 3] = [
    "SYSTEM STATUS: OPERATIONAL",
    "SECTOR: 0xFF-7A-42",
    "COORDS: -24.8, 114.2, 0.05",
];
pub const FOOTER_LINES: [&str; 2] = ["Visual Algorithm", "Deep Space Sync: Gemini-3 Flash Preview"];

/// Inputs to [`render_panel`].
#[derive(Debug, Clone, Copy)]
pub struct PanelProps<'a> {
    pub record: &'a PlanetRecord,
    pub status_message: &'a str,
    pub is_loading: bool,
    pub prompt_text: &'a str,
}

impl<'a> PanelProps<'a> {
    pub fn new(state: &'a UiState, prompt_text: &'a str) -> Self {
        Self {
            record: &state.current_record,
            status_message: &state.status_message,
            is_loading: state.is_loading,
            prompt_text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptField {
    pub text: String,
    pub placeholder: &'static str,
    pub disabled: bool,
}

/// Everything the panel shows, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelView {
    pub headline: String,
    pub quote: String,
    pub cards: [StatCard; 4],
    pub description: String,
    pub prompt: PromptField,
    pub status_lines: [&'static str; 3],
    pub footer_lines: [&'static str; 2],
    pub loading_overlay: Option<&'static str>,
}

pub fn render_panel(props: PanelProps<'_>) -> PanelView {
    let record = props.record;
    PanelView {
        headline: record.name.to_uppercase(),
        quote: format!("\"{}\"", props.status_message),
        cards: [
            StatCard {
                label: "Mass",
                value: record.mass.clone(),
            },
            StatCard {
                label: "Age",
                value: record.age.clone(),
            },
            StatCard {
                label: "Temp",
                value: record.temperature.clone(),
            },
            StatCard {
                label: "Atmosphere",
                value: record.atmosphere.join(", "),
            },
        ],
        description: record.description.clone(),
        prompt: PromptField {
            text: props.prompt_text.to_string(),
            placeholder: PROMPT_PLACEHOLDER,
            disabled: props.is_loading,
        },
        status_lines: STATUS_LINES,
        footer_lines: FOOTER_LINES,
        loading_overlay: props.is_loading.then_some(LOADING_TITLE),
    }
}

impl PanelView {
    /// One-line summary for the window title.
    pub fn title_line(&self) -> String {
        if let Some(overlay) = self.loading_overlay {
            return format!("{} | {}", self.headline, overlay);
        }
        let prompt = if self.prompt.text.is_empty() {
            self.prompt.placeholder
        } else {
            self.prompt.text.as_str()
        };
        format!("{} | {} | > {}", self.headline, self.quote, prompt)
    }
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.status_lines {
            writeln!(f, "{line}")?;
        }
        writeln!(f, "{}", self.headline)?;
        writeln!(f, "{}", self.quote)?;
        for card in &self.cards {
            writeln!(f, "  {}: {}", card.label, card.value)?;
        }
        writeln!(f, "{}", self.description)?;
        write!(f, "{}", self.footer_lines.join(" | "))
    }
}

/// Keys the prompt editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKey {
    Text(String),
    Backspace,
    Enter,
}

/// Text being typed into the prompt field.
#[derive(Debug, Clone, Default)]
pub struct PromptInput {
    text: String,
}

impl PromptInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Apply one key. Returns the raw text on Enter when it has content.
    ///
    /// Input is dropped while `disabled`. The text stays in the field after
    /// submit so a failed lookup can be retried.
    pub fn handle_key(&mut self, key: PromptKey, disabled: bool) -> Option<String> {
        if disabled {
            return None;
        }
        match key {
            PromptKey::Text(s) => {
                self.text.extend(s.chars().filter(|c| !c.is_control()));
                None
            }
            PromptKey::Backspace => {
                self.text.pop();
                None
            }
            PromptKey::Enter => {
                (!self.text.trim().is_empty()).then(|| self.text.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(loading: bool, prompt: &str) -> PanelView {
        let state = UiState {
            is_loading: loading,
            ..UiState::default()
        };
        render_panel(PanelProps::new(&state, prompt))
    }

    #[test]
    fn test_panel_formats_record() {
        let v = view(false, "");
        assert_eq!(v.headline, "CERULEAN-9");
        assert_eq!(v.quote, "\"Scanning the deep void for signals...\"");
        assert_eq!(v.cards[0], StatCard { label: "Mass", value: "124 Earth Masses".into() });
        assert_eq!(v.cards[1].value, "4.5 Billion Years");
        assert_eq!(v.cards[2].label, "Temp");
        assert_eq!(v.cards[3].value, "Hydrogen, He, CH4");
        assert_eq!(v.prompt.placeholder, PROMPT_PLACEHOLDER);
        assert!(!v.prompt.disabled);
        assert_eq!(v.loading_overlay, None);
    }

    #[test]
    fn test_loading_disables_prompt_and_shows_overlay() {
        let v = view(true, "Kepler");
        assert!(v.prompt.disabled);
        assert_eq!(v.loading_overlay, Some(LOADING_TITLE));
        assert_eq!(v.title_line(), "CERULEAN-9 | RECALIBRATING LENS...");
    }

    #[test]
    fn test_title_line_shows_prompt_or_placeholder() {
        assert!(view(false, "").title_line().ends_with("> Search other celestial bodies..."));
        assert!(view(false, "Kep").title_line().ends_with("> Kep"));
    }

    #[test]
    fn test_display_contains_static_lines() {
        let text = view(false, "").to_string();
        assert!(text.contains("SYSTEM STATUS: OPERATIONAL"));
        assert!(text.contains("SECTOR: 0xFF-7A-42"));
        assert!(text.contains("Deep Space Sync: Gemini-3 Flash Preview"));
    }

    #[test]
    fn test_prompt_enter_forwards_raw_text() {
        let mut input = PromptInput::default();
        input.handle_key(PromptKey::Text(" Kepler-442bx".into()), false);
        input.handle_key(PromptKey::Backspace, false);
        assert_eq!(input.text(), " Kepler-442b");

        assert_eq!(
            input.handle_key(PromptKey::Enter, false),
            Some(" Kepler-442b".to_string())
        );
        assert_eq!(input.text(), " Kepler-442b");
    }

    #[test]
    fn test_prompt_text_survives_submit_for_retry() {
        let mut input = PromptInput::default();
        input.handle_key(PromptKey::Text("Kepler-442b".into()), false);
        assert!(input.handle_key(PromptKey::Enter, false).is_some());

        // Loading: keys are dropped and the field still shows the query.
        assert_eq!(input.handle_key(PromptKey::Backspace, true), None);
        let state = UiState {
            is_loading: true,
            ..UiState::default()
        };
        let v = render_panel(PanelProps::new(&state, input.text()));
        assert_eq!(v.prompt.text, "Kepler-442b");

        // Settled: Enter resubmits the same text.
        assert_eq!(
            input.handle_key(PromptKey::Enter, false),
            Some("Kepler-442b".to_string())
        );
    }

    #[test]
    fn test_prompt_enter_ignores_whitespace() {
        let mut input = PromptInput::default();
        input.handle_key(PromptKey::Text("   ".into()), false);
        assert_eq!(input.handle_key(PromptKey::Enter, false), None);
        assert_eq!(input.text(), "   ");
    }

    #[test]
    fn test_prompt_disabled_drops_input() {
        let mut input = PromptInput::default();
        input.handle_key(PromptKey::Text("abc".into()), false);
        assert_eq!(input.handle_key(PromptKey::Text("d".into()), true), None);
        assert_eq!(input.handle_key(PromptKey::Enter, true), None);
        assert_eq!(input.text(), "abc");
    }

    #[test]
    fn test_prompt_filters_control_characters() {
        let mut input = PromptInput::default();
        input.handle_key(PromptKey::Text("a\rb\u{8}".into()), false);
        assert_eq!(input.text(), "ab");
    }
}
