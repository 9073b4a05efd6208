//! Configuration structs with sensible defaults and read-only RON loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "celestial";
const CONFIG_FILE: &str = "config.ron";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Scene population settings.
    pub scene: SceneConfig,
    /// Generative model endpoint settings.
    pub gateway: GatewayConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title shown before the panel takes over the title bar.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Upper bound on device pixels per logical pixel for the render target.
    pub max_pixel_ratio: f64,
    /// Background clear color as 0xRRGGBB (sRGB).
    pub background: u32,
    /// Opacity of the overlay drawn while a request is in flight.
    pub overlay_opacity: f32,
}

/// Scene population: point counts, radii and the sampling seed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Number of background stars.
    pub star_count: u32,
    /// Radius of the star sphere.
    pub star_radius: f32,
    /// Number of ring particles.
    pub particle_count: u32,
    /// Inner radius of the particle ring.
    pub ring_inner_radius: f32,
    /// Radial spread of the particle ring beyond the inner radius.
    pub ring_spread: f32,
    /// Fixed sampling seed. `None` draws a fresh seed per mount.
    pub seed: Option<u64>,
}

/// Hosted text-generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the generative language API.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Directory for JSON log files in debug builds.
    pub log_dir: Option<PathBuf>,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Celestial".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            background: 0x010409,
            overlay_opacity: 0.6,
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            star_count: 7000,
            star_radius: 150.0,
            particle_count: 5000,
            ring_inner_radius: 4.5,
            ring_spread: 10.0,
            seed: None,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "API_KEY".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

// --- Load ---

/// Platform config directory for Celestial (`<config_dir>/celestial`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Load config from `config.ron` in the given directory.
    ///
    /// A missing file yields the defaults; the file is never created.
    pub fn load_or_default(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if !config_path.exists() {
            log::info!(
                "No config at {}, using defaults",
                config_path.display()
            );
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        log::info!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    /// Parse a config from a RON string.
    pub fn from_ron(contents: &str) -> Result<Self, ConfigError> {
        ron::from_str(contents).map_err(ConfigError::ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scene_matches_reference_population() {
        let scene = SceneConfig::default();
        assert_eq!(scene.star_count, 7000);
        assert_eq!(scene.particle_count, 5000);
        assert_eq!(scene.star_radius, 150.0);
        assert_eq!(scene.ring_inner_radius, 4.5);
        assert_eq!(scene.ring_spread, 10.0);
        assert!(scene.seed.is_none());
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("star_count: 7000"));
        assert!(ron_str.contains("gemini-3-flash-preview"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.scene.seed = Some(42);
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized = Config::from_ron(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config = Config::from_ron("(window: (width: 800))").unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.gateway, GatewayConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        assert!(Config::from_ron("(future_setting: true)").is_ok());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result = Config::from_ron("{{not valid}}");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_missing_file_yields_defaults_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(!dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "// tuned\n(scene: (star_count: 100, seed: Some(7)), gateway: (model: \"test-model\"))",
        )
        .unwrap();

        let config = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(config.scene.star_count, 100);
        assert_eq!(config.scene.seed, Some(7));
        assert_eq!(config.scene.particle_count, 5000);
        assert_eq!(config.gateway.model, "test-model");
    }
}
