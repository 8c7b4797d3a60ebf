use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::autopilot::{default_sequence, AutopilotStep};
use crate::error::RunnerError;

/// Default location of the runner config file.
pub const DEFAULT_CONFIG_PATH: &str = "assets/canvas_runner.ron";

/// Environment variable overriding [`DEFAULT_CONFIG_PATH`].
pub const CONFIG_ENV_VAR: &str = "CANVAS_RUNNER_CONFIG";

/// Optional parts of the demo.
///
/// The plain canvas demo, the autopilot demo and the test build differ only
/// in these switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    /// Scripted autopilot and its toggle.
    pub autopilot: bool,
    /// On-screen HUD with autopilot status and held keys.
    pub hud: bool,
    /// Process-wide state snapshot handle for automated tests.
    pub debug_handle: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self::full()
    }
}

impl Features {
    /// Movement only, no HUD.
    pub const fn basic() -> Self {
        Self {
            autopilot: false,
            hud: false,
            debug_handle: false,
        }
    }

    /// Autopilot plus HUD.
    pub const fn full() -> Self {
        Self {
            autopilot: true,
            hud: true,
            debug_handle: false,
        }
    }

    /// Everything, including the debug handle.
    pub const fn testing() -> Self {
        Self {
            autopilot: true,
            hud: true,
            debug_handle: true,
        }
    }
}

/// Sprite dimensions and movement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteConfig {
    /// Edge length in logical pixels.
    pub size: f32,
    /// Speed in logical pixels per second.
    pub speed: f32,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            size: 48.0,
            speed: 240.0,
        }
    }
}

/// RGBA color, 8 bits per channel.
pub type Rgba8 = [u8; 4];

/// Colors and grid layout used by the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    pub background: Rgba8,
    pub grid_line: Rgba8,
    /// Background tile edge in logical pixels.
    pub grid_size: f32,
    pub sprite_body: Rgba8,
    pub sprite_outline: Rgba8,
    pub sprite_eye: Rgba8,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: [15, 23, 42, 255],
            grid_line: [30, 41, 59, 255],
            grid_size: 40.0,
            sprite_body: [56, 189, 248, 255],
            sprite_outline: [14, 116, 144, 255],
            sprite_eye: [15, 23, 42, 255],
        }
    }
}

/// Top-level runner configuration, loaded from RON.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Window title.
    pub title: String,
    /// CSS selector of the canvas element on wasm.
    pub canvas_selector: String,
    pub sprite: SpriteConfig,
    pub autopilot: Vec<AutopilotStep>,
    pub style: RenderStyle,
    pub features: Features,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            title: "Canvas Runner".to_string(),
            canvas_selector: "#game-canvas".to_string(),
            sprite: SpriteConfig::default(),
            autopilot: default_sequence(),
            style: RenderStyle::default(),
            features: Features::default(),
        }
    }
}

impl RunnerConfig {
    /// Reject values the driver cannot run with.
    pub fn validate(&self) -> Result<(), RunnerError> {
        if !(self.sprite.size.is_finite() && self.sprite.size > 0.0) {
            return Err(RunnerError::InvalidConfig(format!(
                "sprite size must be positive, got {}",
                self.sprite.size
            )));
        }
        if !(self.sprite.speed.is_finite() && self.sprite.speed >= 0.0) {
            return Err(RunnerError::InvalidConfig(format!(
                "sprite speed must be non-negative, got {}",
                self.sprite.speed
            )));
        }
        if !(self.style.grid_size.is_finite() && self.style.grid_size > 0.0) {
            return Err(RunnerError::InvalidConfig(format!(
                "grid size must be positive, got {}",
                self.style.grid_size
            )));
        }
        for (i, step) in self.autopilot.iter().enumerate() {
            if !(step.duration.is_finite() && step.duration >= 0.0) {
                return Err(RunnerError::InvalidConfig(format!(
                    "autopilot step {} has invalid duration {}",
                    i, step.duration
                )));
            }
        }
        if self.features.autopilot && self.autopilot.is_empty() {
            warn!("autopilot feature enabled with an empty sequence; the toggle will do nothing");
        }
        Ok(())
    }
}

/// Config path from the environment, or the default.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<RunnerConfig, RunnerError> {
    let contents = fs::read_to_string(path).map_err(|source| RunnerError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })?;
    let config: RunnerConfig = ron::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Load a config file, falling back to defaults when it does not exist.
pub fn load_config_or_default(path: &Path) -> Result<RunnerConfig, RunnerError> {
    match load_config(path) {
        Err(RunnerError::ConfigIo { source, .. })
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            warn!("Config {} not found, using defaults", path.display());
            Ok(RunnerConfig::default())
        }
        other => other,
    }
}

/// Write a config file in pretty RON.
pub fn save_config(path: &Path, config: &RunnerConfig) -> Result<(), RunnerError> {
    let pretty_config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .separate_tuple_members(true);

    let ron_string = ron::ser::to_string_pretty(config, pretty_config)?;
    fs::write(path, ron_string).map_err(|source| RunnerError::ConfigIo {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::DirectionKey;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("runner.ron");

        let mut config = RunnerConfig::default();
        config.features = Features::testing();
        config.sprite.speed = 90.0;
        save_config(&path, &config).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.ron");
        fs::write(
            &path,
            "(features: (autopilot: false, hud: false, debug_handle: false), autopilot: [(keys: [ArrowUp], duration: 0.5)])",
        )
        .unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.features, Features::basic());
        assert_eq!(loaded.autopilot, vec![AutopilotStep::new(&[DirectionKey::ArrowUp], 0.5)]);
        assert_eq!(loaded.sprite, SpriteConfig::default());
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config_or_default(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(loaded, RunnerConfig::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.ron");
        fs::write(&path, "(sprite: (size: ").unwrap();

        assert!(matches!(
            load_config_or_default(&path),
            Err(RunnerError::ConfigParse(_))
        ));
    }

    #[test]
    fn shipped_configs_parse() {
        let full: RunnerConfig = ron::from_str(include_str!("../../../assets/canvas_runner.ron")).unwrap();
        assert_eq!(full, RunnerConfig::default());

        let basic: RunnerConfig = ron::from_str(include_str!("../../../assets/basic.ron")).unwrap();
        assert_eq!(basic.features, Features::basic());
        assert!(basic.validate().is_ok());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = RunnerConfig::default();
        config.sprite.size = 0.0;
        assert!(config.validate().is_err());

        let mut config = RunnerConfig::default();
        config.autopilot[1].duration = -1.0;
        assert!(config.validate().is_err());

        let mut config = RunnerConfig::default();
        config.style.grid_size = f32::INFINITY;
        assert!(config.validate().is_err());

        assert!(RunnerConfig::default().validate().is_ok());
    }
}
