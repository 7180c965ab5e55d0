//! Host-level application configuration, persisted independently of the
//! simulation parameters themselves (see [`crate::app::Preset`] for those).

use serde::{Deserialize, Serialize};

fn default_title() -> String {
    "Boid Flock".to_string()
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    720
}

fn default_target_fps() -> u32 {
    60
}

fn default_vsync() -> bool {
    true
}

fn default_max_boids() -> u32 {
    2_000
}

fn default_true() -> bool {
    true
}

/// Host window/process settings, independent of the flocking parameters
/// themselves. Persisted as JSON at `<config_dir>/boid-flock/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    #[serde(default = "default_target_fps")]
    pub target_fps: u32,
    #[serde(default = "default_vsync")]
    pub vsync: bool,
    /// Population cap applied when no `--max-boids` CLI override is given.
    #[serde(default = "default_max_boids")]
    pub max_boids: u32,
    /// Sidebar-section open/closed state. There is no GUI layer in this
    /// crate, but the field is round-tripped so a future UI surface can
    /// read a returning user's layout without a config migration.
    #[serde(default = "default_true")]
    pub ui_species_panel_open: bool,
    #[serde(default = "default_true")]
    pub ui_interactions_panel_open: bool,
    #[serde(default)]
    pub ui_curves_panel_open: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            window_width: default_window_width(),
            window_height: default_window_height(),
            target_fps: default_target_fps(),
            vsync: default_vsync(),
            max_boids: default_max_boids(),
            ui_species_panel_open: true,
            ui_interactions_panel_open: true,
            ui_curves_panel_open: false,
        }
    }
}

impl AppConfig {
    const APP_NAME: &'static str = "boid-flock";

    fn config_dir() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|d| d.join(Self::APP_NAME))
    }

    fn config_path() -> Option<std::path::PathBuf> {
        Self::config_dir().map(|d| d.join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults (and logging a
    /// warning) on any read or parse failure.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            log::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to parse config at {:?}: {e}, using defaults", path);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Persist configuration to disk, creating the config directory if
    /// necessary.
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = Self::config_dir().ok_or_else(|| anyhow::anyhow!("no config directory"))?;
        std::fs::create_dir_all(&dir)?;
        let path = dir.join("config.json");
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.window_width, config.window_width);
        assert_eq!(parsed.max_boids, config.max_boids);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.title, default_title());
        assert_eq!(parsed.max_boids, default_max_boids());
    }
}
