//! Preset save/load functionality for simulation states.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sim::{CurveSet, InteractionMatrix, SimulationConfig, SpeciesTable};

/// A named bundle of simulation parameters: world/boundary settings, the
/// species table, the interaction matrix, and the color-curve set.
/// Serialized as TOML rather than JSON so presets stay hand-editable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub sim_config: SimulationConfig,
    pub species: SpeciesTable,
    pub interactions: InteractionMatrix,
    pub curves: CurveSet,
}

impl Preset {
    pub fn new(
        name: impl Into<String>,
        sim_config: SimulationConfig,
        species: SpeciesTable,
        interactions: InteractionMatrix,
        curves: CurveSet,
    ) -> Self {
        Self { name: name.into(), sim_config, species, interactions, curves }
    }

    /// Directory presets are stored in, creating it if necessary.
    pub fn presets_dir() -> Option<std::path::PathBuf> {
        dirs::data_dir().map(|d| d.join("boid-flock").join("presets"))
    }

    pub fn ensure_presets_dir() -> Result<std::path::PathBuf> {
        let dir = Self::presets_dir().context("no data directory available")?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize preset")?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).context("failed to parse preset")
    }

    /// Save under `<presets_dir>/<name>.toml`.
    pub fn save(&self) -> Result<()> {
        let dir = Self::ensure_presets_dir()?;
        self.save_to_file(dir.join(format!("{}.toml", self.name)))
    }

    /// List preset names available in the presets directory (without the
    /// `.toml` extension), sorted alphabetically.
    pub fn list_presets() -> Result<Vec<String>> {
        let dir = match Self::presets_dir() {
            Some(d) if d.exists() => d,
            _ => return Ok(Vec::new()),
        };

        let mut names: Vec<String> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "toml"))
            .filter_map(|entry| entry.path().file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_round_trips_through_toml() {
        let preset = Preset::new(
            "test",
            SimulationConfig::default(),
            SpeciesTable::new(vec![Default::default()]).unwrap(),
            InteractionMatrix::default(),
            CurveSet::default(),
        );
        let dir = std::env::temp_dir().join(format!("boid-flock-preset-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test.toml");

        preset.save_to_file(&path).unwrap();
        let loaded = Preset::load_from_file(&path).unwrap();

        assert_eq!(loaded.name, preset.name);
        assert_eq!(loaded.species.len(), preset.species.len());

        std::fs::remove_dir_all(&dir).ok();
    }
}
