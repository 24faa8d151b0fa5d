//! Slot engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use wf_core::{Grid, Symbol, SymbolSet, WfError, WfResult};

use crate::outcome::WinCatalog;
use crate::timing::{PresentationTiming, SpinTiming};

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub columns: usize,
    /// Number of visible rows per reel
    pub rows: usize,
}

impl GridSpec {
    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self { columns: 5, rows: 3 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.columns * self.rows
    }

    /// Check a grid against these dimensions
    pub fn check(&self, grid: &Grid) -> WfResult<()> {
        grid.ensure_dimensions(self.columns, self.rows)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Complete slot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Grid layout
    pub grid: GridSpec,
    /// Spin choreography timing
    pub timing: SpinTiming,
    /// Win presentation timing
    pub presentation: PresentationTiming,
    /// Symbols used for random fills
    pub symbols: SymbolSet,
    /// Predefined winning grids for guaranteed-win mode
    pub win_catalog: Vec<Grid>,
    /// Grid shown before the first spin
    pub start_grid: Grid,
    /// RNG seed (None = OS entropy)
    pub seed: Option<u64>,
}

impl SlotConfig {
    /// Fast configuration for tests and batch simulation
    pub fn turbo() -> Self {
        Self {
            timing: SpinTiming::turbo(),
            ..Self::default()
        }
    }

    /// Set RNG seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate internal consistency
    pub fn validate(&self) -> WfResult<()> {
        if self.grid.columns == 0 || self.grid.rows == 0 {
            return Err(WfError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid.columns, self.grid.rows
            )));
        }
        if !self.timing.is_valid() {
            return Err(WfError::InvalidConfig(
                "spin timing values must be finite and non-negative".into(),
            ));
        }
        if !(self.presentation.cell_reveal_delay_ms.is_finite()
            && self.presentation.cell_reveal_delay_ms >= 0.0)
        {
            return Err(WfError::InvalidConfig(
                "cell reveal delay must be finite and non-negative".into(),
            ));
        }
        self.grid.check(&self.start_grid)?;
        for (index, grid) in self.win_catalog.iter().enumerate() {
            self.grid.check(grid).map_err(|e| {
                WfError::InvalidConfig(format!("win catalog entry {}: {}", index, e))
            })?;
        }
        Ok(())
    }

    /// Catalog wrapper for the configured winning grids
    pub fn catalog(&self) -> WfResult<WinCatalog> {
        WinCatalog::new(self.win_catalog.clone())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Parse from JSON and validate
    pub fn from_json(json: &str) -> WfResult<Self> {
        let config: SlotConfig =
            serde_json::from_str(json).map_err(|e| WfError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from YAML and validate
    pub fn from_yaml(yaml: &str) -> WfResult<Self> {
        let config: SlotConfig =
            serde_yml::from_str(yaml).map_err(|e| WfError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn load(path: impl AsRef<Path>) -> WfResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&text),
            Some("yaml") | Some("yml") => Self::from_yaml(&text),
            other => Err(WfError::InvalidConfig(format!(
                "unsupported config extension: {:?}",
                other
            ))),
        }
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> WfResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WfError::Serialization(e.to_string()))
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            grid: GridSpec::default(),
            timing: SpinTiming::default(),
            presentation: PresentationTiming::default(),
            symbols: SymbolSet::full(),
            win_catalog: WinCatalog::standard().into_grids(),
            start_grid: default_start_grid(),
            seed: None,
        }
    }
}

/// Start-up grid of the standard 5×3 game
pub fn default_start_grid() -> Grid {
    use Symbol::*;
    Grid::from_static(&[
        &[High3, Low1, High2],
        &[Low2, High3, Low2],
        &[Low1, Low1, High3],
        &[Low3, High1, High1],
        &[High1, High1, Low4],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SlotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.grid.total_positions(), 15);
        assert_eq!(config.win_catalog.len(), 5);
        assert_eq!(config.symbols.len(), 7);
    }

    #[test]
    fn test_json_roundtrip_partial() {
        let config = SlotConfig::from_json(r#"{ "seed": 42, "timing": { "spin_duration_ms": 100.0 } }"#)
            .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.timing.spin_duration_ms, 100.0);
        assert_eq!(config.timing.column_start_stagger_ms, 500.0);

        let json = config.to_json().unwrap();
        assert_eq!(SlotConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_yaml_config() {
        let yaml = "grid:\n  columns: 3\n  rows: 1\nstart_grid: [[high1], [low1], [low2]]\nwin_catalog: []\nsymbols: [high1, low1]\n";
        let config = SlotConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.grid, GridSpec { columns: 3, rows: 1 });
        assert_eq!(config.symbols.len(), 2);
        assert!(config.catalog().is_err());
    }

    #[test]
    fn test_mismatched_catalog_rejected() {
        let yaml = "grid:\n  columns: 3\n  rows: 1\nstart_grid: [[high1], [low1], [low2]]\n";
        // default catalog is 5x3, grid is 3x1
        assert!(matches!(
            SlotConfig::from_yaml(yaml),
            Err(WfError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_timing_rejected() {
        let mut config = SlotConfig::default();
        config.timing.column_stop_stagger_ms = -5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot.json");
        std::fs::write(&path, r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(SlotConfig::load(&path).unwrap().seed, Some(7));

        let bad = dir.path().join("slot.toml");
        std::fs::write(&bad, "").unwrap();
        assert!(SlotConfig::load(&bad).is_err());
    }
}
