//! Outcome generation: random fills and the guaranteed-win catalog

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use wf_core::{Grid, Symbol, SymbolSet, WfError, WfResult};

use crate::config::{GridSpec, SlotConfig};

/// Which source a spin outcome is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeMode {
    /// Independent uniform fill of every cell
    #[default]
    Random,
    /// Pick from the predefined winning grids (cheat mode)
    GuaranteedWin,
}

impl OutcomeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Random => Self::GuaranteedWin,
            Self::GuaranteedWin => Self::Random,
        }
    }
}

/// Fixed, ordered list of winning grids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Grid>", into = "Vec<Grid>")]
pub struct WinCatalog {
    grids: Vec<Grid>,
}

impl WinCatalog {
    /// Create a catalog, rejecting an empty list
    pub fn new(grids: Vec<Grid>) -> WfResult<Self> {
        if grids.is_empty() {
            return Err(WfError::EmptyCatalog);
        }
        Ok(Self { grids })
    }

    /// The five winning 5×3 grids of the standard game
    pub fn standard() -> Self {
        use Symbol::*;
        let grids = vec![
            Grid::from_static(&[
                &[Low2, Low3, High1],
                &[High1, High2, High1],
                &[High2, High1, High1],
                &[High2, High2, Low4],
                &[Low3, High3, Low4],
            ]),
            Grid::from_static(&[
                &[High1, High1, High1],
                &[High1, High2, High1],
                &[High2, High1, High1],
                &[High2, High2, Low4],
                &[Low3, High3, Low4],
            ]),
            Grid::from_static(&[
                &[High3, High3, High3],
                &[High3, High3, High3],
                &[High3, High3, High3],
                &[High3, High3, High3],
                &[High3, High3, High3],
            ]),
            Grid::from_static(&[
                &[High3, High1, Low3],
                &[High3, Low3, High1],
                &[High3, High1, Low3],
                &[Low4, High3, High3],
                &[Low3, Low1, High2],
            ]),
            Grid::from_static(&[
                &[High2, Low1, High3],
                &[High2, Low3, Low4],
                &[Low1, Low4, High2],
                &[Low3, High3, High2],
                &[High2, High2, High1],
            ]),
        ];
        Self { grids }
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    /// Always false for a constructed catalog
    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Grid> {
        self.grids.get(index)
    }

    pub fn grids(&self) -> &[Grid] {
        &self.grids
    }

    pub fn into_grids(self) -> Vec<Grid> {
        self.grids
    }
}

impl TryFrom<Vec<Grid>> for WinCatalog {
    type Error = WfError;

    fn try_from(value: Vec<Grid>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WinCatalog> for Vec<Grid> {
    fn from(value: WinCatalog) -> Self {
        value.grids
    }
}

/// Resolves spin outcomes
///
/// Holds its own RNG and remembers the last catalog index it returned,
/// so consecutive guaranteed wins never repeat the same grid.
pub struct OutcomeGenerator {
    rng: StdRng,
    grid: GridSpec,
    symbols: SymbolSet,
    catalog: Option<WinCatalog>,
    last_catalog_index: Option<usize>,
}

impl OutcomeGenerator {
    /// Create with OS-seeded RNG
    pub fn new(grid: GridSpec, symbols: SymbolSet, catalog: Option<WinCatalog>) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            grid,
            symbols,
            catalog,
            last_catalog_index: None,
        }
    }

    /// Standard 5×3 generator with the standard catalog and a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            grid: GridSpec::standard_5x3(),
            symbols: SymbolSet::full(),
            catalog: Some(WinCatalog::standard()),
            last_catalog_index: None,
        }
    }

    /// Create from config (seeded when the config carries a seed)
    pub fn from_config(config: &SlotConfig) -> Self {
        let catalog = if config.win_catalog.is_empty() {
            None
        } else {
            config.catalog().ok()
        };
        let mut generator = Self::new(config.grid, config.symbols.clone(), catalog);
        if let Some(seed) = config.seed {
            generator.seed(seed);
        }
        generator
    }

    /// Seed RNG for reproducible results
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn catalog(&self) -> Option<&WinCatalog> {
        self.catalog.as_ref()
    }

    /// Index returned by the previous catalog pick
    pub fn last_catalog_index(&self) -> Option<usize> {
        self.last_catalog_index
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // RESOLUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Resolve an outcome for the configured grid
    pub fn resolve(&mut self, mode: OutcomeMode) -> WfResult<Grid> {
        match mode {
            OutcomeMode::Random => {
                let symbols = self.symbols.clone();
                self.resolve_random(self.grid.columns, self.grid.rows, &symbols)
            }
            OutcomeMode::GuaranteedWin => self.resolve_from_catalog(),
        }
    }

    /// Fill `width × height` cells independently and uniformly from `symbols`
    pub fn resolve_random(&mut self, width: usize, height: usize, symbols: &SymbolSet) -> WfResult<Grid> {
        if width == 0 || height == 0 {
            return Err(WfError::MalformedGrid(format!(
                "cannot resolve a {}x{} grid",
                width, height
            )));
        }
        let pool = symbols.as_slice();
        let columns = (0..width)
            .map(|_| {
                (0..height)
                    .map(|_| pool[self.rng.random_range(0..pool.len())])
                    .collect::<Vec<_>>()
            })
            .collect();
        Grid::from_columns(columns)
    }

    /// Pick a catalog grid uniformly, never the same index twice in a row
    /// (unless the catalog has a single entry)
    pub fn resolve_from_catalog(&mut self) -> WfResult<Grid> {
        let catalog = self.catalog.as_ref().ok_or(WfError::EmptyCatalog)?;
        let count = catalog.len();

        let mut index = self.rng.random_range(0..count);
        if count > 1 {
            while Some(index) == self.last_catalog_index {
                index = self.rng.random_range(0..count);
            }
        }

        self.last_catalog_index = Some(index);
        log::debug!("Picked win catalog entry {} of {}", index, count);
        catalog
            .get(index)
            .cloned()
            .ok_or(WfError::EmptyCatalog)
    }
}
