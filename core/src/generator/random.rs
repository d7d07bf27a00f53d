use std::collections::BTreeSet;

use rand::prelude::*;
use rand::rngs::SmallRng;

use super::*;

/// Uniform generation by rejection sampling: draw a random cell, redraw on collision, until the requested number of
/// distinct mine coordinates is collected. Can optionally keep one start cell free of mines.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomMinefieldGenerator {
    seed: u64,
    start_cell: StartCell,
}

impl RandomMinefieldGenerator {
    pub fn new(seed: u64, start_cell: StartCell) -> Self {
        Self { seed, start_cell }
    }
}

impl MinefieldGenerator for RandomMinefieldGenerator {
    fn generate(self, config: GameConfig) -> Grid {
        use StartCell::*;

        let (rows, cols) = config.size;

        let excluded = match self.start_cell {
            Random => None,
            SafeAt(coords) if !in_bounds(coords, config.size) => {
                log::warn!("Start cell {:?} is outside the board, fallback to random", coords);
                None
            }
            // a valid config always leaves at least one safe cell, so the start cell fits
            SafeAt(coords) => Some(coords),
        };

        let free_cells = usize::from(config.total_cells()) - usize::from(excluded.is_some());
        let target = usize::from(config.mines).min(free_cells);
        if target < usize::from(config.mines) {
            log::warn!(
                "Cannot place {} mines on {} free cells, the minefield will be full",
                config.mines,
                free_cells
            );
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut mines = BTreeSet::new();
        while mines.len() < target {
            let coords = (rng.random_range(0..rows), rng.random_range(0..cols));
            if Some(coords) == excluded {
                continue;
            }
            if !mines.insert(coords) {
                log::trace!("Mine collision at {:?}, redrawing", coords);
            }
        }

        log::debug!(
            "Generated {}x{} board with {} mines (seed {})",
            rows,
            cols,
            mines.len(),
            self.seed
        );
        Grid::with_mines(config.size, mines)
    }
}
