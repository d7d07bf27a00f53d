use serde::{Deserialize, Serialize};

pub use cell::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use session::*;
pub use solver::*;
pub use types::*;

pub mod board;
mod cell;
mod error;
mod generator;
mod grid;
mod session;
mod solver;
mod types;

/// Board dimensions and mine count. [`GameConfig::new`] is the validating constructor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    /// Requires a non-empty board and `0 < mines < rows * cols`. Out of range values are rejected, never clamped.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        let (rows, cols) = size;
        if rows == 0 || cols == 0 || mines == 0 || mines >= area(rows, cols) {
            return Err(GameError::InvalidConfiguration { rows, cols, mines });
        }
        Ok(Self { size, mines })
    }

    pub const fn total_cells(&self) -> CellCount {
        area(self.size.0, self.size.1)
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    /// 8x8 with 6 mines
    #[default]
    Classic,
    /// 9x9 with 10 mines
    Beginner,
    /// 16x16 with 40 mines
    Intermediate,
    /// 16x30 with 99 mines
    Expert,
}

impl Difficulty {
    pub const fn config(self) -> GameConfig {
        let (size, mines) = match self {
            Self::Classic => ((8, 8), 6),
            Self::Beginner => ((9, 9), 10),
            Self::Intermediate => ((16, 16), 40),
            Self::Expert => ((16, 30), 99),
        };
        GameConfig { size, mines }
    }
}

/// Outcome of toggling a flag
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Outcome of revealing a cell
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Already revealed, or the round is over
    NoChange,
    /// The cell was a mine
    Mine,
    /// A single safe cell with this many adjacent mines
    Numbered(u8),
    /// An empty cell and its flood fill, `revealed` counts every safe cell opened including the first
    Empty { revealed: CellCount },
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoChange)
    }

    /// How many safe cells this reveal opened
    pub const fn safe_cells_revealed(self) -> CellCount {
        match self {
            Self::NoChange | Self::Mine => 0,
            Self::Numbered(_) => 1,
            Self::Empty { revealed } => revealed,
        }
    }
}
