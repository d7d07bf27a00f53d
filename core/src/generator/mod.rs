use crate::*;
pub use random::*;

mod random;

pub trait MinefieldGenerator {
    fn generate(self, config: GameConfig) -> Grid;
}

/// How the generator treats the cell the player is going to open first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StartCell {
    /// No special treatment, the first cell may be a mine.
    Random,
    /// Never place a mine at these coordinates.
    SafeAt(Coord2),
}
