use core::fmt;
use serde::{Deserialize, Serialize};

use crate::Coord2;

/// One board position with its hidden truth and its player-visible state.
///
/// `is_mine` and `adjacent_mine_count` are fixed when the grid is built. `revealed` only ever goes from `false` to
/// `true`, and revealing a cell clears its flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    coords: Coord2,
    pub(crate) is_mine: bool,
    pub(crate) revealed: bool,
    pub(crate) flagged: bool,
    pub(crate) detonated: bool,
    pub(crate) adjacent_mine_count: u8,
}

impl Cell {
    pub(crate) const fn new(coords: Coord2) -> Self {
        Self {
            coords,
            is_mine: false,
            revealed: false,
            flagged: false,
            detonated: false,
            adjacent_mine_count: 0,
        }
    }

    pub const fn coords(&self) -> Coord2 {
        self.coords
    }

    pub const fn row(&self) -> u8 {
        self.coords.0
    }

    pub const fn col(&self) -> u8 {
        self.coords.1
    }

    pub const fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub const fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub const fn is_detonated(&self) -> bool {
        self.detonated
    }

    pub const fn adjacent_mine_count(&self) -> u8 {
        self.adjacent_mine_count
    }

    /// A safe cell with no adjacent mines, the kind that keeps a flood fill going.
    pub const fn is_empty(&self) -> bool {
        !self.is_mine && self.adjacent_mine_count == 0
    }

    pub const fn is_hidden(&self) -> bool {
        !self.revealed && !self.flagged
    }

    /// What a player looking at the board can see of this cell.
    pub const fn view(&self) -> CellView {
        match (self.revealed, self.flagged, self.is_mine, self.detonated) {
            (true, _, true, true) => CellView::Detonated,
            (true, _, true, false) => CellView::Mine,
            (true, _, false, _) => CellView::Revealed(self.adjacent_mine_count),
            (false, true, _, _) => CellView::Flagged,
            (false, false, _, _) => CellView::Hidden,
        }
    }
}

/// Player-visible state of a cell, which never leaks whether a hidden cell holds a mine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    #[default]
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    Detonated,
}

impl CellView {
    pub const fn is_unrevealed(self) -> bool {
        matches!(self, Self::Hidden | Self::Flagged)
    }
}

impl fmt::Display for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CellView::*;
        let c = match *self {
            Hidden => '#',
            Flagged => 'F',
            Revealed(0) => '.',
            Revealed(count) => char::from(b'0' + count),
            Mine => '*',
            Detonated => 'X',
        };
        write!(f, "{}", c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_hides_mines_until_revealed() {
        let mut cell = Cell::new((0, 0));
        assert_eq!(cell.view(), CellView::default());
        cell.is_mine = true;
        assert_eq!(cell.view(), CellView::Hidden);

        cell.flagged = true;
        assert_eq!(cell.view(), CellView::Flagged);

        cell.flagged = false;
        cell.revealed = true;
        assert_eq!(cell.view(), CellView::Mine);

        cell.detonated = true;
        assert_eq!(cell.view(), CellView::Detonated);
    }

    #[test]
    fn display_is_one_char_per_state() {
        assert_eq!(CellView::Revealed(0).to_string(), ".");
        assert_eq!(CellView::Revealed(8).to_string(), "8");
        assert_eq!(CellView::Hidden.to_string(), "#");
        assert_eq!(CellView::Detonated.to_string(), "X");
    }
}
