use core::fmt;
use core::ops::{Index, IndexMut};
use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// A rows x cols matrix of cells together with the set of mine locations.
///
/// A grid is built once per round. Its mine layout and adjacency counts never change afterwards, only the
/// revealed/flagged state of its cells does, and that only through the board engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
    mine_locations: BTreeSet<Coord2>,
    pub(crate) revealed_safe_count: CellCount,
    pub(crate) flag_count: CellCount,
}

impl Grid {
    /// Lays out mines at already validated, in-bounds coordinates and computes every adjacency count.
    pub(crate) fn with_mines(size: Coord2, mine_locations: BTreeSet<Coord2>) -> Self {
        let mut cells = Array2::from_shape_fn(nd_index(size), |(row, col)| {
            Cell::new((row as Coord, col as Coord))
        });

        for &coords in &mine_locations {
            cells[nd_index(coords)].is_mine = true;
        }

        for cell in cells.iter_mut() {
            cell.adjacent_mine_count = neighbors(cell.coords(), size)
                .filter(|pos| mine_locations.contains(pos))
                .count() as u8;
        }

        Self {
            cells,
            mine_locations,
            revealed_safe_count: 0,
            flag_count: 0,
        }
    }

    /// Builds a grid with mines at exactly the given coordinates, duplicates are merged.
    ///
    /// Unlike [`board::build`] this accepts boards with no mines at all, which is handy for replays and tests.
    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidConfiguration {
                rows: size.0,
                cols: size.1,
                mines: mine_coords.len().try_into().unwrap_or(CellCount::MAX),
            });
        }

        let mut mine_locations = BTreeSet::new();
        for &coords in mine_coords {
            if !in_bounds(coords, size) {
                return Err(GameError::OutOfBounds(coords));
            }
            mine_locations.insert(coords);
        }

        Ok(Self::with_mines(size, mine_locations))
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        area(self.rows(), self.cols())
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_locations.len() as CellCount
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count()
    }

    pub fn mine_locations(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_locations.iter().copied()
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self.mine_locations.contains(&coords)
    }

    /// Safe cells revealed so far.
    pub fn revealed_safe_count(&self) -> CellCount {
        self.revealed_safe_count
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if in_bounds(coords, self.size()) {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds(coords))
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<&Cell> {
        let coords = self.validate_coords(coords)?;
        Ok(&self[coords])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Coordinates of the in-bounds neighbors of `coords`, which is assumed to be in bounds itself.
    pub fn iter_neighbors(&self, coords: Coord2) -> Neighbors {
        neighbors(coords, self.size())
    }

    /// The up-to-8 existing neighbors of a cell, in row-major offset order.
    pub fn neighbor_cells(&self, coords: Coord2) -> Result<impl Iterator<Item = &Cell> + '_> {
        let coords = self.validate_coords(coords)?;
        Ok(self.iter_neighbors(coords).map(move |pos| &self[pos]))
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[nd_index(coords)]
    }
}

impl IndexMut<Coord2> for Grid {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[nd_index(coords)]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for cell in row {
                write!(f, "{}", cell.view())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
