use core::slice;

/// Row or column index, also used for board dimensions.
pub type Coord = u8;

/// Mine counts, cell counts and scores. Wide enough for a full 255x255 board.
pub type CellCount = u16;

/// Board position as `(row, col)`, or board dimensions as `(rows, cols)`.
pub type Coord2 = (Coord, Coord);

/// Index into the `ndarray` storage of a grid.
pub fn nd_index((row, col): Coord2) -> [usize; 2] {
    [usize::from(row), usize::from(col)]
}

/// Number of cells on a `rows x cols` board.
pub const fn area(rows: Coord, cols: Coord) -> CellCount {
    (rows as CellCount) * (cols as CellCount)
}

pub const fn in_bounds((row, col): Coord2, (rows, cols): Coord2) -> bool {
    row < rows && col < cols
}

const OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Up to eight in-bounds neighbors of `center`, top row first, left to right.
///
/// Works from coordinates and dimensions alone, no grid is needed.
pub fn neighbors(center: Coord2, size: Coord2) -> Neighbors {
    Neighbors {
        center,
        size,
        offsets: OFFSETS.iter(),
    }
}

#[derive(Clone, Debug)]
pub struct Neighbors {
    center: Coord2,
    size: Coord2,
    offsets: slice::Iter<'static, (i8, i8)>,
}

impl Neighbors {
    fn shift(&self, (d_row, d_col): (i8, i8)) -> Option<Coord2> {
        let row = self.center.0.checked_add_signed(d_row)?;
        let col = self.center.1.checked_add_signed(d_col)?;
        in_bounds((row, col), self.size).then_some((row, col))
    }
}

impl Iterator for Neighbors {
    type Item = Coord2;

    fn next(&mut self) -> Option<Coord2> {
        while let Some(&offset) = self.offsets.next() {
            if let Some(pos) = self.shift(offset) {
                return Some(pos);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.offsets.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_cell_has_eight_neighbors_in_row_major_order() {
        let found: Vec<_> = neighbors((1, 1), (3, 3)).collect();

        assert_eq!(
            found,
            [(0, 0), (0, 1), (0, 2), (1, 0), (1, 2), (2, 0), (2, 1), (2, 2)]
        );
    }

    #[test]
    fn corner_cells_do_not_wrap_around() {
        let top_left: Vec<_> = neighbors((0, 0), (3, 4)).collect();
        let bottom_right: Vec<_> = neighbors((2, 3), (3, 4)).collect();

        assert_eq!(top_left, [(0, 1), (1, 0), (1, 1)]);
        assert_eq!(bottom_right, [(1, 2), (1, 3), (2, 2)]);
    }

    #[test]
    fn single_row_board() {
        let found: Vec<_> = neighbors((0, 0), (1, 2)).collect();

        assert_eq!(found, [(0, 1)]);
        assert_eq!(neighbors((0, 0), (1, 1)).count(), 0);
    }

    #[test]
    fn max_coordinates_do_not_overflow() {
        let found: Vec<_> = neighbors((254, 254), (255, 255)).collect();

        assert_eq!(found, [(253, 253), (253, 254), (254, 253)]);
        assert_eq!(area(255, 255), 65025);
    }
}
