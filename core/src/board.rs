//! The board engine: building a grid, revealing with flood fill, flag toggling and win evaluation.
//!
//! Everything here takes the grid explicitly so it works the same against generated and synthetic boards.

use std::collections::VecDeque;

use rand::Rng;

use crate::*;

/// Builds a `rows x cols` grid with `mines` uniformly placed mines.
pub fn build<R: Rng>(size: Coord2, mines: CellCount, rng: &mut R) -> Result<Grid> {
    let config = GameConfig::new(size, mines)?;
    Ok(RandomMinefieldGenerator::new(rng.random(), StartCell::Random).generate(config))
}

/// Reveals a hidden cell, flood filling from it when it is empty.
///
/// A flag on a revealed cell is cleared. Revealing an already revealed cell is a no-op.
pub fn reveal(grid: &mut Grid, coords: Coord2) -> Result<RevealOutcome> {
    let coords = grid.validate_coords(coords)?;
    let cell = grid[coords];

    if cell.is_revealed() {
        return Ok(RevealOutcome::NoChange);
    }

    open_cell(grid, coords);

    if cell.is_mine() {
        grid[coords].detonated = true;
        log::debug!("Detonated mine at {:?}", coords);
        return Ok(RevealOutcome::Mine);
    }

    let count = cell.adjacent_mine_count();
    log::debug!("Revealed cell at {:?}, mine count: {}", coords, count);
    if count > 0 {
        return Ok(RevealOutcome::Numbered(count));
    }

    let mut revealed: CellCount = 1;
    let mut to_visit: VecDeque<_> = grid
        .iter_neighbors(coords)
        .filter(|&pos| !grid[pos].is_revealed())
        .collect();
    log::trace!(
        "Starting flood-fill from {:?}, initial neighbors: {:?}",
        coords,
        to_visit
    );

    while let Some(visit_coords) = to_visit.pop_front() {
        let visit = grid[visit_coords];

        // queued more than once, or a mine next to a numbered border
        if visit.is_revealed() || visit.is_mine() {
            continue;
        }

        open_cell(grid, visit_coords);
        revealed += 1;
        log::trace!(
            "Flood opened cell at {:?}, mine count: {}",
            visit_coords,
            visit.adjacent_mine_count()
        );

        if visit.is_empty() {
            to_visit.extend(
                grid.iter_neighbors(visit_coords)
                    .filter(|&pos| !grid[pos].is_revealed()),
            );
        }
    }

    Ok(RevealOutcome::Empty { revealed })
}

/// Flips the flag on a hidden cell. Revealed cells cannot be flagged.
pub fn toggle_flag(grid: &mut Grid, coords: Coord2) -> Result<MarkOutcome> {
    let coords = grid.validate_coords(coords)?;
    let cell = &mut grid[coords];

    if cell.revealed {
        return Ok(MarkOutcome::NoChange);
    }

    cell.flagged = !cell.flagged;
    if cell.flagged {
        grid.flag_count += 1;
    } else {
        grid.flag_count -= 1;
    }
    Ok(MarkOutcome::Changed)
}

/// Won when every mine is flagged and every other cell is revealed and unflagged.
pub fn evaluate_win(grid: &Grid) -> bool {
    grid.cells()
        .all(|cell| (cell.is_revealed() || cell.is_flagged()) && cell.is_flagged() == cell.is_mine())
}

/// Exposes the whole board without detonating anything, so mines can be shown after a loss.
pub fn reveal_all(grid: &mut Grid) {
    let (rows, cols) = grid.size();
    for row in 0..rows {
        for col in 0..cols {
            if !grid[(row, col)].is_revealed() {
                open_cell(grid, (row, col));
            }
        }
    }
}

fn open_cell(grid: &mut Grid, coords: Coord2) {
    let cell = &mut grid[coords];
    let was_flagged = cell.flagged;
    let is_mine = cell.is_mine;

    cell.revealed = true;
    cell.flagged = false;

    if was_flagged {
        grid.flag_count -= 1;
    }
    if !is_mine {
        grid.revealed_safe_count += 1;
    }
}
