use core::fmt;
use core::time::Duration;

use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Valid transitions:
/// - Playing -> Won
/// - Playing -> Lost
/// - Won/Lost -> Playing, only through [`Session::reset`]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Playing,
    Won,
    Lost,
}

impl SessionState {
    /// Indicates the round has ended and no moves can be made anymore
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// One round of play over an exclusively owned grid, with score and timing.
///
/// Every mutation goes through the board engine. Once the round is won or lost all moves are ignored until
/// [`reset`](Self::reset) builds a fresh grid.
#[derive(Clone, Debug)]
pub struct Session {
    config: GameConfig,
    rng: SmallRng,
    grid: Grid,
    score: CellCount,
    state: SessionState,
    started_at: Instant,
    ended_at: Option<Instant>,
    first_move_safe: bool,
    has_revealed: bool,
}

impl Session {
    /// Starts a round on a freshly generated board, every later board comes from the same seeded sequence.
    ///
    /// The config is validated again here since its fields are public.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        let config = GameConfig::new(config.size, config.mines)?;
        let mut rng = SmallRng::seed_from_u64(seed);
        let grid = RandomMinefieldGenerator::new(rng.random(), StartCell::Random).generate(config);
        Ok(Self::with_grid(config, rng, grid))
    }

    pub fn from_entropy(config: GameConfig) -> Result<Self> {
        Self::new(config, SmallRng::from_os_rng().random())
    }

    /// Starts a round on a prepared grid. Later resets generate random boards of the same shape.
    pub fn from_grid(grid: Grid, seed: u64) -> Self {
        let config = GameConfig {
            size: grid.size(),
            mines: grid.mine_count(),
        };
        Self::with_grid(config, SmallRng::seed_from_u64(seed), grid)
    }

    fn with_grid(config: GameConfig, rng: SmallRng, grid: Grid) -> Self {
        Self {
            config,
            rng,
            grid,
            score: 0,
            state: SessionState::Playing,
            started_at: Instant::now(),
            ended_at: None,
            first_move_safe: false,
            has_revealed: false,
        }
    }

    /// When enabled, a first reveal that would hit a mine moves that mine elsewhere instead.
    pub fn with_first_move_safe(mut self, first_move_safe: bool) -> Self {
        self.first_move_safe = first_move_safe;
        self
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> Coord2 {
        self.grid.size()
    }

    pub fn mine_count(&self) -> CellCount {
        self.grid.mine_count()
    }

    pub fn flag_count(&self) -> CellCount {
        self.grid.flag_count()
    }

    /// How many mines have not been flagged yet
    pub fn mines_left(&self) -> isize {
        (self.grid.mine_count() as isize) - (self.grid.flag_count() as isize)
    }

    /// Safe cells revealed by moves this round
    pub fn score(&self) -> CellCount {
        self.score
    }

    /// Time since the round started, frozen once it ends
    pub fn elapsed(&self) -> Duration {
        self.ended_at
            .unwrap_or_else(Instant::now)
            .duration_since(self.started_at)
    }

    pub fn cell_at(&self, coords: Coord2) -> Result<&Cell> {
        self.grid.cell_at(coords)
    }

    pub fn view_at(&self, coords: Coord2) -> Result<CellView> {
        Ok(self.grid.cell_at(coords)?.view())
    }

    pub fn reveal_cell(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.grid.validate_coords(coords)?;
        if self.is_terminal() {
            log::debug!("Ignoring reveal at {:?}, round already ended", coords);
            return Ok(RevealOutcome::NoChange);
        }

        if !self.has_revealed {
            self.ensure_safe_first_move(coords)?;
        }

        let outcome = board::reveal(&mut self.grid, coords)?;
        if outcome.has_update() {
            self.has_revealed = true;
        }
        self.score += outcome.safe_cells_revealed();

        if outcome == RevealOutcome::Mine {
            board::reveal_all(&mut self.grid);
            self.end_round(SessionState::Lost);
        } else if board::evaluate_win(&self.grid) {
            self.end_round(SessionState::Won);
        }
        Ok(outcome)
    }

    pub fn flag_cell(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.grid.validate_coords(coords)?;
        if self.is_terminal() {
            log::debug!("Ignoring flag at {:?}, round already ended", coords);
            return Ok(MarkOutcome::NoChange);
        }

        let outcome = board::toggle_flag(&mut self.grid, coords)?;
        log::debug!("Flag toggled at {:?}: {:?}", coords, outcome);

        if board::evaluate_win(&self.grid) {
            self.end_round(SessionState::Won);
        }
        Ok(outcome)
    }

    /// Replaces the grid with a newly generated one and clears score, timing and the terminal state.
    pub fn reset(&mut self) -> Result<()> {
        let config = GameConfig::new(self.config.size, self.config.mines)?;
        self.grid = RandomMinefieldGenerator::new(self.rng.random(), StartCell::Random).generate(config);
        self.score = 0;
        self.state = SessionState::Playing;
        self.started_at = Instant::now();
        self.ended_at = None;
        self.has_revealed = false;
        log::debug!("Session reset");
        Ok(())
    }

    fn ensure_safe_first_move(&mut self, coords: Coord2) -> Result<()> {
        if !self.first_move_safe || !self.grid.contains_mine(coords) {
            return Ok(());
        }

        let Ok(config) = GameConfig::new(self.config.size, self.config.mines) else {
            log::warn!("Cannot move the mine away from the first move, board is full");
            return Ok(());
        };

        let flags: Vec<Coord2> = self
            .grid
            .cells()
            .filter(|cell| cell.is_flagged())
            .map(Cell::coords)
            .collect();

        self.grid = RandomMinefieldGenerator::new(self.rng.random(), StartCell::SafeAt(coords)).generate(config);
        for flag in flags {
            board::toggle_flag(&mut self.grid, flag)?;
        }
        log::debug!("First move at {:?} hit a mine, regenerated the board", coords);
        Ok(())
    }

    fn end_round(&mut self, state: SessionState) {
        if self.state.is_terminal() {
            return;
        }

        self.state = state;
        let now = Instant::now();
        self.ended_at.replace(now);
        log::debug!(
            "Round ended {:?} with score {} after {:?}",
            state,
            self.score,
            self.elapsed()
        );
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:?} score: {} mines left: {}",
            self.state,
            self.score,
            self.mines_left()
        )?;
        write!(f, "{}", self.grid)
    }
}
