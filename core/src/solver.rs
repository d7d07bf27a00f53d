//! Autoplay that drives a [`Session`] through its public moves only.
//!
//! Each pass scans the board from scratch: first flag cells that must be mines, then reveal cells judged safe, and
//! only when neither produced a move reveal a random hidden cell. There is no backtracking and no global constraint
//! network, so the solver loses games a complete solver would win.

use core::time::Duration;

use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// When a hidden cell next to a revealed number counts as safe.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SafetyRule {
    /// The number has at least one flagged neighbor. Cheap and local, and it can be wrong when the flags belong to
    /// a different part of the number's neighborhood.
    #[default]
    AnyFlag,
    /// The number's flagged neighbors already account for all of its mines.
    Saturated,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub safety_rule: SafetyRule,
    /// Before guessing, flag every hidden cell when exactly that many mines are still unflagged.
    pub flag_when_exhausted: bool,
    /// Pause after every move, so a watched game can be followed.
    pub move_delay: Option<Duration>,
}

/// Outcome of one finished round in batch mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_index: usize,
    pub score: CellCount,
    pub won: bool,
}

impl TrialRecord {
    fn from_session(trial_index: usize, session: &Session) -> Self {
        Self {
            trial_index,
            score: session.score(),
            won: session.state() == SessionState::Won,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub trials: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub mean_score: f64,
    pub best_score: CellCount,
}

impl TrialSummary {
    pub fn from_records(records: &[TrialRecord]) -> Self {
        let trials = records.len();
        if trials == 0 {
            return Self::default();
        }

        let wins = records.iter().filter(|record| record.won).count();
        let total_score: u64 = records.iter().map(|record| u64::from(record.score)).sum();
        Self {
            trials,
            wins,
            losses: trials - wins,
            win_rate: wins as f64 / trials as f64,
            mean_score: total_score as f64 / trials as f64,
            best_score: records.iter().map(|record| record.score).max().unwrap_or(0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Solver {
    config: SolverConfig,
    rng: SmallRng,
}

impl Solver {
    pub fn new(config: SolverConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy(config: SolverConfig) -> Self {
        Self {
            config,
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Plays the current round to the end.
    pub fn run_once(&mut self, session: &mut Session) -> Result<TrialRecord> {
        self.play(session)?;
        let record = TrialRecord::from_session(0, session);
        log::info!("Round finished: won {}, score {}", record.won, record.score);
        Ok(record)
    }

    /// Plays exactly `trials` rounds, resetting the session between them, and returns their records in order.
    ///
    /// The last round is left on the session so its final board can be inspected.
    pub fn run_batch(&mut self, session: &mut Session, trials: usize) -> Result<Vec<TrialRecord>> {
        let mut records = Vec::with_capacity(trials);
        for trial_index in 0..trials {
            if trial_index > 0 || session.is_terminal() {
                session.reset()?;
            }

            self.play(session)?;
            let record = TrialRecord::from_session(trial_index, session);
            log::info!(
                "Trial {}: won {}, score {}, {:?}",
                trial_index,
                record.won,
                record.score,
                session.elapsed()
            );
            records.push(record);
        }
        Ok(records)
    }

    fn play(&mut self, session: &mut Session) -> Result<()> {
        while !session.is_terminal() {
            let mut moved = self.flag_certain_mines(session)?;
            if !session.is_terminal() {
                moved |= self.reveal_safe_cells(session)?;
            }
            if moved || session.is_terminal() {
                continue;
            }

            if self.config.flag_when_exhausted && self.flag_remaining_mines(session)? {
                continue;
            }

            if !self.guess(session)? {
                log::warn!("No hidden cell left to play but the round is not over, giving up");
                break;
            }
        }
        Ok(())
    }

    /// Flags the hidden neighbors of every number that needs exactly that many more mines.
    fn flag_certain_mines(&mut self, session: &mut Session) -> Result<bool> {
        let size = session.size();
        let mut moved = false;

        for coords in all_coords(size) {
            let CellView::Revealed(count) = session.view_at(coords)? else {
                continue;
            };
            if count == 0 {
                continue;
            }

            let mut flagged = 0u8;
            let mut hidden: SmallVec<[Coord2; 8]> = SmallVec::new();
            for pos in neighbors(coords, size) {
                match session.view_at(pos)? {
                    CellView::Flagged => flagged += 1,
                    CellView::Hidden => hidden.push(pos),
                    _ => {}
                }
            }

            if count <= flagged || usize::from(count - flagged) != hidden.len() {
                continue;
            }

            for pos in hidden {
                if session.flag_count() >= session.mine_count() {
                    log::debug!("All {} flags placed, no more mines to mark", session.mine_count());
                    return Ok(moved);
                }

                session.flag_cell(pos)?;
                moved = true;
                log::debug!("Flagged {:?}, forced by {} at {:?}", pos, count, coords);
                self.pause();
                if session.is_terminal() {
                    return Ok(moved);
                }
            }
        }

        Ok(moved)
    }

    /// Reveals hidden cells that are next to a number the safety rule considers done.
    fn reveal_safe_cells(&mut self, session: &mut Session) -> Result<bool> {
        let size = session.size();
        let mut moved = false;

        for coords in all_coords(size) {
            if session.view_at(coords)? != CellView::Hidden {
                continue;
            }

            let mut safe = false;
            for pos in neighbors(coords, size) {
                let CellView::Revealed(count) = session.view_at(pos)? else {
                    continue;
                };
                if count == 0 {
                    continue;
                }

                let flagged = count_flagged_neighbors(session, pos)?;
                safe = match self.config.safety_rule {
                    SafetyRule::AnyFlag => flagged > 0,
                    SafetyRule::Saturated => flagged >= count,
                };
                if safe {
                    log::debug!("Revealing {:?}, judged safe from {} at {:?}", coords, count, pos);
                    break;
                }
            }

            if safe {
                session.reveal_cell(coords)?;
                moved = true;
                self.pause();
                if session.is_terminal() {
                    return Ok(moved);
                }
            }
        }

        Ok(moved)
    }

    /// Flags every hidden cell when only mines can be left under them.
    fn flag_remaining_mines(&mut self, session: &mut Session) -> Result<bool> {
        let hidden = hidden_cells(session)?;
        let mines_left = session.mines_left();
        if mines_left <= 0 || hidden.len() != mines_left as usize {
            return Ok(false);
        }

        log::debug!("Only mines left under {} hidden cells", hidden.len());
        for pos in hidden {
            session.flag_cell(pos)?;
            self.pause();
            if session.is_terminal() {
                break;
            }
        }
        Ok(true)
    }

    fn guess(&mut self, session: &mut Session) -> Result<bool> {
        let hidden = hidden_cells(session)?;
        let Some(&coords) = hidden.choose(&mut self.rng) else {
            return Ok(false);
        };

        log::debug!("No deduction applies, guessing {:?} out of {}", coords, hidden.len());
        session.reveal_cell(coords)?;
        self.pause();
        Ok(true)
    }

    fn pause(&self) {
        if let Some(delay) = self.config.move_delay {
            std::thread::sleep(delay);
        }
    }
}

fn all_coords((rows, cols): Coord2) -> impl Iterator<Item = Coord2> {
    (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
}

fn hidden_cells(session: &Session) -> Result<Vec<Coord2>> {
    let mut hidden = Vec::new();
    for coords in all_coords(session.size()) {
        if session.view_at(coords)? == CellView::Hidden {
            hidden.push(coords);
        }
    }
    Ok(hidden)
}

fn count_flagged_neighbors(session: &Session, coords: Coord2) -> Result<u8> {
    let mut flagged = 0;
    for pos in neighbors(coords, session.size()) {
        if session.view_at(pos)? == CellView::Flagged {
            flagged += 1;
        }
    }
    Ok(flagged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(size: Coord2, mines: &[Coord2]) -> Session {
        Session::from_grid(Grid::from_mine_coords(size, mines).unwrap(), 0)
    }

    fn solver(safety_rule: SafetyRule) -> Solver {
        Solver::new(
            SolverConfig {
                safety_rule,
                ..Default::default()
            },
            0,
        )
    }

    #[test]
    fn saturated_number_flags_its_hidden_neighbors() {
        let mut session = session((1, 2), &[(0, 1)]);
        session.reveal_cell((0, 0)).unwrap();

        assert!(solver(SafetyRule::AnyFlag).flag_certain_mines(&mut session).unwrap());
        assert_eq!(session.view_at((0, 1)).unwrap(), CellView::Flagged);
        assert_eq!(session.state(), SessionState::Won);
    }

    #[test]
    fn numbers_with_more_hidden_neighbors_than_mines_are_left_alone() {
        let mut session = session((1, 3), &[(0, 0)]);
        session.reveal_cell((0, 1)).unwrap();

        assert!(!solver(SafetyRule::AnyFlag).flag_certain_mines(&mut session).unwrap());
        assert_eq!(session.flag_count(), 0);
    }

    #[test]
    fn saturation_stops_once_every_flag_is_placed() {
        // M 1 1 M 1 0, both numbers point at a single hidden mine
        let mut session = session((1, 6), &[(0, 0), (0, 3)]);
        session.reveal_cell((0, 1)).unwrap();
        session.reveal_cell((0, 2)).unwrap();
        session.flag_cell((0, 4)).unwrap();
        session.flag_cell((0, 5)).unwrap();
        assert_eq!(session.flag_count(), session.mine_count());

        let mut solver = solver(SafetyRule::AnyFlag);
        assert!(!solver.flag_certain_mines(&mut session).unwrap());
        assert_eq!(session.flag_count(), 2);
        assert_eq!(session.view_at((0, 0)).unwrap(), CellView::Hidden);
        assert_eq!(session.view_at((0, 3)).unwrap(), CellView::Hidden);

        // one flag back in hand, only the first number gets to use it
        session.flag_cell((0, 5)).unwrap();
        assert!(solver.flag_certain_mines(&mut session).unwrap());
        assert_eq!(session.flag_count(), 2);
        assert_eq!(session.view_at((0, 0)).unwrap(), CellView::Flagged);
        assert_eq!(session.view_at((0, 3)).unwrap(), CellView::Hidden);
    }

    #[test]
    fn flagged_number_makes_other_neighbors_safe() {
        let mut session = session((1, 3), &[(0, 0)]);
        session.reveal_cell((0, 1)).unwrap();
        session.flag_cell((0, 0)).unwrap();

        assert!(solver(SafetyRule::Saturated).reveal_safe_cells(&mut session).unwrap());
        assert_eq!(session.view_at((0, 2)).unwrap(), CellView::Revealed(0));
        assert_eq!(session.state(), SessionState::Won);
    }

    #[test]
    fn any_flag_rule_trusts_partial_flags() {
        // the 2 in the middle has one of its two mines flagged
        let mut any_flag = session((1, 3), &[(0, 0), (0, 2)]);
        any_flag.reveal_cell((0, 1)).unwrap();
        any_flag.flag_cell((0, 0)).unwrap();
        let mut saturated = any_flag.clone();

        assert!(!solver(SafetyRule::Saturated).reveal_safe_cells(&mut saturated).unwrap());
        assert_eq!(saturated.state(), SessionState::Playing);

        assert!(solver(SafetyRule::AnyFlag).reveal_safe_cells(&mut any_flag).unwrap());
        assert_eq!(any_flag.state(), SessionState::Lost);
        assert!(any_flag.cell_at((0, 2)).unwrap().is_detonated());
    }

    #[test]
    fn exhausted_hidden_cells_are_flagged() {
        let mut session = session((2, 2), &[(0, 0), (1, 1)]);
        session.reveal_cell((0, 1)).unwrap();
        session.reveal_cell((1, 0)).unwrap();

        let mut solver = Solver::new(
            SolverConfig {
                flag_when_exhausted: true,
                ..Default::default()
            },
            0,
        );
        assert!(solver.flag_remaining_mines(&mut session).unwrap());
        assert_eq!(session.state(), SessionState::Won);
    }

    #[test]
    fn run_once_finishes_the_round() {
        let mut session = session((1, 2), &[(0, 1)]);
        session.reveal_cell((0, 0)).unwrap();

        let record = solver(SafetyRule::AnyFlag).run_once(&mut session).unwrap();

        assert_eq!(
            record,
            TrialRecord {
                trial_index: 0,
                score: 1,
                won: true
            }
        );
    }

    #[test]
    fn run_once_on_a_finished_round_makes_no_moves() {
        let mut session = session((1, 2), &[(0, 1)]);
        session.reveal_cell((0, 1)).unwrap();
        let grid = session.grid().clone();

        let record = solver(SafetyRule::AnyFlag).run_once(&mut session).unwrap();

        assert!(!record.won);
        assert_eq!(session.grid(), &grid);
    }

    #[test]
    fn batch_produces_one_record_per_trial() {
        let mut session = Session::new(Difficulty::Beginner.config(), 7).unwrap();
        let mut solver = Solver::new(SolverConfig::default(), 7);

        let records = solver.run_batch(&mut session, 10).unwrap();

        assert_eq!(records.len(), 10);
        let safe_cells = Difficulty::Beginner.config().safe_cells();
        for (index, record) in records.iter().enumerate() {
            assert_eq!(record.trial_index, index);
            assert!(record.score <= safe_cells);
            if record.won {
                assert_eq!(record.score, safe_cells);
            }
        }

        let last = records.last().unwrap();
        assert!(session.is_terminal());
        assert_eq!(last.won, session.state() == SessionState::Won);
        assert_eq!(last.score, session.score());
        assert!(session.flag_count() <= session.mine_count());
    }

    #[test]
    fn batch_is_deterministic_for_fixed_seeds() {
        let run = || {
            let mut session = Session::new(Difficulty::Intermediate.config(), 3).unwrap();
            let mut solver = Solver::new(
                SolverConfig {
                    safety_rule: SafetyRule::Saturated,
                    flag_when_exhausted: true,
                    move_delay: None,
                },
                5,
            );
            solver.run_batch(&mut session, 5).unwrap()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn batch_calls_are_independent() {
        let mut session = Session::new(Difficulty::Classic.config(), 1).unwrap();
        let mut solver = Solver::new(SolverConfig::default(), 1);

        assert_eq!(solver.run_batch(&mut session, 3).unwrap().len(), 3);
        let second = solver.run_batch(&mut session, 2).unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].trial_index, 0);
        assert!(solver.run_batch(&mut session, 0).unwrap().is_empty());
    }

    #[test]
    fn summary_aggregates_records() {
        let records = [
            TrialRecord {
                trial_index: 0,
                score: 10,
                won: false,
            },
            TrialRecord {
                trial_index: 1,
                score: 71,
                won: true,
            },
            TrialRecord {
                trial_index: 2,
                score: 3,
                won: false,
            },
            TrialRecord {
                trial_index: 3,
                score: 71,
                won: true,
            },
        ];

        let summary = TrialSummary::from_records(&records);

        assert_eq!(summary.trials, 4);
        assert_eq!(summary.wins, 2);
        assert_eq!(summary.losses, 2);
        assert_eq!(summary.win_rate, 0.5);
        assert_eq!(summary.mean_score, 38.75);
        assert_eq!(summary.best_score, 71);
        assert_eq!(TrialSummary::from_records(&[]), TrialSummary::default());
    }

    #[test]
    fn records_serialize_for_the_stats_layer() {
        let record = TrialRecord {
            trial_index: 2,
            score: 5,
            won: false,
        };

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"trial_index":2,"score":5,"won":false}"#
        );
    }
}
