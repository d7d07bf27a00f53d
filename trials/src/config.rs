use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use sweeper_core::*;

/// Settings read from a TOML file, every key optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub difficulty: Option<Difficulty>,
    pub rows: Option<Coord>,
    pub cols: Option<Coord>,
    pub mines: Option<CellCount>,
    pub trials: Option<usize>,
    pub seed: Option<u64>,
    pub first_move_safe: Option<bool>,
    pub safety_rule: Option<SafetyRule>,
    pub flag_when_exhausted: Option<bool>,
    pub delay_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Fills every unset key of `self` from `fallback`.
    pub fn or(self, fallback: FileConfig) -> FileConfig {
        FileConfig {
            difficulty: self.difficulty.or(fallback.difficulty),
            rows: self.rows.or(fallback.rows),
            cols: self.cols.or(fallback.cols),
            mines: self.mines.or(fallback.mines),
            trials: self.trials.or(fallback.trials),
            seed: self.seed.or(fallback.seed),
            first_move_safe: self.first_move_safe.or(fallback.first_move_safe),
            safety_rule: self.safety_rule.or(fallback.safety_rule),
            flag_when_exhausted: self.flag_when_exhausted.or(fallback.flag_when_exhausted),
            delay_ms: self.delay_ms.or(fallback.delay_ms),
        }
    }
}

/// Fully resolved settings for one batch run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    pub game: GameConfig,
    pub trials: usize,
    pub seed: Option<u64>,
    pub first_move_safe: bool,
    pub solver: SolverConfig,
}

pub const DEFAULT_TRIALS: usize = 10;

impl TryFrom<FileConfig> for RunConfig {
    type Error = anyhow::Error;

    fn try_from(config: FileConfig) -> anyhow::Result<Self> {
        let preset = config.difficulty.unwrap_or_default().config();
        let size = (
            config.rows.unwrap_or(preset.size.0),
            config.cols.unwrap_or(preset.size.1),
        );
        let mines = config.mines.unwrap_or(preset.mines);
        let game = GameConfig::new(size, mines).context("Invalid board settings")?;

        Ok(Self {
            game,
            trials: config.trials.unwrap_or(DEFAULT_TRIALS),
            seed: config.seed,
            first_move_safe: config.first_move_safe.unwrap_or(false),
            solver: SolverConfig {
                safety_rule: config.safety_rule.unwrap_or_default(),
                flag_when_exhausted: config.flag_when_exhausted.unwrap_or(false),
                move_delay: config
                    .delay_ms
                    .filter(|&ms| ms > 0)
                    .map(Duration::from_millis),
            },
        })
    }
}
