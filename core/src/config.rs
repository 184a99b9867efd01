use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted grid width or height.
pub const MIN_GRID_DIMENSION: u32 = 5;
/// Largest accepted share of blocked cells.
pub const MAX_BLOCK_RATIO: f64 = 0.5;
/// Smallest accepted required path length.
pub const MIN_PATH_LENGTH: u32 = 3;
/// Slowest accepted flow speed in cells per second.
pub const MIN_FLOW_SPEED: f32 = 0.1;
/// Fastest accepted flow speed in cells per second.
pub const MAX_FLOW_SPEED: f32 = 2.0;
/// Smallest accepted pipe queue length.
pub const MIN_QUEUE_SIZE: usize = 3;

/// Complete configuration of a game session.
///
/// Every field has a default, so a partial TOML document only needs to name the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for level generation and the pipe supply; drawn from entropy when absent.
    pub seed: Option<u64>,
    /// Board dimensions.
    pub grid: GridConfig,
    /// Rules and pacing.
    pub gameplay: GameplayConfig,
    /// Relative odds of each pipe type appearing in the queue.
    pub pipes: Vec<PipeWeight>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            grid: GridConfig::default(),
            gameplay: GameplayConfig::default(),
            pipes: vec![
                PipeWeight::new("straight", 1.0),
                PipeWeight::new("curved", 1.0),
                PipeWeight::new("cross", 0.5),
            ],
        }
    }
}

impl GameConfig {
    /// Checks every bound the engine relies on, reporting the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.gameplay.validate()?;

        if self.pipes.is_empty() {
            return Err(ConfigError::NoPipeWeights);
        }
        if let Some(row) = self
            .pipes
            .iter()
            .find(|row| row.weight.is_nan() || row.weight < 0.0)
        {
            return Err(ConfigError::NegativePipeWeight {
                pipe_type: row.pipe_type.clone(),
                weight: row.weight,
            });
        }

        Ok(())
    }
}

/// Board dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 9,
            height: 7,
        }
    }
}

impl GridConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.width < MIN_GRID_DIMENSION || self.height < MIN_GRID_DIMENSION {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// Rules and pacing of a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Share of cells turned into obstacles when the board is laid out.
    pub block_ratio: f64,
    /// Lower bound of the randomly drawn required path length.
    pub min_path_length: u32,
    /// Upper bound of the randomly drawn required path length.
    pub max_path_length: u32,
    /// Cells the fluid fills per second.
    pub flow_speed: f32,
    /// Seconds between locking placement and the fluid starting.
    pub placement_delay_secs: f32,
    /// Number of upcoming pipes kept in the queue.
    pub queue_size: usize,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            block_ratio: 0.15,
            min_path_length: 5,
            max_path_length: 8,
            flow_speed: 0.5,
            placement_delay_secs: 2.0,
            queue_size: 5,
        }
    }
}

impl GameplayConfig {
    /// Placement delay as a duration.
    pub fn placement_delay(&self) -> Result<Duration, ConfigError> {
        if !(self.placement_delay_secs >= 0.0 && self.placement_delay_secs.is_finite()) {
            return Err(ConfigError::InvalidPlacementDelay(
                self.placement_delay_secs,
            ));
        }
        Duration::try_from_secs_f32(self.placement_delay_secs)
            .map_err(|_| ConfigError::PlacementDelayTooLong(self.placement_delay_secs))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=MAX_BLOCK_RATIO).contains(&self.block_ratio) {
            return Err(ConfigError::BlockRatioOutOfRange(self.block_ratio));
        }
        if self.min_path_length < MIN_PATH_LENGTH {
            return Err(ConfigError::PathLengthTooShort(self.min_path_length));
        }
        if self.max_path_length < self.min_path_length {
            return Err(ConfigError::PathLengthRangeInverted {
                min: self.min_path_length,
                max: self.max_path_length,
            });
        }
        if !(MIN_FLOW_SPEED..=MAX_FLOW_SPEED).contains(&self.flow_speed) {
            return Err(ConfigError::FlowSpeedOutOfRange(self.flow_speed));
        }
        let _ = self.placement_delay()?;
        if self.queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::QueueTooShort(self.queue_size));
        }
        Ok(())
    }
}

/// One row of the pipe weight table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipeWeight {
    /// Registry name of the pipe type.
    #[serde(rename = "type")]
    pub pipe_type: String,
    /// Relative odds of the type; rows at or below zero are ignored by the factory.
    #[serde(default = "default_pipe_weight")]
    pub weight: f64,
}

impl PipeWeight {
    /// Creates a weight row.
    #[must_use]
    pub fn new(pipe_type: impl Into<String>, weight: f64) -> Self {
        Self {
            pipe_type: pipe_type.into(),
            weight,
        }
    }
}

fn default_pipe_weight() -> f64 {
    1.0
}

/// Reasons a configuration is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The board is smaller than the minimum supported size.
    #[error("grid must be at least {}x{}, got {width}x{height}", MIN_GRID_DIMENSION, MIN_GRID_DIMENSION)]
    GridTooSmall {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// The blocked-cell share leaves too little room for a start cell.
    #[error("gameplay.block_ratio must lie in 0..={}, got {0}", MAX_BLOCK_RATIO)]
    BlockRatioOutOfRange(f64),
    /// The lower required path length bound is too small.
    #[error("gameplay.min_path_length must be at least {}, got {0}", MIN_PATH_LENGTH)]
    PathLengthTooShort(u32),
    /// The required path length bounds are inverted.
    #[error("gameplay.max_path_length ({max}) is below gameplay.min_path_length ({min})")]
    PathLengthRangeInverted {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// The flow speed is outside the supported range.
    #[error("gameplay.flow_speed must lie in {}..={}, got {0}", MIN_FLOW_SPEED, MAX_FLOW_SPEED)]
    FlowSpeedOutOfRange(f32),
    /// The placement delay is negative or not a number.
    #[error("gameplay.placement_delay_secs must be a non-negative number, got {0}")]
    InvalidPlacementDelay(f32),
    /// The placement delay does not fit in a duration.
    #[error("gameplay.placement_delay_secs is too large to represent, got {0}")]
    PlacementDelayTooLong(f32),
    /// The pipe queue is too short.
    #[error("gameplay.queue_size must be at least {}, got {0}", MIN_QUEUE_SIZE)]
    QueueTooShort(usize),
    /// The pipe weight table is empty.
    #[error("pipes must list at least one weighted pipe type")]
    NoPipeWeights,
    /// A pipe weight row carries a negative weight.
    #[error("pipe weight for `{pipe_type}` must be non-negative, got {weight}")]
    NegativePipeWeight {
        /// Registry name of the offending row.
        pipe_type: String,
        /// Configured weight.
        weight: f64,
    },
}
