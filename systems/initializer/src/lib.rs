#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Level generation: scatters obstacles across a board and picks the start cell.

use pipeflow_core::{Direction, Position, MAX_BLOCK_RATIO};
use pipeflow_grid::Grid;
use rand::Rng;
use thiserror::Error;

/// Default cap on samples drawn by each rejection loop.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100_000;

/// Configuration parameters required to construct the initializer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    block_ratio: f64,
    max_attempts: u32,
}

impl Config {
    /// Creates a configuration with the provided share of blocked cells.
    #[must_use]
    pub const fn new(block_ratio: f64) -> Self {
        Self {
            block_ratio,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides how many samples each rejection loop may draw.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Failures raised while laying out a board.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum InitializationError {
    /// The blocked-cell share is negative, too large or not a number.
    #[error("block ratio must lie in 0..={}, got {0}", MAX_BLOCK_RATIO)]
    InvalidBlockRatio(f64),
    /// The board cannot host a start cell with a southern neighbour.
    #[error("grid of {width}x{height} is too small to host a start cell")]
    GridTooSmall {
        /// Board width.
        width: u32,
        /// Board height.
        height: u32,
    },
    /// Obstacle sampling ran out of attempts.
    #[error("placed {placed} of {required} blocked cells before running out of attempts")]
    BlockedPlacementExhausted {
        /// Obstacles placed before giving up.
        placed: usize,
        /// Obstacles the layout called for.
        required: usize,
    },
    /// No eligible start cell was sampled within the attempt cap.
    #[error("no start cell found within {attempts} attempts")]
    StartPlacementExhausted {
        /// Samples drawn before giving up.
        attempts: u32,
    },
}

/// Lays out obstacles and the start cell on a board.
#[derive(Clone, Debug)]
pub struct GridInitializer {
    block_ratio: f64,
    max_attempts: u32,
}

impl GridInitializer {
    /// Creates a new initializer using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            block_ratio: config.block_ratio,
            max_attempts: config.max_attempts,
        }
    }

    /// Share of cells turned into obstacles.
    #[must_use]
    pub const fn block_ratio(&self) -> f64 {
        self.block_ratio
    }

    /// Number of obstacles a board of the given size receives.
    #[must_use]
    pub fn blocked_count(&self, width: u32, height: u32) -> usize {
        (f64::from(width) * f64::from(height) * self.block_ratio).floor() as usize
    }

    /// Clears `grid`, scatters obstacles and marks the start cell.
    ///
    /// The start cell always sits above the bottom row and never has an
    /// obstacle directly to its south. Identical RNG streams produce identical
    /// layouts.
    pub fn initialize<R>(&self, grid: &mut Grid, rng: &mut R) -> Result<Position, InitializationError>
    where
        R: Rng + ?Sized,
    {
        if !(0.0..=MAX_BLOCK_RATIO).contains(&self.block_ratio) {
            return Err(InitializationError::InvalidBlockRatio(self.block_ratio));
        }
        if grid.width() < 1 || grid.height() < 2 {
            return Err(InitializationError::GridTooSmall {
                width: grid.width(),
                height: grid.height(),
            });
        }

        grid.clear();
        self.place_blocked_cells(grid, rng)?;
        let start = self.place_start(grid, rng)?;

        log::info!(
            "laid out {}x{} board with {} obstacles, start at {start:?}",
            grid.width(),
            grid.height(),
            self.blocked_count(grid.width(), grid.height()),
        );
        Ok(start)
    }

    fn place_blocked_cells<R>(&self, grid: &mut Grid, rng: &mut R) -> Result<(), InitializationError>
    where
        R: Rng + ?Sized,
    {
        let required = self.blocked_count(grid.width(), grid.height());
        let mut placed = 0;
        let mut attempts = 0;

        while placed < required {
            if attempts >= self.max_attempts {
                return Err(InitializationError::BlockedPlacementExhausted { placed, required });
            }
            attempts += 1;

            let position = Position::new(
                rng.gen_range(0..grid.height()),
                rng.gen_range(0..grid.width()),
            );
            if grid.cell(position).is_some_and(|cell| cell.is_empty()) {
                grid.set_blocked(position);
                placed += 1;
            }
        }

        log::debug!("placed {placed} obstacles in {attempts} samples");
        Ok(())
    }

    fn place_start<R>(&self, grid: &mut Grid, rng: &mut R) -> Result<Position, InitializationError>
    where
        R: Rng + ?Sized,
    {
        let max_row = grid.height() - 2;
        for _ in 0..self.max_attempts {
            let position = Position::new(
                rng.gen_range(0..=max_row),
                rng.gen_range(0..grid.width()),
            );
            if is_eligible_start(grid, position) {
                grid.set_start(position);
                return Ok(position);
            }
        }

        Err(InitializationError::StartPlacementExhausted {
            attempts: self.max_attempts,
        })
    }
}

fn is_eligible_start(grid: &Grid, position: Position) -> bool {
    let empty = grid.cell(position).is_some_and(|cell| cell.is_empty());
    let south_open = grid
        .neighbor(position, Direction::South)
        .is_some_and(|cell| !cell.is_blocked());
    empty && south_open
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn blocked_count_rounds_down() {
        let initializer = GridInitializer::new(Config::new(0.15));
        assert_eq!(initializer.blocked_count(9, 7), 9);
        assert_eq!(initializer.blocked_count(5, 5), 3);
        assert_eq!(GridInitializer::new(Config::new(0.0)).blocked_count(9, 7), 0);
    }

    #[test]
    fn out_of_range_ratio_is_rejected_before_touching_the_grid() {
        let mut grid = Grid::new(5, 5);
        grid.set_blocked(Position::new(0, 0));
        let before = grid.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = GridInitializer::new(Config::new(0.75)).initialize(&mut grid, &mut rng);

        assert_eq!(result, Err(InitializationError::InvalidBlockRatio(0.75)));
        assert_eq!(grid, before);
    }

    #[test]
    fn single_row_board_is_too_small() {
        let mut grid = Grid::new(5, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(
            GridInitializer::new(Config::new(0.0)).initialize(&mut grid, &mut rng),
            Err(InitializationError::GridTooSmall {
                width: 5,
                height: 1
            })
        );
    }
}
