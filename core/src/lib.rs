#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pipeflow engine.
//!
//! This crate defines the value types and the message surface that connect the
//! authoritative grid, the pure simulation systems and the adapters. Adapters
//! submit [`Command`] values to a session, the session mutates the grid through
//! the systems, and every observable change is broadcast as an [`Event`] pushed
//! into a caller-supplied buffer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod config;
mod flow;
mod pipe;

pub use config::{
    ConfigError, GameConfig, GameplayConfig, GridConfig, PipeWeight, MAX_BLOCK_RATIO,
    MAX_FLOW_SPEED, MIN_FLOW_SPEED, MIN_GRID_DIMENSION, MIN_PATH_LENGTH, MIN_QUEUE_SIZE,
};
pub use flow::{FlowMap, WaterFlow};
pub use pipe::{Pipe, PipeKind, Rotation};

/// Cardinal directions through which fluid enters and leaves a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in canonical scan order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Returns the direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Position of the direction within [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    const fn bit(self) -> u8 {
        1 << self.index()
    }
}

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    row: u32,
    col: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Zero-based row index.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }

    /// Position one cell away in the provided direction.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant. Upper
    /// bounds are the grid's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (row, col) = match direction {
            Direction::North => (self.row.checked_sub(1)?, self.col),
            Direction::South => (self.row.checked_add(1)?, self.col),
            Direction::East => (self.row, self.col.checked_add(1)?),
            Direction::West => (self.row, self.col.checked_sub(1)?),
        };
        Some(Self::new(row, col))
    }
}

/// Compact set of directions, used to remember which connectors of a cell
/// fluid has already passed through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionSet {
    bits: u8,
}

impl DirectionSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Adds a direction to the set.
    pub fn insert(&mut self, direction: Direction) {
        self.bits |= direction.bit();
    }

    /// Reports whether the direction is part of the set.
    #[must_use]
    pub const fn contains(&self, direction: Direction) -> bool {
        self.bits & direction.bit() != 0
    }

    /// Number of directions in the set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Reports whether the set holds no directions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Removes every direction.
    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Iterates over the contained directions in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = Self::new();
        for direction in iter {
            set.insert(direction);
        }
        set
    }
}

/// Phases a game session moves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GamePhase {
    /// The board is being laid out.
    Setup,
    /// The player places pipes from the queue.
    Placement,
    /// Fluid advances through the placed pipes.
    Flowing,
    /// The fluid ran off the network and the outcome is known.
    GameOver,
}

/// Commands that express every input a session accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// The player selected a cell; places the head of the pipe queue there.
    ClickCell {
        /// Cell the player selected.
        position: Position,
    },
    /// Locks placement and arms the countdown before the fluid starts.
    StartPlacementTimer,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Resets the board and starts a new round.
    Reset,
}

/// Events broadcast after the grid or session state changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The visual state of a cell may have changed and should be redrawn.
    CellUpdated {
        /// Cell whose state changed.
        position: Position,
    },
    /// Fluid left the start cell.
    FlowStarted {
        /// Start cell the fluid originates from.
        start: Position,
    },
    /// Fluid ran off the connected network; emitted once per flow.
    FlowEnded {
        /// Number of cells the fluid entered after leaving the start cell.
        path_length: u32,
    },
    /// A pipe from the queue was placed on the grid.
    PipePlaced {
        /// Cell that received the pipe.
        position: Position,
        /// Pipe that was placed.
        pipe: Pipe,
    },
    /// The queue of upcoming pipes changed.
    QueueUpdated {
        /// Upcoming pipes, head first.
        queue: Vec<Pipe>,
    },
    /// The session entered a new phase.
    PhaseChanged {
        /// Phase that became active.
        phase: GamePhase,
    },
    /// The session finished and the outcome is known.
    GameOver {
        /// Indicates whether the fluid travelled at least the required length.
        won: bool,
        /// Number of cells the fluid travelled.
        path_length: u32,
        /// Number of cells required to win this round.
        required_length: u32,
    },
}
