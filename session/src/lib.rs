#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session orchestrator.
//!
//! A [`GameSession`] owns the grid, the systems and a seeded random stream. It
//! accepts [`Command`] values, runs the matching system and reports every
//! observable change as an [`Event`] pushed into the caller's buffer.

use std::{collections::VecDeque, time::Duration};

use pipeflow_core::{
    Command, ConfigError, Event, GameConfig, GamePhase, Pipe, Position,
};
use pipeflow_grid::Grid;
use pipeflow_system_flow::FlowSystem;
use pipeflow_system_initializer::{Config as InitializerConfig, GridInitializer, InitializationError};
use pipeflow_system_path_validator::PathValidator;
use pipeflow_system_pipe_factory::{PipeFactory, PipeFactoryError, PipeRegistry};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

/// Failures raised while building or (re)starting a session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SessionError {
    /// The configuration violates a bound.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The board could not be laid out.
    #[error("board layout failed: {0}")]
    Initialization(#[from] InitializationError),
    /// The pipe supply could not be built.
    #[error("pipe supply unavailable: {0}")]
    PipeFactory(#[from] PipeFactoryError),
}

/// Result of a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Indicates whether the fluid travelled at least the required length.
    pub won: bool,
    /// Number of cells the fluid entered after leaving the start cell.
    pub path_length: u32,
    /// Number of cells required to win.
    pub required_length: u32,
}

/// One game from board layout to outcome.
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    seed: u64,
    rng: ChaCha8Rng,
    grid: Grid,
    initializer: GridInitializer,
    factory: PipeFactory,
    validator: PathValidator,
    flow: FlowSystem,
    phase: GamePhase,
    start: Option<Position>,
    queue: VecDeque<Pipe>,
    required_path_length: u32,
    placement_locked: bool,
    placement_delay: Duration,
    placement_elapsed: Duration,
    outcome: Option<Outcome>,
}

impl GameSession {
    /// Builds a session in [`GamePhase::Setup`].
    ///
    /// The random stream is seeded from `config.seed`, or from entropy when no
    /// seed is configured. Call [`GameSession::start`] to lay out the board.
    pub fn new(config: GameConfig, registry: &PipeRegistry) -> Result<Self, SessionError> {
        config.validate()?;
        let placement_delay = config.gameplay.placement_delay()?;
        let factory = PipeFactory::new(registry, &config.pipes)?;

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("session seed {seed}");

        Ok(Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            grid: Grid::new(config.grid.width, config.grid.height),
            initializer: GridInitializer::new(InitializerConfig::new(config.gameplay.block_ratio)),
            factory,
            validator: PathValidator::new(),
            flow: FlowSystem::new(config.gameplay.flow_speed),
            phase: GamePhase::Setup,
            start: None,
            queue: VecDeque::with_capacity(config.gameplay.queue_size),
            required_path_length: 0,
            placement_locked: false,
            placement_delay,
            placement_elapsed: Duration::ZERO,
            outcome: None,
            config,
        })
    }

    /// Lays out the board, draws the required length and fills the queue.
    pub fn start(&mut self, out: &mut Vec<Event>) -> Result<(), SessionError> {
        self.set_phase(GamePhase::Setup, out);
        self.start = None;
        let start = self.initializer.initialize(&mut self.grid, &mut self.rng)?;
        self.start = Some(start);

        let gameplay = &self.config.gameplay;
        self.required_path_length = self
            .rng
            .gen_range(gameplay.min_path_length..=gameplay.max_path_length);

        self.fill_queue(out);
        self.set_phase(GamePhase::Placement, out);
        log::info!(
            "round started at {start:?}, {} cells required",
            self.required_path_length
        );
        Ok(())
    }

    /// Places the head of the queue at `position`.
    ///
    /// Returns `false` without side effects outside the placement phase, once
    /// the placement timer runs, or when the cell cannot take a pipe.
    pub fn handle_cell_click(&mut self, position: Position, out: &mut Vec<Event>) -> bool {
        if self.phase != GamePhase::Placement || self.placement_locked {
            return false;
        }
        if !self
            .grid
            .cell(position)
            .is_some_and(|cell| cell.can_place_pipe())
        {
            return false;
        }
        let Some(pipe) = self.queue.pop_front() else {
            return false;
        };

        if !self.grid.place_pipe(position, pipe) {
            self.queue.push_front(pipe);
            return false;
        }
        out.push(Event::PipePlaced { position, pipe });
        out.push(Event::CellUpdated { position });

        self.queue
            .push_back(self.factory.create_random_pipe(&mut self.rng));
        self.emit_queue(out);
        log::debug!("placed {} pipe at {position:?}", pipe.kind());
        true
    }

    /// Locks placement and arms the countdown before the fluid starts.
    pub fn start_placement_timer(&mut self) {
        if self.phase != GamePhase::Placement || self.placement_locked {
            return;
        }
        self.placement_locked = true;
        self.placement_elapsed = Duration::ZERO;
        log::info!(
            "placement locked; fluid starts in {:?}",
            self.placement_delay
        );
    }

    /// Advances the placement countdown or the fluid by `dt`.
    pub fn update(&mut self, dt: Duration, out: &mut Vec<Event>) {
        match self.phase {
            GamePhase::Placement if self.placement_locked => {
                self.placement_elapsed += dt;
                if self.placement_elapsed >= self.placement_delay {
                    self.start_flow(out);
                }
            }
            GamePhase::Flowing => {
                let first_new = out.len();
                self.flow.update(&mut self.grid, dt, out);
                self.finish_if_ended(first_new, out);
            }
            GamePhase::Setup | GamePhase::Placement | GamePhase::GameOver => {}
        }
    }

    /// Executes a single command.
    pub fn apply(&mut self, command: Command, out: &mut Vec<Event>) -> Result<(), SessionError> {
        match command {
            Command::ClickCell { position } => {
                let _ = self.handle_cell_click(position, out);
            }
            Command::StartPlacementTimer => self.start_placement_timer(),
            Command::Tick { dt } => self.update(dt, out),
            Command::Reset => self.reset(out)?,
        }
        Ok(())
    }

    /// Clears pipes and fluid and starts a new round with a fresh layout.
    pub fn reset(&mut self, out: &mut Vec<Event>) -> Result<(), SessionError> {
        self.grid.reset();
        self.flow.reset();
        self.queue.clear();
        self.placement_locked = false;
        self.placement_elapsed = Duration::ZERO;
        self.outcome = None;
        self.start(out)
    }

    /// Authoritative board.
    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Active phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Upcoming pipes, head first.
    pub fn queue(&self) -> impl Iterator<Item = &Pipe> {
        self.queue.iter()
    }

    /// Cells the fluid must travel to win this round.
    #[must_use]
    pub const fn required_path_length(&self) -> u32 {
        self.required_path_length
    }

    /// Length of the pipe chain currently connected to the start cell.
    #[must_use]
    pub fn current_path_length(&self) -> u32 {
        self.start
            .map_or(0, |start| self.validator.path_length(&self.grid, start))
    }

    /// Start cell of the current layout.
    #[must_use]
    pub const fn start_position(&self) -> Option<Position> {
        self.start
    }

    /// Result of the round once the fluid stopped.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Seed the random stream was created from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Reports whether pipes may still be placed.
    #[must_use]
    pub fn placement_open(&self) -> bool {
        self.phase == GamePhase::Placement && !self.placement_locked
    }

    /// Fluid simulation driving the current round.
    #[must_use]
    pub const fn flow(&self) -> &FlowSystem {
        &self.flow
    }

    /// Configuration the session was built from.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    fn start_flow(&mut self, out: &mut Vec<Event>) {
        let Some(start) = self.start else {
            return;
        };
        self.set_phase(GamePhase::Flowing, out);
        let first_new = out.len();
        self.flow.start(&mut self.grid, start, out);
        self.finish_if_ended(first_new, out);
    }

    fn finish_if_ended(&mut self, first_new: usize, out: &mut Vec<Event>) {
        let ended = out[first_new..].iter().find_map(|event| match event {
            Event::FlowEnded { path_length } => Some(*path_length),
            _ => None,
        });
        let Some(path_length) = ended else {
            return;
        };

        let outcome = Outcome {
            won: path_length >= self.required_path_length,
            path_length,
            required_length: self.required_path_length,
        };
        self.outcome = Some(outcome);
        self.set_phase(GamePhase::GameOver, out);
        out.push(Event::GameOver {
            won: outcome.won,
            path_length: outcome.path_length,
            required_length: outcome.required_length,
        });
        log::info!(
            "round over: {} with {path_length} of {} cells",
            if outcome.won { "won" } else { "lost" },
            outcome.required_length
        );
    }

    fn fill_queue(&mut self, out: &mut Vec<Event>) {
        self.queue.clear();
        for _ in 0..self.config.gameplay.queue_size {
            self.queue
                .push_back(self.factory.create_random_pipe(&mut self.rng));
        }
        self.emit_queue(out);
    }

    fn emit_queue(&self, out: &mut Vec<Event>) {
        out.push(Event::QueueUpdated {
            queue: self.queue.iter().copied().collect(),
        });
    }

    fn set_phase(&mut self, phase: GamePhase, out: &mut Vec<Event>) {
        if self.phase == phase {
            return;
        }
        self.phase = phase;
        out.push(Event::PhaseChanged { phase });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config(seed: u64) -> GameConfig {
        GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        }
    }

    #[test]
    fn new_session_waits_in_setup() {
        let registry = PipeRegistry::with_builtin_pipes();
        let session = GameSession::new(seeded_config(3), &registry).expect("session builds");
        assert_eq!(session.phase(), GamePhase::Setup);
        assert_eq!(session.seed(), 3);
        assert_eq!(session.start_position(), None);
        assert_eq!(session.current_path_length(), 0);
        assert_eq!(session.queue().count(), 0);
    }

    #[test]
    fn clicks_before_start_are_ignored() {
        let registry = PipeRegistry::with_builtin_pipes();
        let mut session = GameSession::new(seeded_config(3), &registry).expect("session builds");
        let mut events = Vec::new();
        assert!(!session.handle_cell_click(Position::new(0, 0), &mut events));
        assert!(events.is_empty());
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let registry = PipeRegistry::with_builtin_pipes();
        let mut config = seeded_config(1);
        config.gameplay.queue_size = 1;
        assert!(matches!(
            GameSession::new(config, &registry),
            Err(SessionError::Config(ConfigError::QueueTooShort(1)))
        ));
    }

    #[test]
    fn unrepresentable_delay_is_reported() {
        let registry = PipeRegistry::with_builtin_pipes();
        let mut config = seeded_config(1);
        config.gameplay.placement_delay_secs = 1.0e30;
        assert!(matches!(
            GameSession::new(config, &registry),
            Err(SessionError::Config(ConfigError::PlacementDelayTooLong(_)))
        ));
    }

    #[test]
    fn failed_layout_forgets_the_previous_start() {
        let registry = PipeRegistry::with_builtin_pipes();
        let mut session = GameSession::new(seeded_config(5), &registry).expect("session builds");
        let mut events = Vec::new();
        session.start(&mut events).expect("round starts");
        assert!(session.start_position().is_some());

        session.initializer = GridInitializer::new(InitializerConfig::new(0.9));
        assert!(matches!(
            session.start(&mut events),
            Err(SessionError::Initialization(
                InitializationError::InvalidBlockRatio(_)
            ))
        ));
        assert_eq!(session.start_position(), None);
        assert_eq!(session.current_path_length(), 0);
    }

    #[test]
    fn empty_registry_is_reported() {
        let registry = PipeRegistry::new();
        assert!(matches!(
            GameSession::new(seeded_config(1), &registry),
            Err(SessionError::PipeFactory(PipeFactoryError::NoUsableWeights))
        ));
    }
}
