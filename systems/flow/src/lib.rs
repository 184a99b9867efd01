#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-driven fluid simulation that advances cell by cell along the pipe network.

use std::time::Duration;

use pipeflow_core::{Direction, Event, Position};
use pipeflow_grid::Grid;
use pipeflow_system_path_validator::PathValidator;

/// Lifecycle of a single flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlowState {
    /// No flow has been started since the last reset.
    #[default]
    Idle,
    /// Fluid is filling the current cell.
    Flowing,
    /// Fluid ran off the connected network.
    End,
}

/// State machine that moves fluid through the grid as time passes.
///
/// The system never decides the outcome of a round; it reports how many cells
/// the fluid entered through [`Event::FlowEnded`].
#[derive(Debug)]
pub struct FlowSystem {
    flow_speed: f32,
    validator: PathValidator,
    state: FlowState,
    current: Option<Position>,
    entry: Option<Direction>,
    progress: f32,
    completed_cells: u32,
}

impl FlowSystem {
    /// Creates an idle system that fills `flow_speed` cells per second.
    #[must_use]
    pub fn new(flow_speed: f32) -> Self {
        Self {
            flow_speed,
            validator: PathValidator::new(),
            state: FlowState::Idle,
            current: None,
            entry: None,
            progress: 0.0,
            completed_cells: 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> FlowState {
        self.state
    }

    /// Reports whether fluid is still moving.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == FlowState::Flowing
    }

    /// Cells the fluid entered after leaving the start cell.
    #[must_use]
    pub const fn completed_cells(&self) -> u32 {
        self.completed_cells
    }

    /// Cell currently being filled.
    #[must_use]
    pub const fn current(&self) -> Option<Position> {
        self.current
    }

    /// Fill progress of the current cell; reaches `1.0` right before advancing.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Cells filled per second.
    #[must_use]
    pub const fn flow_speed(&self) -> f32 {
        self.flow_speed
    }

    /// Releases fluid from `start` and moves it into the first connected cell.
    ///
    /// Ends immediately when no neighbour connects to the start cell.
    pub fn start(&mut self, grid: &mut Grid, start: Position, out: &mut Vec<Event>) {
        self.reset();
        self.state = FlowState::Flowing;
        self.current = Some(start);
        out.push(Event::FlowStarted { start });
        log::info!("flow started at {start:?}");

        self.advance_to_next_cell(grid, out);
    }

    /// Advances the fill of the current cell by `dt`.
    pub fn update(&mut self, grid: &mut Grid, dt: Duration, out: &mut Vec<Event>) {
        if self.state != FlowState::Flowing {
            return;
        }
        let (Some(position), Some(entry)) = (self.current, self.entry) else {
            return;
        };

        self.progress += dt.as_secs_f32() * self.flow_speed;
        if let Some(cell) = grid.cell_mut(position) {
            cell.set_water_level(entry, self.progress.clamp(0.0, 1.0));
        }
        out.push(Event::CellUpdated { position });

        if self.progress >= 1.0 {
            self.advance_to_next_cell(grid, out);
        }
    }

    /// Returns the system to [`FlowState::Idle`] without touching the grid.
    pub fn reset(&mut self) {
        self.state = FlowState::Idle;
        self.current = None;
        self.entry = None;
        self.progress = 0.0;
        self.completed_cells = 0;
    }

    fn advance_to_next_cell(&mut self, grid: &mut Grid, out: &mut Vec<Event>) {
        let Some(position) = self.current else {
            return;
        };

        if let Some(cell) = grid.cell_mut(position) {
            if let Some(pipe) = cell.pipe() {
                cell.fill_with_water();
                if let Some(entry) = self.entry {
                    cell.mark_direction_used(entry);
                    if let Some(exit) = pipe.exit_direction(entry) {
                        cell.mark_direction_used(exit);
                    }
                }
                out.push(Event::CellUpdated { position });
            }
        }

        let Some(next) = self.validator.next_cell(grid, position) else {
            self.state = FlowState::End;
            log::info!("flow ended after {} cells", self.completed_cells);
            out.push(Event::FlowEnded {
                path_length: self.completed_cells,
            });
            return;
        };

        if let Some(cell) = grid.cell_mut(next.position) {
            cell.set_water_level(next.entry, 0.0);
        }
        self.current = Some(next.position);
        self.entry = Some(next.entry);
        self.progress = 0.0;
        self.completed_cells += 1;
        log::debug!(
            "fluid entered {:?} from the {:?}",
            next.position,
            next.entry
        );
    }
}
