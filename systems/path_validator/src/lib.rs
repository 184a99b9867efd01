#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Directional connectivity resolver for the pipe network.
//!
//! Every query is a pure function of the grid. [`PathValidator::next_cell`]
//! answers where live fluid goes next, while
//! [`PathValidator::find_connected_path`] traces the whole network from the start
//! cell without touching fluid state.

use std::collections::HashMap;

use pipeflow_core::{Direction, DirectionSet, Position};
use pipeflow_grid::{Cell, Grid};

/// Cell the fluid moves into next and the side it enters through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextCell {
    /// Position of the cell to enter.
    pub position: Position,
    /// Side of that cell the fluid enters through.
    pub entry: Direction,
}

/// Stateless resolver that answers connectivity questions about a grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathValidator;

impl PathValidator {
    /// Creates a new validator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Cell the fluid starts from.
    #[must_use]
    pub fn start_cell<'grid>(&self, grid: &'grid Grid, start: Position) -> Option<&'grid Cell> {
        grid.cell(start)
    }

    /// Resolves the cell fluid flows into after leaving `current`.
    ///
    /// From the start cell every side is tried in north, east, south, west
    /// order. From a pipe cell the only candidate is the exit matching the entry
    /// of its most recent flow. A candidate qualifies when it holds a pipe with a
    /// connector facing back toward `current` that fluid has not used yet, so
    /// fully filled neighbours that refuse that entry are skipped.
    #[must_use]
    pub fn next_cell(&self, grid: &Grid, current: Position) -> Option<NextCell> {
        let cell = grid.cell(current)?;

        if cell.is_start() {
            return Direction::ALL
                .into_iter()
                .find_map(|direction| accepting_neighbor(grid, current, direction));
        }

        let pipe = cell.pipe()?;
        let latest = cell.water_flows().latest()?;
        let exit = pipe.exit_direction(latest.entry())?;
        accepting_neighbor(grid, current, exit)
    }

    /// Traces the pipe chain starting at `start` without touching fluid state.
    ///
    /// The returned positions begin with `start`. Fluid already present on the
    /// board is ignored; connectors are consumed as the trace passes them, so a
    /// cross pipe may be crossed once along each axis and closed loops end.
    #[must_use]
    pub fn find_connected_path(&self, grid: &Grid, start: Position) -> Vec<Position> {
        let Some(start_cell) = grid.cell(start) else {
            return Vec::new();
        };

        let mut path = vec![start];
        if !start_cell.is_start() {
            return path;
        }

        let mut used: HashMap<Position, DirectionSet> = HashMap::new();
        let mut step = Direction::ALL.into_iter().find_map(|direction| {
            traced_neighbor(grid, &used, start, direction)
        });

        while let Some(NextCell { position, entry }) = step {
            path.push(position);
            let Some(exit) = grid
                .cell(position)
                .and_then(Cell::pipe)
                .and_then(|pipe| pipe.exit_direction(entry))
            else {
                break;
            };

            let connectors = used.entry(position).or_default();
            connectors.insert(entry);
            connectors.insert(exit);
            step = traced_neighbor(grid, &used, position, exit);
        }

        log::debug!("traced path of {} cells from {start:?}", path.len());
        path
    }

    /// Number of cells the connected path covers after the start cell.
    #[must_use]
    pub fn path_length(&self, grid: &Grid, start: Position) -> u32 {
        let cells = self.find_connected_path(grid, start).len().saturating_sub(1);
        u32::try_from(cells).unwrap_or(u32::MAX)
    }
}

fn accepting_neighbor(grid: &Grid, from: Position, direction: Direction) -> Option<NextCell> {
    let position = grid.neighbor_position(from, direction)?;
    let neighbor = grid.cell(position)?;
    let entry = direction.opposite();

    let connects = neighbor
        .pipe()
        .is_some_and(|pipe| pipe.has_connection(entry));
    if !connects || !neighbor.can_enter_from_direction(entry) {
        return None;
    }
    Some(NextCell { position, entry })
}

fn traced_neighbor(
    grid: &Grid,
    used: &HashMap<Position, DirectionSet>,
    from: Position,
    direction: Direction,
) -> Option<NextCell> {
    let position = grid.neighbor_position(from, direction)?;
    let entry = direction.opposite();
    let connects = grid
        .cell(position)
        .and_then(Cell::pipe)
        .is_some_and(|pipe| pipe.has_connection(entry));
    let consumed = used
        .get(&position)
        .is_some_and(|connectors| connectors.contains(entry));

    (connects && !consumed).then_some(NextCell { position, entry })
}
