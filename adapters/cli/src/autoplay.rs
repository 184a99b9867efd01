use pipeflow_core::{Pipe, Position};
use pipeflow_grid::Grid;
use pipeflow_session::GameSession;
use pipeflow_system_path_validator::PathValidator;

/// Greedy placement strategy that tries to extend the connected path.
#[derive(Debug, Default)]
pub(crate) struct AutoPlayer {
    validator: PathValidator,
}

impl AutoPlayer {
    /// Picks the cell for the head of the queue.
    ///
    /// Prefers the placement that lengthens the path the most. When the head
    /// cannot extend it, the pipe is parked on an empty cell that leaves the path
    /// unchanged. Returns `None` when neither is possible.
    pub(crate) fn choose(&self, session: &GameSession) -> Option<Position> {
        let start = session.start_position()?;
        let pipe = *session.queue().next()?;
        let grid = session.grid();
        let current = self.validator.path_length(grid, start);

        let mut best: Option<(u32, Position)> = None;
        let mut parking = None;
        for cell in grid.cells().filter(|cell| cell.can_place_pipe()) {
            let position = cell.position();
            let length = self.length_with(grid, start, position, pipe);
            if length > current && best.map_or(true, |(longest, _)| length > longest) {
                best = Some((length, position));
            }
            if parking.is_none() && cell.is_empty() && length == current {
                parking = Some(position);
            }
        }

        best.map(|(_, position)| position).or(parking)
    }

    fn length_with(&self, grid: &Grid, start: Position, position: Position, pipe: Pipe) -> u32 {
        let mut trial = grid.clone();
        if !trial.place_pipe(position, pipe) {
            return 0;
        }
        self.validator.path_length(&trial, start)
    }
}
