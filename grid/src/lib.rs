#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Pipeflow.
//!
//! The [`Grid`] owns every [`Cell`] and is the only place where the kind of a
//! cell changes. Systems read it through shared references and mutate fluid
//! bookkeeping through [`Grid::cell_mut`].

mod cell;

use pipeflow_core::{Direction, Pipe, Position};

pub use cell::{Cell, CellKind};

/// Fixed-size, row-major board of cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a board of `width × height` empty cells.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: empty_cells(width, height),
        }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Reports whether the position lies on the board.
    #[must_use]
    pub const fn is_valid_position(&self, position: Position) -> bool {
        position.row() < self.height && position.col() < self.width
    }

    /// Cell at `position`, or `None` outside the board.
    #[must_use]
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.index(position).and_then(|index| self.cells.get(index))
    }

    /// Mutable access to the fluid state of the cell at `position`.
    pub fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        let index = self.index(position)?;
        self.cells.get_mut(index)
    }

    /// Turns the cell into an obstacle, discarding whatever it held.
    pub fn set_blocked(&mut self, position: Position) {
        self.replace(position, CellKind::Blocked);
    }

    /// Turns the cell into the fluid source, discarding whatever it held.
    pub fn set_start(&mut self, position: Position) {
        self.replace(position, CellKind::Start);
    }

    /// Places `pipe` at `position`.
    ///
    /// Returns `false` and leaves the board untouched when the position is off
    /// the board or the cell cannot take a pipe.
    pub fn place_pipe(&mut self, position: Position, pipe: Pipe) -> bool {
        let Some(cell) = self.cell(position) else {
            return false;
        };
        if !cell.can_place_pipe() {
            log::debug!("rejected {} pipe at {position:?}", pipe.kind());
            return false;
        }

        self.replace(position, CellKind::Pipe(pipe));
        true
    }

    /// Cell adjacent to `position` in `direction`, or `None` past the edge.
    #[must_use]
    pub fn neighbor(&self, position: Position, direction: Direction) -> Option<&Cell> {
        self.neighbor_position(position, direction)
            .and_then(|neighbor| self.cell(neighbor))
    }

    /// Position adjacent to `position` in `direction`, or `None` past the edge.
    #[must_use]
    pub fn neighbor_position(&self, position: Position, direction: Direction) -> Option<Position> {
        position
            .step(direction)
            .filter(|neighbor| self.is_valid_position(*neighbor))
    }

    /// Direction pointing the other way.
    #[must_use]
    pub const fn opposite_direction(&self, direction: Direction) -> Direction {
        direction.opposite()
    }

    /// Visits every cell in row-major order.
    pub fn for_each_cell<F>(&self, mut visitor: F)
    where
        F: FnMut(&Cell),
    {
        for cell in &self.cells {
            visitor(cell);
        }
    }

    /// Iterator over every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Removes all pipes and fluid while keeping obstacles and the start cell.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            match cell.kind() {
                CellKind::Blocked | CellKind::Start => cell.clear_water(),
                CellKind::Empty | CellKind::Pipe(_) => {
                    *cell = Cell::new(cell.position(), CellKind::Empty);
                }
            }
        }
    }

    /// Turns every cell back into an empty slot.
    pub fn clear(&mut self) {
        self.cells = empty_cells(self.width, self.height);
    }

    fn replace(&mut self, position: Position, kind: CellKind) {
        if let Some(cell) = self.cell_mut(position) {
            *cell = Cell::new(position, kind);
        }
    }

    fn index(&self, position: Position) -> Option<usize> {
        if !self.is_valid_position(position) {
            return None;
        }
        let row = usize::try_from(position.row()).ok()?;
        let col = usize::try_from(position.col()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        Some(row * width + col)
    }
}

fn empty_cells(width: u32, height: u32) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(width as usize * height as usize);
    for row in 0..height {
        for col in 0..width {
            cells.push(Cell::new(Position::new(row, col), CellKind::Empty));
        }
    }
    cells
}

/// Query functions that summarise the board without mutating it.
pub mod query {
    use pipeflow_core::Position;

    use super::Grid;

    /// Position of the start cell, if one has been placed.
    #[must_use]
    pub fn start_position(grid: &Grid) -> Option<Position> {
        grid.cells()
            .find(|cell| cell.is_start())
            .map(|cell| cell.position())
    }

    /// Positions of every obstacle in row-major order.
    #[must_use]
    pub fn blocked_positions(grid: &Grid) -> Vec<Position> {
        grid.cells()
            .filter(|cell| cell.is_blocked())
            .map(|cell| cell.position())
            .collect()
    }

    /// Number of cells currently holding a pipe.
    #[must_use]
    pub fn pipe_count(grid: &Grid) -> usize {
        grid.cells().filter(|cell| cell.has_pipe()).count()
    }

    /// Positions of every cell fluid has entered, in row-major order.
    #[must_use]
    pub fn wet_positions(grid: &Grid) -> Vec<Position> {
        grid.cells()
            .filter(|cell| cell.has_water())
            .map(|cell| cell.position())
            .collect()
    }
}
