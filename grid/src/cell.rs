use pipeflow_core::{Direction, DirectionSet, FlowMap, Pipe, Position};

/// Variant state of a grid slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellKind {
    /// Free slot that accepts a pipe.
    Empty,
    /// Obstacle; never accepts a pipe or fluid.
    Blocked,
    /// Source the fluid starts from. Never holds fluid itself.
    Start,
    /// Slot occupied by a placed pipe.
    Pipe(Pipe),
}

/// Single addressable grid slot together with its fluid occupancy.
///
/// The kind of a cell only changes through [`Grid`](crate::Grid); a mutable cell
/// reference exposes fluid bookkeeping alone.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    position: Position,
    kind: CellKind,
    flows: FlowMap,
    used: DirectionSet,
}

impl Cell {
    pub(crate) fn new(position: Position, kind: CellKind) -> Self {
        Self {
            position,
            kind,
            flows: FlowMap::new(),
            used: DirectionSet::new(),
        }
    }

    /// Coordinates of the cell.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Variant state of the cell.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Pipe occupying the cell, if any.
    #[must_use]
    pub const fn pipe(&self) -> Option<Pipe> {
        match self.kind {
            CellKind::Pipe(pipe) => Some(pipe),
            CellKind::Empty | CellKind::Blocked | CellKind::Start => None,
        }
    }

    /// Reports whether the slot is free.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.kind, CellKind::Empty)
    }

    /// Reports whether the slot is an obstacle.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        matches!(self.kind, CellKind::Blocked)
    }

    /// Reports whether the slot is the fluid source.
    #[must_use]
    pub const fn is_start(&self) -> bool {
        matches!(self.kind, CellKind::Start)
    }

    /// Reports whether a pipe occupies the slot.
    #[must_use]
    pub const fn has_pipe(&self) -> bool {
        matches!(self.kind, CellKind::Pipe(_))
    }

    /// Reports whether a pipe may be placed here.
    ///
    /// Only empty or pipe slots qualify, and fluid presence locks the slot.
    #[must_use]
    pub fn can_place_pipe(&self) -> bool {
        match self.kind {
            CellKind::Empty | CellKind::Pipe(_) => self.flows.is_empty(),
            CellKind::Blocked | CellKind::Start => false,
        }
    }

    /// Reports whether fluid may still pass through the connector on `direction`.
    #[must_use]
    pub const fn can_enter_from_direction(&self, direction: Direction) -> bool {
        !self.used.contains(direction)
    }

    /// Fluid occupancy records, one per entry direction.
    #[must_use]
    pub const fn water_flows(&self) -> &FlowMap {
        &self.flows
    }

    /// Reports whether any fluid entered the cell.
    #[must_use]
    pub const fn has_water(&self) -> bool {
        !self.flows.is_empty()
    }

    /// Connectors fluid has already passed through.
    #[must_use]
    pub const fn used_directions(&self) -> DirectionSet {
        self.used
    }

    /// Writes the fill level of the flow that entered through `entry`.
    pub fn set_water_level(&mut self, entry: Direction, level: f32) {
        self.flows.set_level(entry, level);
    }

    /// Raises every flow in the cell to a full level.
    pub fn fill_with_water(&mut self) {
        self.flows.fill();
    }

    /// Records that fluid passed through the connector on `direction`.
    pub fn mark_direction_used(&mut self, direction: Direction) {
        self.used.insert(direction);
    }

    pub(crate) fn clear_water(&mut self) {
        self.flows.clear();
        self.used.clear();
    }
}
