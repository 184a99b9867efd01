use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Direction;

const STRAIGHT_CONNECTIONS: &[&[Direction]] = &[
    &[Direction::North, Direction::South],
    &[Direction::East, Direction::West],
];

const CURVED_CONNECTIONS: &[&[Direction]] = &[
    &[Direction::North, Direction::East],
    &[Direction::East, Direction::South],
    &[Direction::South, Direction::West],
    &[Direction::West, Direction::North],
];

const CROSS_CONNECTIONS: &[&[Direction]] = &[&[
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
]];

/// Clockwise rotation applied to a pipe, in quarter turns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// Unrotated.
    #[default]
    Deg0,
    /// One quarter turn.
    Deg90,
    /// Two quarter turns.
    Deg180,
    /// Three quarter turns.
    Deg270,
}

impl Rotation {
    /// Every rotation in increasing order.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Parses a rotation expressed in degrees. Only multiples of 90 below 360
    /// are accepted.
    #[must_use]
    pub const fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    /// Rotation expressed in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Rotation expressed in quarter turns.
    #[must_use]
    pub const fn quarter_turns(self) -> usize {
        self.degrees() as usize / 90
    }
}

/// Shape of a pipe segment, without its rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipeKind {
    /// Connects two opposite sides.
    Straight,
    /// Connects two adjacent sides.
    Curved,
    /// Connects all four sides; fluid passes straight through.
    Cross,
}

impl PipeKind {
    /// Every built-in pipe kind.
    pub const ALL: [PipeKind; 3] = [PipeKind::Straight, PipeKind::Curved, PipeKind::Cross];

    /// Stable name used by the pipe registry and the configuration layer.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Straight => "straight",
            Self::Curved => "curved",
            Self::Cross => "cross",
        }
    }

    /// Resolves a kind from its registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for PipeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable pipe segment that can be placed on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pipe {
    /// Straight segment; 0° runs north-south, 90° runs east-west.
    Straight {
        /// Rotation selecting the active connection pair.
        rotation: Rotation,
    },
    /// Curved segment; 0° joins north-east and each quarter turn moves clockwise.
    Curved {
        /// Rotation selecting the active connection pair.
        rotation: Rotation,
    },
    /// Four-way crossing. Rotation has no effect.
    Cross,
}

impl Pipe {
    /// Creates a straight pipe.
    #[must_use]
    pub const fn straight(rotation: Rotation) -> Self {
        Self::Straight { rotation }
    }

    /// Creates a curved pipe.
    #[must_use]
    pub const fn curved(rotation: Rotation) -> Self {
        Self::Curved { rotation }
    }

    /// Creates a cross pipe.
    #[must_use]
    pub const fn cross() -> Self {
        Self::Cross
    }

    /// Shape of the pipe.
    #[must_use]
    pub const fn kind(&self) -> PipeKind {
        match self {
            Self::Straight { .. } => PipeKind::Straight,
            Self::Curved { .. } => PipeKind::Curved,
            Self::Cross => PipeKind::Cross,
        }
    }

    /// Rotation of the pipe. Cross pipes always report [`Rotation::Deg0`].
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        match self {
            Self::Straight { rotation } | Self::Curved { rotation } => *rotation,
            Self::Cross => Rotation::Deg0,
        }
    }

    /// Connection sets of the pipe's shape, indexed by quarter turns.
    #[must_use]
    pub const fn connection_sets(&self) -> &'static [&'static [Direction]] {
        match self {
            Self::Straight { .. } => STRAIGHT_CONNECTIONS,
            Self::Curved { .. } => CURVED_CONNECTIONS,
            Self::Cross => CROSS_CONNECTIONS,
        }
    }

    /// Directions the pipe connects under its current rotation.
    ///
    /// Always two directions for straight and curved pipes, four for a cross.
    #[must_use]
    pub fn active_connections(&self) -> &'static [Direction] {
        let sets = self.connection_sets();
        sets[self.rotation().quarter_turns() % sets.len()]
    }

    /// Reports whether the pipe opens toward `direction`.
    #[must_use]
    pub fn has_connection(&self, direction: Direction) -> bool {
        self.active_connections().contains(&direction)
    }

    /// Side fluid leaves through after entering from `entry`.
    ///
    /// Returns `None` when the pipe has no connector on `entry`. Fluid never turns
    /// inside a cross pipe.
    #[must_use]
    pub fn exit_direction(&self, entry: Direction) -> Option<Direction> {
        if !self.has_connection(entry) {
            return None;
        }

        match self {
            Self::Cross => Some(entry.opposite()),
            Self::Straight { .. } | Self::Curved { .. } => self
                .active_connections()
                .iter()
                .copied()
                .find(|direction| *direction != entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Pipe, PipeKind, Rotation};
    use crate::Direction;

    fn every_pipe() -> Vec<Pipe> {
        let mut pipes = Vec::new();
        for rotation in Rotation::ALL {
            pipes.push(Pipe::straight(rotation));
            pipes.push(Pipe::curved(rotation));
        }
        pipes.push(Pipe::cross());
        pipes
    }

    #[test]
    fn connection_counts_match_shape() {
        for pipe in every_pipe() {
            let expected = match pipe.kind() {
                PipeKind::Cross => 4,
                PipeKind::Straight | PipeKind::Curved => 2,
            };
            assert_eq!(
                pipe.active_connections().len(),
                expected,
                "unexpected connector count for {pipe:?}",
            );
        }
    }

    #[test]
    fn exit_direction_is_symmetric_for_two_way_pipes() {
        for pipe in every_pipe()
            .into_iter()
            .filter(|pipe| pipe.kind() != PipeKind::Cross)
        {
            for entry in Direction::ALL {
                if let Some(exit) = pipe.exit_direction(entry) {
                    assert_eq!(pipe.exit_direction(exit), Some(entry), "{pipe:?}");
                }
            }
        }
    }

    #[test]
    fn cross_never_turns() {
        let cross = Pipe::cross();
        for entry in Direction::ALL {
            assert_eq!(cross.exit_direction(entry), Some(entry.opposite()));
        }
    }

    #[test]
    fn straight_rotation_selects_axis() {
        let vertical = Pipe::straight(Rotation::Deg0);
        let horizontal = Pipe::straight(Rotation::Deg90);
        assert_eq!(
            vertical.active_connections(),
            &[Direction::North, Direction::South]
        );
        assert_eq!(
            horizontal.active_connections(),
            &[Direction::East, Direction::West]
        );
        assert_eq!(
            Pipe::straight(Rotation::Deg180).active_connections(),
            vertical.active_connections()
        );
    }

    #[test]
    fn curved_rotation_turns_clockwise() {
        let curve = Pipe::curved(Rotation::Deg90);
        assert_eq!(curve.exit_direction(Direction::South), Some(Direction::East));
        assert_eq!(curve.exit_direction(Direction::North), None);
        assert_eq!(
            Pipe::curved(Rotation::Deg270).active_connections(),
            &[Direction::West, Direction::North]
        );
    }

    #[test]
    fn rotation_parses_quarter_turns_only() {
        assert_eq!(Rotation::from_degrees(180), Some(Rotation::Deg180));
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(360), None);
        for rotation in Rotation::ALL {
            assert_eq!(Rotation::from_degrees(rotation.degrees()), Some(rotation));
        }
    }

    #[test]
    fn kind_names_resolve() {
        for kind in PipeKind::ALL {
            assert_eq!(PipeKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(PipeKind::from_name("spiral"), None);
    }
}
