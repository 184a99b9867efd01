use crate::Direction;

/// Fluid occupancy of a cell for a single entry direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterFlow {
    level: f32,
    entry: Direction,
}

impl WaterFlow {
    /// Fill level in `[0, 1]`.
    #[must_use]
    pub const fn level(&self) -> f32 {
        self.level
    }

    /// Side the fluid entered the cell through.
    #[must_use]
    pub const fn entry(&self) -> Direction {
        self.entry
    }

    /// Reports whether the flow reached the far side of the cell.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.level >= 1.0
    }
}

/// Fixed-capacity map from entry direction to fill level.
///
/// Holds at most one flow per direction and remembers insertion order so the
/// most recent entry can be recovered.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowMap {
    levels: [f32; 4],
    order: [Direction; 4],
    len: usize,
}

impl Default for FlowMap {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowMap {
    /// Creates an empty map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            levels: [0.0; 4],
            order: Direction::ALL,
            len: 0,
        }
    }

    /// Number of recorded flows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Reports whether no flow has been recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reports whether a flow entered through `entry`.
    #[must_use]
    pub fn contains(&self, entry: Direction) -> bool {
        self.entries().contains(&entry)
    }

    /// Flow recorded for `entry`, if any.
    #[must_use]
    pub fn get(&self, entry: Direction) -> Option<WaterFlow> {
        self.contains(entry).then(|| WaterFlow {
            level: self.levels[entry.index()],
            entry,
        })
    }

    /// Most recently recorded flow.
    #[must_use]
    pub fn latest(&self) -> Option<WaterFlow> {
        self.entries()
            .last()
            .and_then(|entry| self.get(*entry))
    }

    /// Sets the fill level for `entry`, recording a new flow when none exists.
    ///
    /// Levels are clamped into `[0, 1]`; NaN is treated as empty.
    pub fn set_level(&mut self, entry: Direction, level: f32) {
        if !self.contains(entry) {
            self.order[self.len] = entry;
            self.len += 1;
        }
        self.levels[entry.index()] = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        };
    }

    /// Raises every recorded flow to a full level.
    pub fn fill(&mut self) {
        for index in 0..self.len {
            self.levels[self.order[index].index()] = 1.0;
        }
    }

    /// Reports whether at least one flow exists and every flow is full.
    #[must_use]
    pub fn is_fully_filled(&self) -> bool {
        !self.is_empty() && self.iter().all(|flow| flow.is_full())
    }

    /// Iterates over the recorded flows in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = WaterFlow> + '_ {
        self.entries().iter().map(|entry| WaterFlow {
            level: self.levels[entry.index()],
            entry: *entry,
        })
    }

    /// Forgets every recorded flow.
    pub fn clear(&mut self) {
        self.levels = [0.0; 4];
        self.len = 0;
    }

    fn entries(&self) -> &[Direction] {
        &self.order[..self.len]
    }
}
