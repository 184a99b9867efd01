#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted pipe supply backed by an explicit registry of pipe constructors.
//!
//! The [`PipeRegistry`] maps stable type names to constructor functions. The
//! [`PipeFactory`] combines a registry with a weight table and draws pipes for
//! the session queue. Both are plain values; nothing here is global.

use pipeflow_core::{Pipe, PipeKind, PipeWeight, Rotation};
use rand::{Rng, RngCore};
use thiserror::Error;

/// Function that builds a pipe, drawing any randomness from the provided source.
pub type PipeConstructor = fn(&mut dyn RngCore) -> Pipe;

const STRAIGHT_ROTATIONS: [Rotation; 2] = [Rotation::Deg0, Rotation::Deg90];

/// Failures raised while building or using the pipe supply.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PipeFactoryError {
    /// No constructor is registered under the requested name.
    #[error("pipe type `{0}` is not registered")]
    UnregisteredPipeType(String),
    /// Every row of the weight table was dropped.
    #[error("pipe weight table has no positive weight for a registered type")]
    NoUsableWeights,
    /// The weights do not sum to a finite number.
    #[error("pipe weights sum to a non-finite total")]
    TotalWeightOverflow,
}

/// Name-indexed collection of pipe constructors, kept in registration order.
#[derive(Clone, Debug, Default)]
pub struct PipeRegistry {
    entries: Vec<(String, PipeConstructor)>,
}

impl PipeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the straight, curved and cross pipes.
    #[must_use]
    pub fn with_builtin_pipes() -> Self {
        let mut registry = Self::new();
        registry.register_builtin_pipes();
        registry
    }

    /// Registers the straight, curved and cross constructors in that order.
    pub fn register_builtin_pipes(&mut self) {
        self.register(PipeKind::Straight.name(), build_straight);
        self.register(PipeKind::Curved.name(), build_curved);
        self.register(PipeKind::Cross.name(), build_cross);
    }

    /// Registers `constructor` under `name`, replacing an earlier registration in place.
    pub fn register(&mut self, name: impl Into<String>, constructor: PipeConstructor) {
        let name = name.into();
        if let Some(entry) = self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            log::warn!("pipe type `{name}` registered twice; keeping the latest constructor");
            entry.1 = constructor;
            return;
        }
        self.entries.push((name, constructor));
    }

    /// Reports whether a constructor exists for `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructor(name).is_some()
    }

    /// Builds a pipe of the named type.
    pub fn create(&self, name: &str, rng: &mut dyn RngCore) -> Result<Pipe, PipeFactoryError> {
        let constructor = self
            .constructor(name)
            .ok_or_else(|| PipeFactoryError::UnregisteredPipeType(name.to_owned()))?;
        Ok(constructor(rng))
    }

    /// Registered names in registration order.
    pub fn registered_types(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    fn constructor(&self, name: &str) -> Option<PipeConstructor> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, constructor)| *constructor)
    }
}

fn build_straight(rng: &mut dyn RngCore) -> Pipe {
    Pipe::straight(STRAIGHT_ROTATIONS[rng.gen_range(0..STRAIGHT_ROTATIONS.len())])
}

fn build_curved(rng: &mut dyn RngCore) -> Pipe {
    Pipe::curved(Rotation::ALL[rng.gen_range(0..Rotation::ALL.len())])
}

fn build_cross(_rng: &mut dyn RngCore) -> Pipe {
    Pipe::cross()
}

#[derive(Clone, Debug)]
struct WeightedType {
    row: PipeWeight,
    constructor: PipeConstructor,
}

/// Draws pipes at random according to a weight table.
#[derive(Clone, Debug)]
pub struct PipeFactory {
    table: Vec<WeightedType>,
    weights: Vec<PipeWeight>,
    total_weight: f64,
    fallback: PipeConstructor,
}

impl PipeFactory {
    /// Builds a factory from `weights`, resolving every type through `registry`.
    ///
    /// Rows with a non-positive weight or an unknown type are dropped with a
    /// warning. A type listed twice keeps its first position and its last weight.
    pub fn new(registry: &PipeRegistry, weights: &[PipeWeight]) -> Result<Self, PipeFactoryError> {
        let mut table: Vec<WeightedType> = Vec::with_capacity(weights.len());

        for row in weights {
            if !(row.weight.is_finite() && row.weight > 0.0) {
                log::warn!(
                    "ignoring pipe type `{}` with unusable weight {}",
                    row.pipe_type,
                    row.weight
                );
                continue;
            }
            let Some(constructor) = registry.constructor(&row.pipe_type) else {
                log::warn!("ignoring unregistered pipe type `{}`", row.pipe_type);
                continue;
            };

            if let Some(existing) = table
                .iter_mut()
                .find(|entry| entry.row.pipe_type == row.pipe_type)
            {
                log::warn!(
                    "pipe type `{}` weighted twice; using weight {}",
                    row.pipe_type,
                    row.weight
                );
                existing.row.weight = row.weight;
                continue;
            }
            table.push(WeightedType {
                row: row.clone(),
                constructor,
            });
        }

        if table.is_empty() {
            return Err(PipeFactoryError::NoUsableWeights);
        }
        // A usable row implies a registered type, so the registry has a head.
        let Some(&(_, fallback)) = registry.entries.first() else {
            return Err(PipeFactoryError::NoUsableWeights);
        };
        let total_weight: f64 = table.iter().map(|entry| entry.row.weight).sum();
        if !total_weight.is_finite() {
            return Err(PipeFactoryError::TotalWeightOverflow);
        }

        let weights = table.iter().map(|entry| entry.row.clone()).collect();
        log::debug!("pipe factory ready with {} types, total weight {total_weight}", table.len());
        Ok(Self {
            table,
            weights,
            total_weight,
            fallback,
        })
    }

    /// Sum of every usable weight.
    #[must_use]
    pub const fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Usable weight rows in draw order.
    #[must_use]
    pub fn weights(&self) -> &[PipeWeight] {
        &self.weights
    }

    /// Draws a pipe, choosing its type in proportion to the configured weights.
    ///
    /// If rounding leaves the roll unconsumed, the first registered type is built.
    pub fn create_random_pipe<R>(&self, rng: &mut R) -> Pipe
    where
        R: Rng + ?Sized,
    {
        let constructor = self.constructor_for_roll(rng.gen_range(0.0..self.total_weight));
        let mut rng = rng;
        constructor(&mut rng)
    }

    fn constructor_for_roll(&self, mut roll: f64) -> PipeConstructor {
        self.table
            .iter()
            .find(|entry| {
                roll -= entry.row.weight;
                roll <= 0.0
            })
            .map_or(self.fallback, |entry| entry.constructor)
    }
}
