//! Grid simulation engine for the two-player airsoft arena.
//!
//! The engine owns everything physical about a match: the wall map, both
//! actors, live projectiles and the thrown smoke/flash effects. It knows
//! nothing about rewards, observations or who is learning; those live in
//! `airsoft-env`, which drives the engine exclusively through the
//! [`Simulation`] trait.
//!
//! - [`core`] - Plain data: geometry helpers, the [`ArenaMap`], [`Actor`]
//!   state and effect records
//! - [`engine`] - The [`Arena`] world implementing [`Simulation`], its
//!   [`ArenaConfig`] and raycasting
//!
//! # Example
//!
//! ```
//! use airsoft_engine::{Arena, Simulation};
//!
//! let mut arena = Arena::default();
//! assert_eq!(arena.turn(), 0);
//!
//! arena.fire_projectile();
//! arena.tick_projectiles();
//! arena.advance_turn();
//!
//! assert_eq!(arena.turn(), 1);
//! assert_eq!(arena.projectiles().len(), 1);
//! ```

use std::collections::BTreeSet;

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Number of actors in every match.
pub const ACTOR_COUNT: usize = 2;

/// Indices of the actors struck by a projectile during a hit test.
pub type HitSet = BTreeSet<usize>;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum MapError {
    #[display("map has no rows")]
    Empty,
    #[display("row {row} has width {width}, expected {expected}")]
    RaggedRow {
        row: usize,
        width: usize,
        expected: usize,
    },
    #[display("unknown map cell {cell:?} at row {row}, column {column}")]
    UnknownCell { cell: char, row: usize, column: usize },
    #[display("spawn point for actor {actor} is missing")]
    MissingSpawn { actor: usize },
    #[display("spawn point for actor {actor} is defined twice")]
    DuplicateSpawn { actor: usize },
}

/// Capability contract between the turn controller and a world implementation.
///
/// Mutating operations act on the actor whose turn it currently is
/// ([`Simulation::turn`]). The three tick operations advance world state by
/// one discrete step and do not depend on whose turn it is.
pub trait Simulation {
    /// Index of the actor that acts next.
    fn turn(&self) -> usize;

    /// Both actors, indexed by seat.
    fn actors(&self) -> &[Actor; ACTOR_COUNT];

    /// Projectiles still in flight, in firing order.
    fn projectiles(&self) -> &[Projectile];

    /// Smoke grenades, thrown or open.
    fn smokes(&self) -> &[Smoke];

    /// Flash grenades that have not detonated yet.
    fn flashes(&self) -> &[Flash];

    /// Magazine capacity of every actor.
    fn ammo_total(&self) -> u8;

    fn tick_projectiles(&mut self);
    fn tick_smoke(&mut self);
    fn tick_flash(&mut self);

    /// Moves the current actor by `(dx, dy)`, each component clamped to `[-1, 1]`.
    fn move_actor(&mut self, dx: f64, dy: f64);
    fn fire_projectile(&mut self);
    fn set_rotation(&mut self, degrees: f64);
    fn set_memory(&mut self, memory: ActorMemory);
    fn deploy_smoke(&mut self);
    fn deploy_flash(&mut self);

    /// Casts `sample_count` rays spread over `fov_degrees` centered on the
    /// facing of `actor`.
    fn raycast_fov(&self, actor: usize, fov_degrees: f64, sample_count: usize) -> Vec<RaySample>;

    /// Returns the actors overlapping a projectile fired by someone else.
    fn hit_test(&self) -> HitSet;

    fn advance_turn(&mut self);

    fn current_actor(&self) -> &Actor {
        &self.actors()[self.turn()]
    }
}
