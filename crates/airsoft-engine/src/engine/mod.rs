//! The simulated world and its rules.
//!
//! - [`Arena`] - Both actors, projectiles and grenades on top of an
//!   [`ArenaMap`](crate::ArenaMap); implements [`Simulation`](crate::Simulation)
//! - [`ArenaConfig`] - Sizes, capacities and effect timings
//! - [`RaySample`] / [`Surface`] - Results of line-of-sight casting
//!
//! # World tick
//!
//! A world tick is the three calls `tick_projectiles`, `tick_smoke` and
//! `tick_flash`, in that order. The turn controller performs one world tick
//! before every action it applies.
//!
//! 1. Projectiles advance one unit and are dropped when they enter a wall.
//!    Actor sound fades and reload countdowns progress.
//! 2. Thrown smoke moves, opens, and eventually dissipates.
//! 3. Blindness counts down; thrown flashes move and then detonate.

pub use self::{arena::*, config::*, raycast::*};

mod arena;
mod config;
mod raycast;
