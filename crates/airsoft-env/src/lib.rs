//! Self-play environment on top of the airsoft simulation engine.
//!
//! This crate turns a [`Simulation`](airsoft_engine::Simulation) into a
//! reinforcement-learning environment for a single learning agent playing
//! against an [`Opponent`](policy::Opponent).
//!
//! # Architecture
//!
//! ```text
//! TurnController (one step = agent phase + opponent phase)
//!     ↓ uses
//! Action decoder ── Observation encoder ── Reward shaper
//!     ↓ drive
//! Simulation (airsoft-engine)
//! ```
//!
//! - [`controller`] - Episode state machine: seats, phases, hits, timeouts
//! - [`action`] - Validated [`ActionVector`](action::ActionVector)s and the
//!   gated decoding into engine calls
//! - [`observation`] - Fixed-length observation vectors in two layouts
//! - [`reward`] - Terminal and shaping rewards from the agent's viewpoint
//! - [`policy`] - The [`Policy`](policy::Policy) trait and opponent slot
//! - [`config`] - Serializable environment configuration
//!
//! # Example
//!
//! ```
//! use airsoft_env::{
//!     action::ActionVector,
//!     config::{Convention, EnvConfig},
//!     controller::TurnController,
//! };
//!
//! let config = EnvConfig {
//!     convention: Convention::Asymmetric,
//!     seed: 1,
//!     ..EnvConfig::default()
//! };
//! let mut controller = TurnController::new(config.build_arena(), &config);
//! controller.reset();
//!
//! let mut total = 0.0;
//! loop {
//!     let step = controller.step_action(&ActionVector::IDLE).unwrap();
//!     total += step.reward;
//!     if step.terminated {
//!         break;
//!     }
//! }
//! assert!(controller.is_finished());
//! # let _ = total;
//! ```
//!
//! # Design
//!
//! The controller is generic over the simulation and clones a pristine copy
//! on every reset, so any `Simulation + Clone` works, including test doubles.
//! Everything is single-threaded; parallel training runs one controller per
//! thread and shares only the opponent policies.

pub mod action;
pub mod config;
pub mod controller;
pub mod observation;
pub mod policy;
pub mod reward;
