//! Action decoding: turning a raw numeric vector into engine calls.
//!
//! An action is a vector of [`ACTION_SIZE`] real numbers. Six of them are
//! *gates*: the sub-action they guard is applied only when the gate is
//! strictly positive. Gates are independent, so a single action can move,
//! fire, turn, remember and throw both grenades at once.
//!
//! # Layout
//!
//! | Index | Meaning                                  |
//! |-------|------------------------------------------|
//! | 0, 1  | movement `dx`, `dy` (clamped by engine)  |
//! | 2     | move gate                                |
//! | 3     | fire gate                                |
//! | 4     | rotation delta, degrees                  |
//! | 5     | rotate gate                              |
//! | 6     | unused                                   |
//! | 7     | remember gate                            |
//! | 8, 9  | memory key, memory value                 |
//! | 10    | smoke gate                               |
//! | 11    | flash gate                               |
//!
//! Sub-actions are applied in table order to the actor whose turn it is.
//! Ungated values may lie anywhere on the real line; only non-finite values
//! are rejected.

use airsoft_engine::Simulation;

/// Number of values in an action vector.
pub const ACTION_SIZE: usize = 12;

/// Index constants for the fields of an [`ActionVector`].
pub mod field {
    pub const DX: usize = 0;
    pub const DY: usize = 1;
    pub const MOVE: usize = 2;
    pub const FIRE: usize = 3;
    pub const ROTATION_DELTA: usize = 4;
    pub const ROTATE: usize = 5;
    pub const REMEMBER: usize = 7;
    pub const MEMORY_KEY: usize = 8;
    pub const MEMORY_VALUE: usize = 9;
    pub const SMOKE: usize = 10;
    pub const FLASH: usize = 11;
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ActionError {
    #[display("action has {len} values, expected {}", ACTION_SIZE)]
    WrongLength { len: usize },
    #[display("action value at index {index} is not finite ({value})")]
    NonFinite { index: usize, value: f32 },
}

/// A validated action: exactly [`ACTION_SIZE`] finite values.
///
/// # Example
///
/// ```
/// use airsoft_env::action::{ActionError, ActionVector, field};
///
/// let mut raw = [0.0_f32; 12];
/// raw[field::FIRE] = 1.0;
/// let action = ActionVector::try_from(&raw[..]).unwrap();
/// assert!(action.is_gate_open(field::FIRE));
///
/// assert_eq!(
///     ActionVector::try_from(&raw[..3]),
///     Err(ActionError::WrongLength { len: 3 })
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionVector([f32; ACTION_SIZE]);

impl Default for ActionVector {
    fn default() -> Self {
        Self::IDLE
    }
}

impl ActionVector {
    /// All zeros; every gate is closed, so applying it does nothing.
    pub const IDLE: Self = Self([0.0; ACTION_SIZE]);

    /// Builds an action from values that may be non-finite, replacing those
    /// with zero.
    #[must_use]
    pub fn new_lossy(values: [f32; ACTION_SIZE]) -> Self {
        Self(values.map(|v| if v.is_finite() { v } else { 0.0 }))
    }

    #[must_use]
    pub fn values(&self) -> &[f32; ACTION_SIZE] {
        &self.0
    }

    #[must_use]
    pub fn is_gate_open(&self, index: usize) -> bool {
        self.0[index] > 0.0
    }
}

impl TryFrom<[f32; ACTION_SIZE]> for ActionVector {
    type Error = ActionError;

    fn try_from(values: [f32; ACTION_SIZE]) -> Result<Self, Self::Error> {
        if let Some((index, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ActionError::NonFinite {
                index,
                value: *value,
            });
        }
        Ok(Self(values))
    }
}

impl TryFrom<&[f32]> for ActionVector {
    type Error = ActionError;

    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        let values: [f32; ACTION_SIZE] = values
            .try_into()
            .map_err(|_| ActionError::WrongLength { len: values.len() })?;
        Self::try_from(values)
    }
}

/// Applies the gated sub-actions of `action` to the current actor.
pub fn decode_and_apply<S>(sim: &mut S, action: &ActionVector)
where
    S: Simulation + ?Sized,
{
    let value = |index: usize| f64::from(action.0[index]);

    if action.is_gate_open(field::MOVE) {
        sim.move_actor(value(field::DX), value(field::DY));
    }
    if action.is_gate_open(field::FIRE) {
        sim.fire_projectile();
    }
    if action.is_gate_open(field::ROTATE) {
        let rotation = sim.current_actor().rotation() + value(field::ROTATION_DELTA);
        sim.set_rotation(wrap_degrees(rotation));
    }
    if action.is_gate_open(field::REMEMBER) {
        let mut memory = sim.current_actor().memory().clone();
        memory.remember(value(field::MEMORY_KEY), value(field::MEMORY_VALUE));
        sim.set_memory(memory);
    }
    if action.is_gate_open(field::SMOKE) {
        sim.deploy_smoke();
    }
    if action.is_gate_open(field::FLASH) {
        sim.deploy_flash();
    }
}

/// Euclidean remainder by 360, guarding against rounding up to 360 itself.
fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
