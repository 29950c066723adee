use arrayvec::ArrayVec;

/// Maximum number of (key, value) pairs an actor can remember.
pub const MEMORY_CAPACITY: usize = 10;

/// Bounded associative memory of an actor.
///
/// Keys and values are stored as two parallel sequences, most recent first.
/// Both sequences are only ever mutated together, so they always have the
/// same length, which never exceeds [`MEMORY_CAPACITY`].
///
/// # Example
///
/// ```
/// use airsoft_engine::{ActorMemory, MEMORY_CAPACITY};
///
/// let mut memory = ActorMemory::new();
/// for i in 0..12 {
///     memory.remember(f64::from(i), f64::from(i) * 10.0);
/// }
///
/// assert_eq!(memory.len(), MEMORY_CAPACITY);
/// assert_eq!(memory.keys()[0], 11.0);
/// assert_eq!(memory.values()[MEMORY_CAPACITY - 1], 20.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActorMemory {
    keys: ArrayVec<f64, MEMORY_CAPACITY>,
    values: ArrayVec<f64, MEMORY_CAPACITY>,
}

impl ActorMemory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.keys.len(), self.values.len());
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> &[f64] {
        &self.keys
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates `(key, value)` pairs, most recent first.
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }

    /// Pushes a pair to the front, evicting the oldest pair when full.
    pub fn remember(&mut self, key: f64, value: f64) {
        if self.keys.is_full() {
            self.keys.pop();
            self.values.pop();
        }
        self.keys.insert(0, key);
        self.values.insert(0, value);
    }
}

/// One combat participant.
///
/// Created by the [`Arena`](crate::Arena) at its spawn point and mutated only
/// through [`Simulation`](crate::Simulation) operations.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) rotation: f64,
    pub(crate) ammo: u8,
    pub(crate) sound: f64,
    pub(crate) memory: ActorMemory,
    pub(crate) smoke_charges: u8,
    pub(crate) flash_charges: u8,
    pub(crate) active_smokes: u8,
    pub(crate) active_flashes: u8,
    pub(crate) reload_ticks: u16,
    pub(crate) blind_ticks: u16,
}

impl Actor {
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Facing in degrees, `[0, 360)` when set through the turn controller.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn ammo(&self) -> u8 {
        self.ammo
    }

    /// Noise emitted by the actor's latest actions; fades every world tick.
    #[must_use]
    pub fn sound(&self) -> f64 {
        self.sound
    }

    #[must_use]
    pub fn memory(&self) -> &ActorMemory {
        &self.memory
    }

    #[must_use]
    pub fn smoke_charges(&self) -> u8 {
        self.smoke_charges
    }

    #[must_use]
    pub fn flash_charges(&self) -> u8 {
        self.flash_charges
    }

    /// Smoke grenades thrown by this actor that are still in the world.
    #[must_use]
    pub fn active_smokes(&self) -> u8 {
        self.active_smokes
    }

    /// Flash grenades thrown by this actor that have not detonated yet.
    #[must_use]
    pub fn active_flashes(&self) -> u8 {
        self.active_flashes
    }

    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.reload_ticks > 0
    }

    /// Whether the actor is blinded by a flash.
    #[must_use]
    pub fn is_flashed(&self) -> bool {
        self.blind_ticks > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_keeps_lengths_equal_and_bounded() {
        let mut memory = ActorMemory::new();
        for i in 0..25 {
            memory.remember(f64::from(i), -f64::from(i));
            assert_eq!(memory.keys().len(), memory.values().len());
            assert!(memory.len() <= MEMORY_CAPACITY);
        }
        assert_eq!(memory.len(), MEMORY_CAPACITY);
    }

    #[test]
    fn test_remember_is_most_recent_first() {
        let mut memory = ActorMemory::new();
        memory.remember(1.0, 10.0);
        memory.remember(2.0, 20.0);
        memory.remember(3.0, 30.0);
        assert_eq!(
            memory.pairs().collect::<Vec<_>>(),
            [(3.0, 30.0), (2.0, 20.0), (1.0, 10.0)]
        );
    }

    #[test]
    fn test_eviction_drops_oldest() {
        let mut memory = ActorMemory::new();
        for i in 0..=10 {
            memory.remember(f64::from(i), f64::from(i));
        }
        assert_eq!(memory.keys().first(), Some(&10.0));
        assert_eq!(memory.keys().last(), Some(&1.0));
        assert!(!memory.keys().contains(&0.0));
    }
}
