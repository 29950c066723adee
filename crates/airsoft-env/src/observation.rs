//! Observation encoding: projecting engine state into a fixed-length vector.
//!
//! An observation is always built for one specific actor and is laid out as:
//!
//! 1. [`RAY_COUNT`] ray samples over a [`FOV_DEGREES`] cone, each emitted as
//!    `(distance, surface code)`. A flashed actor sees `(0, -1)` for every ray.
//! 2. Kinematic scalars: `rotation, ammo` for [`ObservationLayout::Heading`],
//!    `x, y, rotation, ammo` for [`ObservationLayout::Pose`].
//! 3. [`MEMORY_CAPACITY`] memory pairs `(key, value)`, most recent first,
//!    zero-padded when the memory is not full.
//! 4. `sound, active smokes, active flashes, flashed` (the last as 0 or 1).
//!
//! The length depends only on the layout, never on memory occupancy or the
//! number of live effects.

use std::iter;

use airsoft_engine::{MEMORY_CAPACITY, Simulation};
use serde::{Deserialize, Serialize};

/// Number of rays cast per observation.
pub const RAY_COUNT: usize = 180;

/// Angular width of the ray sweep, centered on the actor's facing.
pub const FOV_DEGREES: f64 = 90.0;

/// Observation length of [`ObservationLayout::Heading`].
pub const HEADING_OBSERVATION_SIZE: usize = ObservationLayout::Heading.size();

/// Observation length of [`ObservationLayout::Pose`].
pub const POSE_OBSERVATION_SIZE: usize = ObservationLayout::Pose.size();

const TRAILING_SCALARS: usize = 4;

/// Which kinematic scalars follow the ray samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant)]
pub enum ObservationLayout {
    /// Facing and ammunition only.
    Heading,
    /// Position, facing and ammunition.
    Pose,
}

impl ObservationLayout {
    const fn kinematic_len(self) -> usize {
        match self {
            Self::Heading => 2,
            Self::Pose => 4,
        }
    }

    /// Total number of values in an observation with this layout.
    #[must_use]
    pub const fn size(self) -> usize {
        RAY_COUNT * 2 + self.kinematic_len() + MEMORY_CAPACITY * 2 + TRAILING_SCALARS
    }
}

/// A fixed-length observation vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Observation(Vec<f32>);

impl Observation {
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f32> {
        self.0
    }
}

/// Builds the observation of `actor` in the given layout.
///
/// # Panics
///
/// Panics if the built vector does not have the layout's length, which can
/// only happen if the simulation returns a different number of rays than
/// requested.
///
/// # Example
///
/// ```
/// use airsoft_engine::Arena;
/// use airsoft_env::observation::{HEADING_OBSERVATION_SIZE, ObservationLayout, encode};
///
/// let arena = Arena::default();
/// let observation = encode(&arena, 0, ObservationLayout::Heading);
/// assert_eq!(observation.len(), HEADING_OBSERVATION_SIZE);
/// ```
#[expect(clippy::cast_possible_truncation)]
#[must_use]
pub fn encode<S>(sim: &S, actor: usize, layout: ObservationLayout) -> Observation
where
    S: Simulation + ?Sized,
{
    let me = &sim.actors()[actor];
    let mut values = Vec::with_capacity(layout.size());

    if me.is_flashed() {
        values.extend(iter::repeat_n([0.0, -1.0], RAY_COUNT).flatten());
    } else {
        for sample in sim.raycast_fov(actor, FOV_DEGREES, RAY_COUNT) {
            values.extend([sample.distance as f32, sample.surface.code()]);
        }
    }

    if layout.is_pose() {
        values.extend([me.x() as f32, me.y() as f32]);
    }
    values.extend([me.rotation() as f32, f32::from(me.ammo())]);

    let memory = me.memory();
    values.extend(memory.pairs().flat_map(|(k, v)| [k as f32, v as f32]));
    values.extend(iter::repeat_n(0.0, (MEMORY_CAPACITY - memory.len()) * 2));

    values.extend([
        me.sound() as f32,
        f32::from(me.active_smokes()),
        f32::from(me.active_flashes()),
        if me.is_flashed() { 1.0 } else { 0.0 },
    ]);

    assert_eq!(
        values.len(),
        layout.size(),
        "observation length does not match {layout:?} layout"
    );
    Observation(values)
}

#[cfg(test)]
mod tests {
    use airsoft_engine::{ActorMemory, Arena, ArenaConfig, Surface};

    use super::*;

    const RAYS_END: usize = RAY_COUNT * 2;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(HEADING_OBSERVATION_SIZE, 386);
        assert_eq!(POSE_OBSERVATION_SIZE, 388);
    }

    #[test]
    fn test_length_is_constant() {
        let mut arena = Arena::default();
        for layout in [ObservationLayout::Heading, ObservationLayout::Pose] {
            assert_eq!(encode(&arena, 0, layout).len(), layout.size());
        }

        // full memory and live effects do not change the shape
        let mut memory = ActorMemory::new();
        for i in 0..25 {
            memory.remember(f64::from(i), 1.0);
        }
        arena.set_memory(memory);
        arena.deploy_smoke();
        arena.deploy_flash();
        for layout in [ObservationLayout::Heading, ObservationLayout::Pose] {
            assert_eq!(encode(&arena, 0, layout).len(), layout.size());
        }
    }

    #[test]
    fn test_heading_scalars_and_memory_padding() {
        let mut arena = Arena::default();
        let mut memory = ActorMemory::new();
        memory.remember(3.0, 4.0);
        memory.remember(5.0, 6.0);
        arena.set_memory(memory);

        let obs = encode(&arena, 0, ObservationLayout::Heading);
        let obs = obs.as_slice();
        assert_eq!(&obs[RAYS_END..RAYS_END + 2], &[270.0, 30.0]);

        let memory = &obs[RAYS_END + 2..RAYS_END + 22];
        assert_eq!(&memory[..4], &[5.0, 6.0, 3.0, 4.0]);
        assert!(memory[4..].iter().all(|v| *v == 0.0));

        assert_eq!(&obs[RAYS_END + 22..], &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pose_includes_position() {
        let arena = Arena::default();
        let obs = encode(&arena, 1, ObservationLayout::Pose);
        assert_eq!(&obs.as_slice()[RAYS_END..RAYS_END + 4], &[1.0, 1.0, 90.0, 30.0]);
    }

    #[test]
    fn test_rays_carry_distance_and_surface() {
        let arena = Arena::default();
        let obs = encode(&arena, 0, ObservationLayout::Heading);
        for pair in obs.as_slice()[..RAYS_END].chunks(2) {
            assert!(pair[0] > 0.0);
            assert!([Surface::Wall, Surface::Actor, Surface::Smoke]
                .iter()
                .any(|s| s.code() == pair[1]));
        }
    }

    #[test]
    fn test_flashed_actor_sees_sentinel() {
        let config = ArenaConfig {
            spawn_rotations: [90.0, 270.0],
            ..ArenaConfig::default()
        };
        let map = "#########\n#0......#\n#.......#\n#......1#\n#########".parse().unwrap();
        let mut arena = Arena::new(map, config);
        arena.deploy_flash();
        for _ in 0..6 {
            arena.tick_flash();
        }
        assert!(arena.actors()[0].is_flashed());

        let obs = encode(&arena, 0, ObservationLayout::Heading);
        for pair in obs.as_slice()[..RAYS_END].chunks(2) {
            assert_eq!(pair, &[0.0, -1.0]);
        }
        assert_eq!(obs.as_slice()[obs.len() - 1], 1.0);
        assert_eq!(obs.as_slice()[obs.len() - 2], 0.0, "flash has detonated");
    }
}
