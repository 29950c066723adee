use crate::{
    ACTOR_COUNT,
    core::geometry::{BoundingBox, distance, forward_vector},
};

use super::arena::Arena;

/// What a ray stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Surface {
    Wall,
    Actor,
    Smoke,
}

impl Surface {
    /// Numeric code used in observations.
    #[must_use]
    pub const fn code(self) -> f32 {
        match self {
            Self::Wall => 0.0,
            Self::Actor => 1.0,
            Self::Smoke => 2.0,
        }
    }
}

/// Result of a single ray: distance to the first obstacle and its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySample {
    pub distance: f64,
    pub surface: Surface,
}

/// Size of the probe box stepped along a ray.
const PROBE_SIZE: f64 = 1.0;

impl Arena {
    /// Walks a ray from `origin`'s position one unit at a time.
    ///
    /// Walls are checked before actors and actors before smoke at every step.
    /// The casting actor is invisible to its own rays, and so is any actor
    /// overlapping it.
    #[expect(clippy::cast_precision_loss)]
    pub(super) fn cast_ray(&self, origin: usize, rotation: f64) -> RaySample {
        let (fx, fy) = forward_vector(rotation);
        let (x0, y0) = (self.actors[origin].x, self.actors[origin].y);
        let own_box = self.actor_box(origin);

        for step in 1..=self.max_ray_steps() {
            let x = x0 + fx * step as f64;
            let y = y0 + fy * step as f64;
            let probe = BoundingBox::new(x, y, PROBE_SIZE, PROBE_SIZE);

            if let Some((wx, wy)) = self.wall_overlap(&probe) {
                return RaySample {
                    distance: distance(x0, y0, wx, wy),
                    surface: Surface::Wall,
                };
            }

            if !probe.overlaps(&own_box) {
                let seen = (0..ACTOR_COUNT)
                    .filter(|i| *i != origin)
                    .find(|i| probe.overlaps(&self.actor_box(*i)));
                if let Some(other) = seen {
                    let other = &self.actors[other];
                    return RaySample {
                        distance: distance(x0, y0, other.x, other.y),
                        surface: Surface::Actor,
                    };
                }
            }

            let radius = self.config.smoke_radius;
            let smoke = self
                .smokes
                .iter()
                .find(|s| s.opened && probe.touches_circle(s.x, s.y, radius));
            if let Some(smoke) = smoke {
                return RaySample {
                    distance: distance(x0, y0, smoke.x, smoke.y),
                    surface: Surface::Smoke,
                };
            }
        }

        // unreachable on a map, since everything outside the grid is wall
        RaySample {
            distance: self.max_ray_steps() as f64,
            surface: Surface::Wall,
        }
    }

    #[expect(clippy::cast_precision_loss)]
    pub(super) fn cast_fov(
        &self,
        origin: usize,
        fov_degrees: f64,
        sample_count: usize,
    ) -> Vec<RaySample> {
        let start = self.actors[origin].rotation - fov_degrees / 2.0;
        let per_sample = fov_degrees / sample_count as f64;
        (0..sample_count)
            .map(|i| self.cast_ray(origin, start + per_sample * i as f64))
            .collect()
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn max_ray_steps(&self) -> usize {
        let width = self.map.width() as f64 * self.config.wall_width;
        let height = self.map.height() as f64 * self.config.wall_height;
        (width + height).ceil() as usize + 2
    }
}
