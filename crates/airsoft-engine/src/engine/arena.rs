use crate::{
    ACTOR_COUNT, HitSet, Simulation,
    core::{
        actor::{Actor, ActorMemory},
        effects::{Flash, Projectile, Smoke},
        geometry::{BoundingBox, angle_difference, bearing, distance, forward_vector},
        map::ArenaMap,
    },
};

use super::{config::ArenaConfig, raycast::RaySample};

/// Collision size of projectiles and thrown grenades.
const PROJECTILE_SIZE: f64 = 1.0;

/// The simulated world: map, both actors, projectiles and grenades.
///
/// Cloning an arena snapshots the whole world, which is how the turn
/// controller restores a pristine match on reset.
///
/// # Example
///
/// ```
/// use airsoft_engine::{Arena, Simulation};
///
/// let mut arena = Arena::default();
/// let ammo = arena.current_actor().ammo();
///
/// arena.fire_projectile();
/// assert_eq!(arena.current_actor().ammo(), ammo - 1);
/// assert!(arena.hit_test().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Arena {
    pub(super) map: ArenaMap,
    pub(super) config: ArenaConfig,
    pub(super) actors: [Actor; ACTOR_COUNT],
    pub(super) projectiles: Vec<Projectile>,
    pub(super) smokes: Vec<Smoke>,
    pub(super) flashes: Vec<Flash>,
    pub(super) turn: usize,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(ArenaMap::default(), ArenaConfig::default())
    }
}

impl Arena {
    /// Creates a world with both actors at their spawn cells, fully equipped.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn new(map: ArenaMap, config: ArenaConfig) -> Self {
        let actors = std::array::from_fn(|i| {
            let (column, row) = map.spawn(i);
            Actor {
                x: column as f64 * config.wall_width,
                y: row as f64 * config.wall_height,
                rotation: config.spawn_rotations[i],
                ammo: config.ammo_total,
                sound: 0.0,
                memory: ActorMemory::new(),
                smoke_charges: config.smoke_charges,
                flash_charges: config.flash_charges,
                active_smokes: 0,
                active_flashes: 0,
                reload_ticks: 0,
                blind_ticks: 0,
            }
        });
        Self {
            map,
            config,
            actors,
            projectiles: vec![],
            smokes: vec![],
            flashes: vec![],
            turn: 0,
        }
    }

    #[must_use]
    pub fn map(&self) -> &ArenaMap {
        &self.map
    }

    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Puts an actor at an exact pose, skipping collision checks.
    ///
    /// Intended for setting up scenarios; regular movement goes through
    /// [`Simulation::move_actor`].
    pub fn place_actor(&mut self, actor: usize, x: f64, y: f64, rotation: f64) {
        let actor = &mut self.actors[actor];
        actor.x = x;
        actor.y = y;
        actor.rotation = rotation;
    }

    /// Adds a projectile in flight, skipping ammunition bookkeeping.
    pub fn spawn_projectile(&mut self, projectile: Projectile) {
        self.projectiles.push(projectile);
    }

    pub(super) fn actor_box(&self, actor: usize) -> BoundingBox {
        let actor = &self.actors[actor];
        BoundingBox::new(
            actor.x,
            actor.y,
            self.config.actor_width,
            self.config.actor_height,
        )
    }

    pub(super) fn wall_overlap(&self, probe: &BoundingBox) -> Option<(f64, f64)> {
        wall_overlap(&self.map, &self.config, probe)
    }
}

/// Returns the origin of the first wall cell (row by row) overlapping `probe`.
#[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn wall_overlap(map: &ArenaMap, config: &ArenaConfig, probe: &BoundingBox) -> Option<(f64, f64)> {
    let (ww, wh) = (config.wall_width, config.wall_height);
    let reach_x = (probe.width + ww) / 2.0;
    let reach_y = (probe.height + wh) / 2.0;
    let columns =
        ((probe.x - reach_x) / ww).floor() as i64..=((probe.x + reach_x) / ww).ceil() as i64;
    let rows = ((probe.y - reach_y) / wh).floor() as i64..=((probe.y + reach_y) / wh).ceil() as i64;

    for row in rows {
        for column in columns.clone() {
            if !map.is_wall(column, row) {
                continue;
            }
            let cell = BoundingBox::new(column as f64 * ww, row as f64 * wh, ww, wh);
            if probe.overlaps(&cell) {
                return Some((cell.x, cell.y));
            }
        }
    }
    None
}

/// Moves a thrown grenade one unit forward, or leaves it in place if that
/// would put it inside a wall. Returns whether it moved.
fn advance_thrown(
    map: &ArenaMap,
    config: &ArenaConfig,
    x: &mut f64,
    y: &mut f64,
    rotation: f64,
) -> bool {
    let (dx, dy) = forward_vector(rotation);
    let probe = BoundingBox::new(*x + dx, *y + dy, PROJECTILE_SIZE, PROJECTILE_SIZE);
    if wall_overlap(map, config, &probe).is_some() {
        return false;
    }
    *x = probe.x;
    *y = probe.y;
    true
}

impl Simulation for Arena {
    fn turn(&self) -> usize {
        self.turn
    }

    fn actors(&self) -> &[Actor; ACTOR_COUNT] {
        &self.actors
    }

    fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    fn smokes(&self) -> &[Smoke] {
        &self.smokes
    }

    fn flashes(&self) -> &[Flash] {
        &self.flashes
    }

    fn ammo_total(&self) -> u8 {
        self.config.ammo_total
    }

    fn tick_projectiles(&mut self) {
        let (map, config) = (&self.map, &self.config);
        self.projectiles.retain_mut(|p| {
            let (dx, dy) = forward_vector(p.rotation);
            p.x += dx;
            p.y += dy;
            let probe = BoundingBox::new(p.x, p.y, PROJECTILE_SIZE, PROJECTILE_SIZE);
            wall_overlap(map, config, &probe).is_none()
        });

        // sound and reloads share the projectile clock
        for actor in &mut self.actors {
            actor.sound *= config.sound_decay;
            if actor.reload_ticks > 0 {
                actor.reload_ticks -= 1;
                if actor.reload_ticks == 0 {
                    actor.ammo = config.ammo_total;
                }
            }
        }
    }

    fn tick_smoke(&mut self) {
        let (map, config) = (&self.map, &self.config);
        let actors = &mut self.actors;
        self.smokes.retain_mut(|smoke| {
            if !smoke.opened && smoke.frames_moved < config.smoke_max_move {
                smoke.frames_moved += 1;
                if !advance_thrown(map, config, &mut smoke.x, &mut smoke.y, smoke.rotation) {
                    smoke.frames_moved = config.smoke_max_move;
                }
                true
            } else if smoke.opened {
                smoke.frames_opened += 1;
                if smoke.frames_opened > config.smoke_max_open {
                    let owner = &mut actors[smoke.owner];
                    owner.active_smokes = owner.active_smokes.saturating_sub(1);
                    return false;
                }
                true
            } else {
                smoke.opened = true;
                true
            }
        });
    }

    fn tick_flash(&mut self) {
        for actor in &mut self.actors {
            actor.blind_ticks = actor.blind_ticks.saturating_sub(1);
        }

        let (map, config) = (&self.map, &self.config);
        let actors = &mut self.actors;
        self.flashes.retain_mut(|flash| {
            if flash.frames_moved < config.flash_max_move {
                flash.frames_moved += 1;
                if !advance_thrown(map, config, &mut flash.x, &mut flash.y, flash.rotation) {
                    flash.frames_moved = config.flash_max_move;
                }
                return true;
            }

            for actor in actors.iter_mut() {
                let dist = distance(actor.x, actor.y, flash.x, flash.y);
                if dist > config.flash_radius {
                    continue;
                }
                let towards = bearing(actor.x, actor.y, flash.x, flash.y);
                let facing =
                    angle_difference(actor.rotation, towards) <= config.flash_view_degrees / 2.0;
                if dist < 1e-9 || facing {
                    actor.blind_ticks = config.blind_ticks;
                }
            }
            let owner = &mut actors[flash.owner];
            owner.active_flashes = owner.active_flashes.saturating_sub(1);
            false
        });
    }

    fn move_actor(&mut self, dx: f64, dy: f64) {
        let turn = self.turn;
        let dx = dx.clamp(-1.0, 1.0);
        let dy = dy.clamp(-1.0, 1.0);

        let mut probe = self.actor_box(turn);
        probe.x += dx;
        probe.y += dy;
        let blocked = self.wall_overlap(&probe).is_some()
            || (0..ACTOR_COUNT)
                .filter(|i| *i != turn)
                .any(|i| probe.overlaps(&self.actor_box(i)));

        let actor = &mut self.actors[turn];
        if !blocked {
            actor.x = probe.x;
            actor.y = probe.y;
        }
        actor.sound = actor.sound.max(dx.abs() + dy.abs());
    }

    fn fire_projectile(&mut self) {
        let turn = self.turn;
        let actor = &mut self.actors[turn];
        if actor.ammo == 0 {
            return;
        }

        self.projectiles.push(Projectile {
            x: actor.x,
            y: actor.y,
            rotation: actor.rotation,
            fired_by: turn,
        });
        actor.ammo -= 1;
        actor.sound = actor.sound.max(self.config.fire_sound);

        if actor.ammo == 0 {
            if self.config.reload_ticks == 0 {
                actor.ammo = self.config.ammo_total;
            } else {
                actor.reload_ticks = self.config.reload_ticks;
            }
        }
    }

    fn set_rotation(&mut self, degrees: f64) {
        self.actors[self.turn].rotation = degrees;
    }

    fn set_memory(&mut self, memory: ActorMemory) {
        self.actors[self.turn].memory = memory;
    }

    fn deploy_smoke(&mut self) {
        let turn = self.turn;
        let actor = &mut self.actors[turn];
        if actor.smoke_charges == 0 {
            return;
        }
        self.smokes.push(Smoke {
            x: actor.x,
            y: actor.y,
            rotation: actor.rotation,
            owner: turn,
            frames_moved: 0,
            opened: false,
            frames_opened: 0,
        });
        actor.smoke_charges -= 1;
        actor.active_smokes += 1;
    }

    fn deploy_flash(&mut self) {
        let turn = self.turn;
        let actor = &mut self.actors[turn];
        if actor.flash_charges == 0 {
            return;
        }
        self.flashes.push(Flash {
            x: actor.x,
            y: actor.y,
            rotation: actor.rotation,
            owner: turn,
            frames_moved: 0,
        });
        actor.flash_charges -= 1;
        actor.active_flashes += 1;
    }

    fn raycast_fov(&self, actor: usize, fov_degrees: f64, sample_count: usize) -> Vec<RaySample> {
        self.cast_fov(actor, fov_degrees, sample_count)
    }

    fn hit_test(&self) -> HitSet {
        (0..ACTOR_COUNT)
            .filter(|i| {
                let target = self.actor_box(*i);
                self.projectiles.iter().any(|p| {
                    p.fired_by != *i
                        && BoundingBox::new(p.x, p.y, PROJECTILE_SIZE, PROJECTILE_SIZE)
                            .overlaps(&target)
                })
            })
            .collect()
    }

    fn advance_turn(&mut self) {
        self.turn = (self.turn + 1) % ACTOR_COUNT;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPEN_MAP: &str = "\
#########
#0......#
#.......#
#.......#
#.......#
#.......#
#.......#
#......1#
#########";

    fn open_arena(config: ArenaConfig) -> Arena {
        Arena::new(OPEN_MAP.parse().unwrap(), config)
    }

    fn facing_east() -> ArenaConfig {
        ArenaConfig {
            spawn_rotations: [90.0, 270.0],
            ..ArenaConfig::default()
        }
    }

    fn world_tick(arena: &mut Arena) {
        arena.tick_projectiles();
        arena.tick_smoke();
        arena.tick_flash();
    }

    #[test]
    fn test_new_places_actors_on_spawns() {
        let arena = open_arena(ArenaConfig::default());
        let [a, b] = arena.actors();
        assert_eq!((a.x(), a.y(), a.rotation()), (1.0, 1.0, 270.0));
        assert_eq!((b.x(), b.y(), b.rotation()), (7.0, 7.0, 90.0));
        assert_eq!(a.ammo(), 30);
        assert_eq!(arena.turn(), 0);
    }

    #[test]
    fn test_move_is_clamped() {
        let mut arena = open_arena(ArenaConfig::default());
        arena.move_actor(5.0, 0.5);
        let actor = arena.current_actor();
        assert_eq!((actor.x(), actor.y()), (2.0, 1.5));
        assert!((actor.sound() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_move_into_wall_is_reverted() {
        let mut arena = open_arena(ArenaConfig::default());
        arena.move_actor(-1.0, 0.0);
        let actor = arena.current_actor();
        assert_eq!((actor.x(), actor.y()), (1.0, 1.0));
    }

    #[test]
    fn test_move_into_other_actor_is_reverted() {
        let mut arena = open_arena(ArenaConfig::default());
        arena.place_actor(1, 2.5, 1.0, 0.0);
        arena.move_actor(1.0, 0.0);
        assert_eq!(arena.current_actor().x(), 1.0);
        arena.move_actor(0.0, 1.0);
        assert_eq!(arena.current_actor().y(), 2.0);
    }

    #[test]
    fn test_advance_turn_alternates() {
        let mut arena = open_arena(ArenaConfig::default());
        arena.advance_turn();
        assert_eq!(arena.turn(), 1);
        arena.advance_turn();
        assert_eq!(arena.turn(), 0);
    }

    #[test]
    fn test_projectile_travels_and_hits_other_actor() {
        let mut arena = open_arena(facing_east());
        arena.place_actor(1, 4.0, 1.0, 270.0);
        arena.fire_projectile();
        assert!(arena.hit_test().is_empty(), "shooter is never hit by own shot");

        world_tick(&mut arena);
        world_tick(&mut arena);
        assert!(arena.hit_test().is_empty());
        world_tick(&mut arena);
        assert_eq!(arena.hit_test().into_iter().collect::<Vec<_>>(), [1]);
    }

    #[test]
    fn test_projectile_removed_in_wall() {
        let mut arena = open_arena(ArenaConfig::default());
        // actor 0 faces the west wall
        arena.fire_projectile();
        arena.tick_projectiles();
        assert!(arena.projectiles().is_empty());
    }

    #[test]
    fn test_empty_magazine_reloads_after_delay() {
        let config = ArenaConfig {
            ammo_total: 2,
            reload_ticks: 3,
            ..ArenaConfig::default()
        };
        let mut arena = open_arena(config);
        arena.fire_projectile();
        arena.fire_projectile();
        assert_eq!(arena.current_actor().ammo(), 0);
        assert!(arena.current_actor().is_reloading());

        arena.fire_projectile();
        assert_eq!(arena.projectiles().len(), 2);

        arena.tick_projectiles();
        arena.tick_projectiles();
        assert_eq!(arena.current_actor().ammo(), 0);
        arena.tick_projectiles();
        assert_eq!(arena.current_actor().ammo(), 2);
        assert!(!arena.current_actor().is_reloading());
    }

    #[test]
    fn test_zero_reload_ticks_refills_immediately() {
        let config = ArenaConfig {
            ammo_total: 1,
            reload_ticks: 0,
            ..ArenaConfig::default()
        };
        let mut arena = open_arena(config);
        arena.fire_projectile();
        assert_eq!(arena.current_actor().ammo(), 1);
    }

    #[test]
    fn test_sound_fades_each_tick() {
        let mut arena = open_arena(ArenaConfig::default());
        arena.fire_projectile();
        assert!((arena.current_actor().sound() - 1.0).abs() < 1e-9);
        arena.tick_projectiles();
        assert!((arena.current_actor().sound() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_smoke_lifecycle() {
        let mut arena = open_arena(facing_east());
        arena.deploy_smoke();
        assert_eq!(arena.current_actor().smoke_charges(), 2);
        assert_eq!(arena.current_actor().active_smokes(), 1);

        for _ in 0..5 {
            arena.tick_smoke();
        }
        assert_eq!(arena.smokes()[0].x(), 6.0);
        assert!(!arena.smokes()[0].is_open());

        arena.tick_smoke();
        assert!(arena.smokes()[0].is_open());

        for _ in 0..180 {
            arena.tick_smoke();
        }
        assert_eq!(arena.smokes().len(), 1);
        arena.tick_smoke();
        assert!(arena.smokes().is_empty());
        assert_eq!(arena.current_actor().active_smokes(), 0);
    }

    #[test]
    fn test_smoke_stops_at_wall() {
        let mut arena = open_arena(ArenaConfig::default());
        // facing west, straight into the wall
        arena.deploy_smoke();
        arena.tick_smoke();
        assert_eq!(arena.smokes()[0].x(), 1.0);
        arena.tick_smoke();
        assert!(arena.smokes()[0].is_open());
    }

    #[test]
    fn test_flash_blinds_actors_facing_it() {
        let mut arena = open_arena(facing_east());
        arena.deploy_flash();
        assert_eq!(arena.current_actor().flash_charges(), 1);

        for _ in 0..5 {
            arena.tick_flash();
        }
        assert_eq!(arena.flashes().len(), 1);
        assert!(!arena.actors()[0].is_flashed());

        arena.tick_flash();
        assert!(arena.flashes().is_empty());
        assert!(arena.actors()[0].is_flashed());
        assert!(!arena.actors()[1].is_flashed(), "out of range");
        assert_eq!(arena.actors()[0].active_flashes(), 0);

        for _ in 0..29 {
            arena.tick_flash();
        }
        assert!(arena.actors()[0].is_flashed());
        arena.tick_flash();
        assert!(!arena.actors()[0].is_flashed());
    }

    #[test]
    fn test_flash_spares_actors_looking_away() {
        let mut arena = open_arena(facing_east());
        arena.deploy_flash();
        arena.set_rotation(270.0);
        for _ in 0..6 {
            arena.tick_flash();
        }
        assert!(!arena.actors()[0].is_flashed());
    }

    #[test]
    fn test_out_of_charges_is_noop() {
        let config = ArenaConfig {
            smoke_charges: 0,
            flash_charges: 0,
            ..ArenaConfig::default()
        };
        let mut arena = open_arena(config);
        arena.deploy_smoke();
        arena.deploy_flash();
        assert!(arena.smokes().is_empty());
        assert!(arena.flashes().is_empty());
    }
}
