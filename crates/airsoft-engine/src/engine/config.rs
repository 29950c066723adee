use serde::{Deserialize, Serialize};

/// Physical constants of an arena.
///
/// Every field has a default, so a JSON configuration only needs to list
/// the values it overrides.
///
/// ```
/// use airsoft_engine::ArenaConfig;
///
/// let config: ArenaConfig = serde_json::from_str(r#"{ "ammo_total": 5 }"#).unwrap();
/// assert_eq!(config.ammo_total, 5);
/// assert_eq!(config.smoke_radius, ArenaConfig::default().smoke_radius);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub wall_width: f64,
    pub wall_height: f64,
    pub actor_width: f64,
    pub actor_height: f64,
    /// Magazine capacity; actors spawn with a full magazine.
    pub ammo_total: u8,
    /// Ticks until an empty magazine is refilled (0 refills immediately).
    pub reload_ticks: u16,
    /// Initial facing of each actor, in degrees.
    pub spawn_rotations: [f64; 2],
    pub smoke_charges: u8,
    pub smoke_radius: f64,
    /// Ticks a thrown smoke travels before opening.
    pub smoke_max_move: u8,
    /// Ticks an open smoke lasts.
    pub smoke_max_open: u16,
    pub flash_charges: u8,
    pub flash_radius: f64,
    /// Ticks a thrown flash travels before detonating.
    pub flash_max_move: u8,
    /// Field of view, in degrees, inside which a detonation blinds an actor.
    pub flash_view_degrees: f64,
    pub blind_ticks: u16,
    /// Noise emitted by firing.
    pub fire_sound: f64,
    /// Fraction of an actor's sound left after each world tick.
    pub sound_decay: f64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            wall_width: 1.0,
            wall_height: 1.0,
            actor_width: 1.0,
            actor_height: 1.0,
            ammo_total: 30,
            reload_ticks: 20,
            spawn_rotations: [270.0, 90.0],
            smoke_charges: 3,
            smoke_radius: 4.0,
            smoke_max_move: 5,
            smoke_max_open: 180,
            flash_charges: 2,
            flash_radius: 6.0,
            flash_max_move: 5,
            flash_view_degrees: 90.0,
            blind_ticks: 30,
            fire_sound: 1.0,
            sound_decay: 0.5,
        }
    }
}
