/// A projectile in flight.
///
/// Projectiles travel one unit along their rotation per world tick and are
/// removed when they hit a wall. They never strike the actor that fired them.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub fired_by: usize,
}

/// A smoke grenade.
///
/// Thrown smoke travels for a few ticks, opens, and then blocks vision within
/// its radius until it dissipates.
#[derive(Debug, Clone, PartialEq)]
pub struct Smoke {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) rotation: f64,
    pub(crate) owner: usize,
    pub(crate) frames_moved: u8,
    pub(crate) opened: bool,
    pub(crate) frames_opened: u16,
}

impl Smoke {
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn owner(&self) -> usize {
        self.owner
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.opened
    }
}

/// A flash grenade that has not detonated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) rotation: f64,
    pub(crate) owner: usize,
    pub(crate) frames_moved: u8,
}

impl Flash {
    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn owner(&self) -> usize {
        self.owner
    }
}
