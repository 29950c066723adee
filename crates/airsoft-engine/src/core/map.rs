use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ACTOR_COUNT, MapError};

/// Arena used when no map file is given.
///
/// `#` is a wall, `.` is floor, and `0`/`1` mark the floor cell each actor
/// spawns on.
pub const DEFAULT_MAP: &str = "\
#############
#1..........#
#...........#
#..##...##..#
#...........#
#.....#.....#
#....###....#
#.....#.....#
#...........#
#..##...##..#
#...........#
#........0..#
#############";

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Cell {
    Floor,
    Wall,
}

/// Static wall layout of the arena.
///
/// Cells are addressed by `(column, row)`. Anything outside the grid is
/// treated as wall, so rays and projectiles can never escape the map.
///
/// # Text format
///
/// ```
/// use airsoft_engine::ArenaMap;
///
/// let map: ArenaMap = "#####\n#0.1#\n#####".parse().unwrap();
/// assert_eq!(map.width(), 5);
/// assert_eq!(map.height(), 3);
/// assert_eq!(map.spawn(1), (3, 1));
/// assert!(map.is_wall(0, 0));
/// assert!(map.is_wall(-1, 7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaMap {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    spawns: [(usize, usize); ACTOR_COUNT],
}

impl Default for ArenaMap {
    fn default() -> Self {
        DEFAULT_MAP
            .parse()
            .expect("default map should be well-formed")
    }
}

impl ArenaMap {
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Spawn cell `(column, row)` of the given actor.
    #[must_use]
    pub fn spawn(&self, actor: usize) -> (usize, usize) {
        self.spawns[actor]
    }

    #[must_use]
    pub fn cell(&self, column: i64, row: i64) -> Cell {
        let (Ok(column), Ok(row)) = (usize::try_from(column), usize::try_from(row)) else {
            return Cell::Wall;
        };
        if column >= self.width || row >= self.height {
            return Cell::Wall;
        }
        self.cells[row * self.width + column]
    }

    #[must_use]
    pub fn is_wall(&self, column: i64, row: i64) -> bool {
        self.cell(column, row).is_wall()
    }

    /// Iterates wall cells as `(column, row)` pairs, row by row.
    pub fn walls(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_wall())
            .map(|(i, _)| (i % self.width, i / self.width))
    }
}

impl FromStr for ArenaMap {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows = s
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();
        let width = rows.first().ok_or(MapError::Empty)?.chars().count();

        let mut cells = Vec::with_capacity(width * rows.len());
        let mut spawns = [None; ACTOR_COUNT];
        for (row, line) in rows.iter().enumerate() {
            let row_width = line.chars().count();
            if row_width != width {
                return Err(MapError::RaggedRow {
                    row,
                    width: row_width,
                    expected: width,
                });
            }
            for (column, ch) in line.chars().enumerate() {
                let cell = match ch {
                    '#' => Cell::Wall,
                    '.' => Cell::Floor,
                    '0' | '1' => {
                        let actor = usize::from(ch == '1');
                        if spawns[actor].replace((column, row)).is_some() {
                            return Err(MapError::DuplicateSpawn { actor });
                        }
                        Cell::Floor
                    }
                    cell => return Err(MapError::UnknownCell { cell, row, column }),
                };
                cells.push(cell);
            }
        }

        let mut resolved = [(0, 0); ACTOR_COUNT];
        for (actor, spawn) in spawns.into_iter().enumerate() {
            resolved[actor] = spawn.ok_or(MapError::MissingSpawn { actor })?;
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
            spawns: resolved,
        })
    }
}

impl fmt::Display for ArenaMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.height {
            if row > 0 {
                writeln!(f)?;
            }
            for column in 0..self.width {
                let ch = if let Some(actor) = self.spawns.iter().position(|s| *s == (column, row)) {
                    if actor == 0 { '0' } else { '1' }
                } else if self.cells[row * self.width + column].is_wall() {
                    '#'
                } else {
                    '.'
                };
                write!(f, "{ch}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for ArenaMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ArenaMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
