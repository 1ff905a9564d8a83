use std::collections::{HashSet, VecDeque};

use serde::Serialize;

use crate::constants::{
    RANDOM_BORDER_ROWS, RANDOM_BORDER_WALL_CHANCE, WORLD_HEIGHT, WORLD_WIDTH,
};
use crate::rng::Rng;
use crate::types::Position;

pub const GROUND: u8 = 0;
pub const WALL: u8 = 1;

// The seven rows between the randomized borders.
const INTERIOR: [&str; 7] = [
    "....................",
    "..###..#..#.#..#.#..",
    "..#..#.#..#.##.#.#..",
    "..###..#..#.#.##.#..",
    "..#.#..#..#.#..#....",
    "..#..#..##..#..#.#..",
    "....................",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    pub width: i32,
    pub height: i32,
    collision_map: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorldInfo {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "collisionMap")]
    pub collision_map: Vec<u8>,
}

impl WorldInfo {
    pub fn is_ground(&self, x: i32, y: i32) -> bool {
        cell_at(&self.collision_map, self.width, self.height, x, y) == Some(GROUND)
    }
}

pub fn generate_world(rng: &mut Rng) -> World {
    let mut collision_map = Vec::with_capacity((WORLD_WIDTH * WORLD_HEIGHT) as usize);
    for y in 0..WORLD_HEIGHT {
        let interior_row = usize::try_from(y - RANDOM_BORDER_ROWS)
            .ok()
            .and_then(|idx| INTERIOR.get(idx));
        match interior_row {
            Some(row) => collision_map.extend(row.bytes().map(tile_to_cell)),
            None => {
                for _ in 0..WORLD_WIDTH {
                    let wall = rng.chance(RANDOM_BORDER_WALL_CHANCE);
                    collision_map.push(if wall { WALL } else { GROUND });
                }
            }
        }
    }
    World {
        width: WORLD_WIDTH,
        height: WORLD_HEIGHT,
        collision_map,
    }
}

fn tile_to_cell(tile: u8) -> u8 {
    if tile == b'.' {
        GROUND
    } else {
        WALL
    }
}

fn cell_at(cells: &[u8], width: i32, height: i32, x: i32, y: i32) -> Option<u8> {
    if x < 0 || y < 0 || x >= width || y >= height {
        return None;
    }
    cells.get((y * width + x) as usize).copied()
}

impl World {
    pub fn from_rows(rows: &[&str]) -> Self {
        let width = rows.iter().map(|row| row.len()).max().unwrap_or(0) as i32;
        let height = rows.len() as i32;
        let mut collision_map = Vec::with_capacity((width * height) as usize);
        for row in rows {
            let bytes = row.as_bytes();
            for x in 0..width as usize {
                collision_map.push(bytes.get(x).copied().map(tile_to_cell).unwrap_or(WALL));
            }
        }
        Self {
            width,
            height,
            collision_map,
        }
    }

    pub fn is_ground(&self, x: i32, y: i32) -> bool {
        cell_at(&self.collision_map, self.width, self.height, x, y) == Some(GROUND)
    }

    pub fn is_ground_at(&self, position: Position) -> bool {
        self.is_ground(position.x, position.y)
    }

    pub fn collision_map(&self) -> &[u8] {
        &self.collision_map
    }

    pub fn info(&self) -> WorldInfo {
        WorldInfo {
            width: self.width,
            height: self.height,
            collision_map: self.collision_map.clone(),
        }
    }

    pub fn ground_cells(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_ground(x, y) {
                    cells.push(Position::new(x, y));
                }
            }
        }
        cells
    }

    pub fn reachable_from(&self, start: Position) -> HashSet<Position> {
        let mut visited = HashSet::new();
        if !self.is_ground_at(start) {
            return visited;
        }
        let mut queue = VecDeque::from([start]);
        visited.insert(start);
        while let Some(cell) = queue.pop_front() {
            for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                let next = Position::new(cell.x + dx, cell.y + dy);
                if !self.is_ground_at(next) || !visited.insert(next) {
                    continue;
                }
                queue.push_back(next);
            }
        }
        visited
    }

    pub fn render_rows(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| if self.is_ground(x, y) { '.' } else { '#' })
                    .collect()
            })
            .collect()
    }
}
