use crate::types::Position;

pub const WORLD_WIDTH: i32 = 20;
pub const WORLD_HEIGHT: i32 = 13;

pub const RANDOM_BORDER_ROWS: i32 = 3;
pub const RANDOM_BORDER_WALL_CHANCE: f64 = 0.2;

pub const PLAYER_SPAWN: Position = Position::new(7, 3);

pub const TELEPORT_ATTEMPTS: usize = 64;
pub const MIN_ENEMY_SPAWN_DISTANCE: i32 = 5;

pub const DEFAULT_FRAME_MS: u64 = 1000 / 60;
pub const DEFAULT_MAX_LEVEL_MS: u64 = 5 * 60 * 1000;
