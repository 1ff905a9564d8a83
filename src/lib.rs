pub mod agent;
pub mod algorithms;
pub mod constants;
pub mod error;
pub mod instruction;
pub mod level;
pub mod levels;
pub mod pathfinding;
pub mod rng;
pub mod types;
pub mod world;
