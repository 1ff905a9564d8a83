use serde::{Deserialize, Serialize};

use crate::error::AlgorithmFault;
use crate::rng::Rng;
use crate::types::{Command, Position};
use crate::world::{World, WorldInfo};

mod better_find;
mod random_movement;
mod shitty_find;
mod shortest_path;

pub use self::better_find::better_find;
pub use self::random_movement::random_movement;
pub use self::shitty_find::shitty_find;
pub use self::shortest_path::shortest_path_step;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InstructionData {
    #[serde(rename = "availableCommands")]
    pub available_commands: Vec<Command>,
    pub position: Position,
    #[serde(rename = "previousCommands")]
    pub previous_commands: Vec<Command>,
    #[serde(rename = "enemyPositions")]
    pub enemy_positions: Vec<Position>,
    pub world: WorldInfo,
}

impl InstructionData {
    pub fn previous_command(&self) -> Option<Command> {
        self.previous_commands.last().copied()
    }

    pub fn first_enemy(&self) -> Option<Position> {
        self.enemy_positions.first().copied()
    }

    pub fn is_available(&self, command: Command) -> bool {
        self.available_commands.contains(&command)
    }
}

pub struct Libraries<'a> {
    pub random: &'a mut Rng,
    world: &'a World,
}

impl<'a> Libraries<'a> {
    pub fn new(random: &'a mut Rng, world: &'a World) -> Self {
        Self { random, world }
    }

    pub fn is_ground(&self, x: i32, y: i32) -> bool {
        self.world.is_ground(x, y)
    }

    pub fn world(&self) -> &'a World {
        self.world
    }
}

pub trait MovementAlgorithm {
    fn name(&self) -> &str;

    fn setup(&mut self, _world: &WorldInfo) -> Result<(), AlgorithmFault> {
        Ok(())
    }

    fn instruction(
        &mut self,
        data: InstructionData,
        libraries: &mut Libraries<'_>,
    ) -> Result<Command, AlgorithmFault>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuiltinAlgorithm {
    RandomMovement,
    ShittyFind,
    BetterFind,
    ShortestPath,
}

impl BuiltinAlgorithm {
    pub const ALL: [BuiltinAlgorithm; 4] = [
        Self::RandomMovement,
        Self::ShittyFind,
        Self::BetterFind,
        Self::ShortestPath,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "random-movement" => Some(Self::RandomMovement),
            "shitty-find" => Some(Self::ShittyFind),
            "better-find" => Some(Self::BetterFind),
            "shortest-path" => Some(Self::ShortestPath),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::RandomMovement => "random-movement",
            Self::ShittyFind => "shitty-find",
            Self::BetterFind => "better-find",
            Self::ShortestPath => "shortest-path",
        }
    }

    pub fn decide(self, data: InstructionData, libraries: &mut Libraries<'_>) -> Option<Command> {
        match self {
            Self::RandomMovement => random_movement(data, libraries),
            Self::ShittyFind => shitty_find(data, libraries),
            Self::BetterFind => better_find(data, libraries),
            Self::ShortestPath => shortest_path_step(data, libraries),
        }
    }
}

impl MovementAlgorithm for BuiltinAlgorithm {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn instruction(
        &mut self,
        data: InstructionData,
        libraries: &mut Libraries<'_>,
    ) -> Result<Command, AlgorithmFault> {
        let position = data.position;
        self.decide(data, libraries).ok_or_else(|| {
            AlgorithmFault::new(format!(
                "{} has no command to pick at ({}, {})",
                self.as_str(),
                position.x,
                position.y
            ))
        })
    }
}

type SetupFn = Box<dyn FnMut(&WorldInfo) -> Result<(), AlgorithmFault>>;

pub struct FnAlgorithm<F> {
    name: String,
    instruction: F,
    setup: Option<SetupFn>,
}

pub fn from_fn<F>(name: impl Into<String>, instruction: F) -> FnAlgorithm<F>
where
    F: FnMut(InstructionData, &mut Libraries<'_>) -> Result<Command, AlgorithmFault>,
{
    FnAlgorithm {
        name: name.into(),
        instruction,
        setup: None,
    }
}

impl<F> FnAlgorithm<F> {
    pub fn with_setup<S>(mut self, setup: S) -> Self
    where
        S: FnMut(&WorldInfo) -> Result<(), AlgorithmFault> + 'static,
    {
        self.setup = Some(Box::new(setup));
        self
    }
}

impl<F> MovementAlgorithm for FnAlgorithm<F>
where
    F: FnMut(InstructionData, &mut Libraries<'_>) -> Result<Command, AlgorithmFault>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, world: &WorldInfo) -> Result<(), AlgorithmFault> {
        match self.setup.as_mut() {
            Some(setup) => setup(world),
            None => Ok(()),
        }
    }

    fn instruction(
        &mut self,
        data: InstructionData,
        libraries: &mut Libraries<'_>,
    ) -> Result<Command, AlgorithmFault> {
        (self.instruction)(data, libraries)
    }
}

fn avoid_backtracking(available: &mut Vec<Command>, previous: Option<Command>) {
    let Some(previous) = previous else {
        return;
    };
    if available.len() <= 1 {
        return;
    }
    let opposite = previous.opposite();
    if let Some(idx) = available.iter().position(|command| *command == opposite) {
        available.remove(idx);
    }
}

fn preferred_axes(from: Position, target: Position) -> (i32, i32, Command, Command) {
    let dist_x = from.x - target.x;
    let dist_y = from.y - target.y;
    let best_x = if dist_x < 0 { Command::Right } else { Command::Left };
    let best_y = if dist_y < 0 { Command::Down } else { Command::Up };
    (dist_x, dist_y, best_x, best_y)
}
