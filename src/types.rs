use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
}

impl Command {
    /// Fixed enumeration order used wherever commands are listed.
    pub const ALL: [Command; 4] = [Command::Up, Command::Down, Command::Left, Command::Right];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn apply(self, position: Position) -> Position {
        let (dx, dy) = self.delta();
        Position::new(position.x + dx, position.y + dy)
    }

    pub fn toward(from: Position, to: Position) -> Option<Self> {
        if to.x != from.x {
            return Some(if to.x < from.x { Self::Left } else { Self::Right });
        }
        if to.y != from.y {
            return Some(if to.y < from.y { Self::Up } else { Self::Down });
        }
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterKind {
    Robot,
    Zombie,
    Skeleton,
}

impl CharacterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Robot => "robot",
            Self::Zombie => "zombie",
            Self::Skeleton => "skeleton",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RealPosition {
    pub x: f32,
    pub y: f32,
}

impl From<Position> for RealPosition {
    fn from(position: Position) -> Self {
        Self {
            x: position.x as f32,
            y: position.y as f32,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelOutcome {
    Survived,
    Caught,
    Faulted,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    InstructionResolved {
        agent: usize,
        command: Command,
        to: Position,
    },
    StageAdvanced {
        stage: usize,
        #[serde(rename = "instructionEveryMs")]
        instruction_every_ms: u64,
    },
    Collision {
        #[serde(rename = "enemy")]
        enemy: usize,
    },
    Teleported {
        agent: usize,
        to: Position,
    },
    InstructionFailed {
        agent: usize,
        message: String,
    },
    LevelEnded {
        outcome: LevelOutcome,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct AgentView {
    pub index: usize,
    pub kind: CharacterKind,
    pub hostile: bool,
    pub position: Option<Position>,
    #[serde(rename = "realPosition")]
    pub real_position: Option<RealPosition>,
    #[serde(rename = "lastCommand")]
    pub last_command: Option<Command>,
    #[serde(rename = "commandCount")]
    pub command_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct LevelSnapshot {
    pub tick: u64,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub stage: usize,
    pub agents: Vec<AgentView>,
    pub outcome: Option<LevelOutcome>,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct LevelSummary {
    pub outcome: Option<LevelOutcome>,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub ticks: u64,
    pub stage: usize,
    pub instructions: u64,
    pub teleports: u64,
}
