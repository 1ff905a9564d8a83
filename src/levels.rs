use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::algorithms::BuiltinAlgorithm;
use crate::error::LevelDataError;
use crate::types::CharacterKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelId {
    Intro,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
}

impl LevelId {
    pub const ALL: [LevelId; 11] = [
        Self::Intro,
        Self::One,
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == value)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::One => "one",
            Self::Two => "two",
            Self::Three => "three",
            Self::Four => "four",
            Self::Five => "five",
            Self::Six => "six",
            Self::Seven => "seven",
            Self::Eight => "eight",
            Self::Nine => "nine",
            Self::Ten => "ten",
        }
    }

    pub fn next_level(self) -> Option<LevelId> {
        level_data(self).next_level
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmChoice {
    RandomMovement,
    ShittyFind,
    BetterFind,
    ShortestPath,
    Player,
}

impl AlgorithmChoice {
    pub fn builtin(self) -> Option<BuiltinAlgorithm> {
        match self {
            Self::RandomMovement => Some(BuiltinAlgorithm::RandomMovement),
            Self::ShittyFind => Some(BuiltinAlgorithm::ShittyFind),
            Self::BetterFind => Some(BuiltinAlgorithm::BetterFind),
            Self::ShortestPath => Some(BuiltinAlgorithm::ShortestPath),
            Self::Player => None,
        }
    }
}

impl From<BuiltinAlgorithm> for AlgorithmChoice {
    fn from(algorithm: BuiltinAlgorithm) -> Self {
        match algorithm {
            BuiltinAlgorithm::RandomMovement => Self::RandomMovement,
            BuiltinAlgorithm::ShittyFind => Self::ShittyFind,
            BuiltinAlgorithm::BetterFind => Self::BetterFind,
            BuiltinAlgorithm::ShortestPath => Self::ShortestPath,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterData {
    pub character: CharacterKind,
    pub algorithm: AlgorithmChoice,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    Teleport,
    Die,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "StageDurationRepr")]
pub enum StageDuration {
    Forever,
    Millis(u64),
}

// Level files may give a bare millisecond count, `{"millis": n}` or "forever".
#[derive(Deserialize)]
#[serde(untagged)]
enum StageDurationRepr {
    Bare(u64),
    Tagged { millis: u64 },
    Named(ForeverName),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum ForeverName {
    Forever,
}

impl From<StageDurationRepr> for StageDuration {
    fn from(repr: StageDurationRepr) -> Self {
        match repr {
            StageDurationRepr::Bare(millis) | StageDurationRepr::Tagged { millis } => {
                Self::Millis(millis)
            }
            StageDurationRepr::Named(ForeverName::Forever) => Self::Forever,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub duration: StageDuration,
    #[serde(rename = "instructionEveryMs", alias = "instructionEvery")]
    pub instruction_every_ms: u64,
}

impl Stage {
    const fn timed(duration_ms: u64, instruction_every_ms: u64) -> Self {
        Self {
            duration: StageDuration::Millis(duration_ms),
            instruction_every_ms,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelData {
    pub player: CharacterData,
    pub enemies: Vec<CharacterData>,
    #[serde(rename = "onCollision")]
    pub on_collision: CollisionPolicy,
    pub stages: Vec<Stage>,
    #[serde(rename = "nextLevel", default)]
    pub next_level: Option<LevelId>,
}

fn robot(algorithm: AlgorithmChoice) -> CharacterData {
    CharacterData {
        character: CharacterKind::Robot,
        algorithm,
    }
}

fn zombie(algorithm: AlgorithmChoice) -> CharacterData {
    CharacterData {
        character: CharacterKind::Zombie,
        algorithm,
    }
}

fn skeleton(algorithm: AlgorithmChoice) -> CharacterData {
    CharacterData {
        character: CharacterKind::Skeleton,
        algorithm,
    }
}

fn standard_stages() -> Vec<Stage> {
    vec![Stage::timed(10_000, 500), Stage::timed(10_000, 100)]
}

fn chase(enemies: Vec<CharacterData>, next_level: LevelId) -> LevelData {
    LevelData {
        player: robot(AlgorithmChoice::Player),
        enemies,
        on_collision: CollisionPolicy::Die,
        stages: standard_stages(),
        next_level: Some(next_level),
    }
}

pub fn level_data(id: LevelId) -> LevelData {
    use AlgorithmChoice::{BetterFind, RandomMovement, ShittyFind, ShortestPath};

    match id {
        LevelId::Intro => LevelData {
            player: robot(RandomMovement),
            enemies: vec![zombie(BetterFind), skeleton(ShortestPath)],
            on_collision: CollisionPolicy::Teleport,
            stages: vec![Stage {
                duration: StageDuration::Forever,
                instruction_every_ms: 500,
            }],
            next_level: Some(LevelId::One),
        },
        LevelId::One => LevelData {
            player: robot(AlgorithmChoice::Player),
            enemies: vec![zombie(RandomMovement)],
            on_collision: CollisionPolicy::Die,
            stages: vec![
                Stage::timed(5_000, 1_000),
                Stage::timed(5_000, 500),
                Stage::timed(10_000, 100),
            ],
            next_level: Some(LevelId::Two),
        },
        LevelId::Two => chase(vec![zombie(ShittyFind)], LevelId::Three),
        LevelId::Three => chase(vec![zombie(BetterFind)], LevelId::Four),
        LevelId::Four => chase(vec![zombie(ShortestPath)], LevelId::Five),
        LevelId::Five => chase(
            vec![zombie(ShortestPath), skeleton(RandomMovement)],
            LevelId::Six,
        ),
        LevelId::Six => chase(vec![zombie(ShortestPath), skeleton(ShittyFind)], LevelId::Seven),
        LevelId::Seven => chase(vec![zombie(ShortestPath), skeleton(BetterFind)], LevelId::Eight),
        LevelId::Eight => chase(
            vec![zombie(ShortestPath), skeleton(ShortestPath)],
            LevelId::Nine,
        ),
        LevelId::Nine => chase(
            vec![
                zombie(ShortestPath),
                skeleton(ShortestPath),
                zombie(ShortestPath),
            ],
            LevelId::Ten,
        ),
        LevelId::Ten => chase(
            vec![
                zombie(ShortestPath),
                skeleton(ShortestPath),
                zombie(ShortestPath),
                skeleton(ShortestPath),
                zombie(ShortestPath),
            ],
            LevelId::Ten,
        ),
    }
}

pub fn parse_level_data(text: &str, path: &str) -> Result<LevelData, LevelDataError> {
    serde_json::from_str(text).map_err(|source| LevelDataError::Parse {
        path: path.to_string(),
        source,
    })
}

pub fn load_level_file(path: &Path) -> Result<LevelData, LevelDataError> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|source| LevelDataError::Io {
        path: display.clone(),
        source,
    })?;
    parse_level_data(&text, &display)
}

pub fn resolve_level(name: &str) -> Result<LevelData, LevelDataError> {
    LevelId::parse(name)
        .map(level_data)
        .ok_or_else(|| LevelDataError::UnknownLevel(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_level_has_stages_and_enemies() {
        for id in LevelId::ALL {
            let data = level_data(id);
            assert!(!data.stages.is_empty(), "{}", id.as_str());
            assert!(!data.enemies.is_empty(), "{}", id.as_str());
            assert!(data.enemies.iter().all(|enemy| enemy.algorithm != AlgorithmChoice::Player));
        }
    }

    #[test]
    fn campaign_links_end_on_ten() {
        let mut id = LevelId::Intro;
        let mut visited = 0;
        while let Some(next) = id.next_level() {
            if next == id {
                break;
            }
            id = next;
            visited += 1;
        }
        assert_eq!(id, LevelId::Ten);
        assert_eq!(visited, 10);
    }

    #[test]
    fn intro_runs_forever_with_teleports() {
        let intro = level_data(LevelId::Intro);
        assert_eq!(intro.on_collision, CollisionPolicy::Teleport);
        assert_eq!(intro.stages[0].duration, StageDuration::Forever);
        assert_eq!(intro.player.algorithm, AlgorithmChoice::RandomMovement);
    }

    #[test]
    fn level_data_parses_from_json() {
        let json = r#"{
            "player": {"character": "robot", "algorithm": "better-find"},
            "enemies": [{"character": "skeleton", "algorithm": "shortest-path"}],
            "onCollision": "die",
            "stages": [
                {"duration": {"millis": 3000}, "instructionEveryMs": 250},
                {"duration": "forever", "instructionEveryMs": 100}
            ]
        }"#;
        let data = parse_level_data(json, "inline").expect("valid level");
        assert_eq!(data.player.algorithm, AlgorithmChoice::BetterFind);
        assert_eq!(data.stages[0].duration, StageDuration::Millis(3000));
        assert_eq!(data.stages[1].duration, StageDuration::Forever);
        assert_eq!(data.next_level, None);
    }

    #[test]
    fn level_data_accepts_bare_durations_and_instruction_every() {
        let json = r#"{
            "player": {"character": "robot", "algorithm": "player"},
            "enemies": [{"character": "zombie", "algorithm": "random-movement"}],
            "onCollision": "die",
            "stages": [
                {"duration": 5000, "instructionEvery": 1000},
                {"duration": 5000, "instructionEvery": 500},
                {"duration": 10000, "instructionEvery": 100}
            ],
            "nextLevel": "two"
        }"#;
        let data = parse_level_data(json, "one.json").expect("level in the game's own shape");
        assert_eq!(data, level_data(LevelId::One));
    }

    #[test]
    fn stage_duration_writes_the_tagged_form_it_reads() {
        let stage = Stage::timed(3000, 250);
        let text = serde_json::to_string(&stage).expect("serialize");
        assert_eq!(text, r#"{"duration":{"millis":3000},"instructionEveryMs":250}"#);
        let back: Stage = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(back, stage);
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = parse_level_data("{", "broken.json").expect_err("invalid json");
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn unknown_level_name_is_an_error() {
        assert!(resolve_level("eleven").is_err());
        assert_eq!(resolve_level("four").expect("known").enemies.len(), 1);
    }

    #[test]
    fn missing_file_reports_io_error() {
        let path = std::env::temp_dir().join("dungeon-pursuit-missing-level.json");
        let err = load_level_file(&path).expect_err("file does not exist");
        assert!(matches!(err, LevelDataError::Io { .. }));
    }
}
