use serde::Serialize;
use thiserror::Error;

use crate::types::{Command, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Instruction,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Instruction => write!(f, "instruction"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct AlgorithmFault {
    pub message: String,
}

impl AlgorithmFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InstructionError {
    #[error("unavailable command used: {command:?} is not one of {available:?}")]
    UnavailableCommand {
        command: Command,
        available: Vec<Command>,
    },

    #[error("{phase} failed in {algorithm}: {message}")]
    AlgorithmFault {
        phase: Phase,
        algorithm: String,
        message: String,
    },

    #[error("agent has no position yet")]
    NotPlaced,
}

impl InstructionError {
    pub fn phase(&self) -> Phase {
        match self {
            Self::AlgorithmFault { phase, .. } => *phase,
            _ => Phase::Instruction,
        }
    }
}

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("agent {agent} failed: {source}")]
    Instruction {
        agent: usize,
        #[source]
        source: InstructionError,
    },

    #[error("level needs a player algorithm but none was supplied")]
    MissingPlayerAlgorithm,

    #[error("enemy {agent} must use a built-in algorithm")]
    EnemyNeedsBuiltin { agent: usize },

    #[error("level has no stages")]
    NoStages,

    #[error("no agent with index {0}")]
    UnknownAgent(usize),

    #[error("no connected cell left to place agent {agent} (reference {reference:?})")]
    PlacementFailed { agent: usize, reference: Position },
}

#[derive(Debug, Error)]
pub enum LevelDataError {
    #[error("unknown level id: {0}")]
    UnknownLevel(String),

    #[error("failed to read level file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse level file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
