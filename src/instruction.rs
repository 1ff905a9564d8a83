use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::agent::Agent;
use crate::algorithms::{InstructionData, Libraries};
use crate::error::{InstructionError, Phase};
use crate::rng::Rng;
use crate::types::{Command, Position};
use crate::world::World;

pub fn available_commands(world: &World, position: Position) -> Vec<Command> {
    Command::ALL
        .into_iter()
        .filter(|command| world.is_ground_at(command.apply(position)))
        .collect()
}

pub fn build_instruction_data(
    world: &World,
    position: Position,
    available: &[Command],
    previous_commands: &[Command],
    enemy_positions: &[Position],
) -> InstructionData {
    InstructionData {
        available_commands: available.to_vec(),
        position,
        previous_commands: previous_commands.to_vec(),
        enemy_positions: enemy_positions.to_vec(),
        world: world.info(),
    }
}

/// On failure the agent is left exactly as it was.
pub fn resolve_instruction(
    agent: &mut Agent,
    world: &World,
    rng: &mut Rng,
    enemy_positions: &[Position],
    duration_ms: u64,
) -> Result<Command, InstructionError> {
    let position = agent.position().ok_or(InstructionError::NotPlaced)?;
    let available = available_commands(world, position);
    let data = build_instruction_data(world, position, &available, agent.history(), enemy_positions);
    let algorithm_name = agent.algorithm_name().to_string();

    let outcome = {
        let mut libraries = Libraries::new(rng, world);
        let algorithm = agent.algorithm_mut();
        panic::catch_unwind(AssertUnwindSafe(|| algorithm.instruction(data, &mut libraries)))
    };

    let command = match outcome {
        Ok(Ok(command)) => command,
        Ok(Err(fault)) => {
            return Err(algorithm_fault(Phase::Instruction, algorithm_name, fault.message));
        }
        Err(payload) => {
            return Err(algorithm_fault(
                Phase::Instruction,
                algorithm_name,
                panic_message(payload.as_ref()),
            ));
        }
    };

    if !available.contains(&command) {
        warn!(
            algorithm = %algorithm_name,
            ?command,
            ?available,
            "algorithm returned an unavailable command"
        );
        return Err(InstructionError::UnavailableCommand { command, available });
    }

    let to = agent
        .commit(command, duration_ms)
        .ok_or(InstructionError::NotPlaced)?;
    debug!(
        algorithm = %algorithm_name,
        command = command.as_str(),
        x = to.x,
        y = to.y,
        "instruction resolved"
    );
    Ok(command)
}

pub fn run_setup(agent: &mut Agent, world: &World) -> Result<(), InstructionError> {
    let info = world.info();
    let algorithm_name = agent.algorithm_name().to_string();
    let algorithm = agent.algorithm_mut();
    match panic::catch_unwind(AssertUnwindSafe(|| algorithm.setup(&info))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(fault)) => Err(algorithm_fault(Phase::Setup, algorithm_name, fault.message)),
        Err(payload) => Err(algorithm_fault(
            Phase::Setup,
            algorithm_name,
            panic_message(payload.as_ref()),
        )),
    }
}

fn algorithm_fault(phase: Phase, algorithm: String, message: String) -> InstructionError {
    warn!(%phase, %algorithm, %message, "algorithm fault");
    InstructionError::AlgorithmFault {
        phase,
        algorithm,
        message,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "algorithm panicked".to_string()
}
