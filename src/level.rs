use tracing::{debug, info};

use crate::agent::{is_colliding, Agent};
use crate::algorithms::MovementAlgorithm;
use crate::constants::{MIN_ENEMY_SPAWN_DISTANCE, PLAYER_SPAWN, TELEPORT_ATTEMPTS};
use crate::error::LevelError;
use crate::instruction::{resolve_instruction, run_setup};
use crate::levels::{CollisionPolicy, LevelData, LevelId, Stage, StageDuration};
use crate::pathfinding::is_connected;
use crate::rng::Rng;
use crate::types::{
    AgentView, LevelOutcome, LevelSnapshot, LevelSummary, Position, RuntimeEvent,
};
use crate::world::{generate_world, World};

const PLAYER: usize = 0;

pub struct Level {
    data: LevelData,
    world: World,
    rng: Rng,
    agents: Vec<Agent>,
    spawn: Position,
    stage: usize,
    tick: u64,
    elapsed_ms: u64,
    time_since_stage_start: u64,
    time_since_last_instruction: u64,
    instructions: u64,
    teleports: u64,
    outcome: Option<LevelOutcome>,
    events: Vec<RuntimeEvent>,
}

impl Level {
    pub fn new(
        data: LevelData,
        seed: u32,
        player_algorithm: Option<Box<dyn MovementAlgorithm>>,
    ) -> Result<Self, LevelError> {
        let mut rng = Rng::new(seed);
        let world = generate_world(&mut rng);
        Self::with_world(data, world, rng, player_algorithm)
    }

    pub fn with_world(
        data: LevelData,
        world: World,
        rng: Rng,
        player_algorithm: Option<Box<dyn MovementAlgorithm>>,
    ) -> Result<Self, LevelError> {
        if data.stages.is_empty() {
            return Err(LevelError::NoStages);
        }

        let player_algorithm: Box<dyn MovementAlgorithm> = match data.player.algorithm.builtin() {
            Some(builtin) => Box::new(builtin),
            None => player_algorithm.ok_or(LevelError::MissingPlayerAlgorithm)?,
        };
        let mut agents = vec![Agent::new(data.player.character, false, player_algorithm)];
        for (offset, enemy) in data.enemies.iter().enumerate() {
            let agent = offset + 1;
            let builtin = enemy
                .algorithm
                .builtin()
                .ok_or(LevelError::EnemyNeedsBuiltin { agent })?;
            agents.push(Agent::new(enemy.character, true, Box::new(builtin)));
        }

        let spawn = if world.is_ground_at(PLAYER_SPAWN) {
            PLAYER_SPAWN
        } else {
            world
                .ground_cells()
                .first()
                .copied()
                .ok_or(LevelError::PlacementFailed {
                    agent: PLAYER,
                    reference: PLAYER_SPAWN,
                })?
        };

        let mut level = Self {
            data,
            world,
            rng,
            agents,
            spawn,
            stage: 0,
            tick: 0,
            elapsed_ms: 0,
            time_since_stage_start: 0,
            time_since_last_instruction: 0,
            instructions: 0,
            teleports: 0,
            outcome: None,
            events: Vec::new(),
        };

        level.agents[PLAYER].teleport_to(spawn);
        for idx in 1..level.agents.len() {
            let at = level.find_placement(idx)?;
            level.agents[idx].teleport_to(at);
        }
        for (idx, agent) in level.agents.iter_mut().enumerate() {
            run_setup(agent, &level.world)
                .map_err(|source| LevelError::Instruction { agent: idx, source })?;
        }

        info!(
            seed = level.rng.seed_used(),
            player = level.agents[PLAYER].kind.as_str(),
            agents = level.agents.len(),
            stages = level.data.stages.len(),
            "level started"
        );
        Ok(level)
    }

    pub fn is_ended(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<LevelOutcome> {
        self.outcome
    }

    pub fn next_level(&self) -> Option<LevelId> {
        self.data.next_level
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn seed(&self) -> u32 {
        self.rng.seed_used()
    }

    /// Advances the level by one frame.
    ///
    /// Order within a frame: stage timers, interpolation, collision, then
    /// one instruction per agent (player first) once the stage interval has
    /// been exceeded. Frames after the level has ended are ignored.
    pub fn step(&mut self, dt_ms: u64) -> Result<(), LevelError> {
        if self.is_ended() {
            return Ok(());
        }
        self.tick += 1;
        self.elapsed_ms += dt_ms;
        self.time_since_stage_start += dt_ms;
        self.time_since_last_instruction += dt_ms;

        self.update_stage();
        if self.is_ended() {
            return Ok(());
        }

        let since_instruction = self.time_since_last_instruction;
        for agent in &mut self.agents {
            agent.update(since_instruction);
        }

        self.resolve_collisions()?;
        if self.is_ended() {
            return Ok(());
        }

        let Some(stage) = self.current_stage() else {
            return Ok(());
        };
        if self.time_since_last_instruction > stage.instruction_every_ms {
            self.time_since_last_instruction = 0;
            self.run_instructions(stage.instruction_every_ms)?;
        }
        Ok(())
    }

    pub fn teleport_agent(&mut self, idx: usize) -> Result<Position, LevelError> {
        let to = self.find_placement(idx)?;
        self.agents[idx].teleport_to(to);
        self.teleports += 1;
        self.events.push(RuntimeEvent::Teleported { agent: idx, to });
        info!(
            agent = idx,
            kind = self.agents[idx].kind.as_str(),
            x = to.x,
            y = to.y,
            "agent teleported"
        );
        Ok(to)
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> LevelSnapshot {
        let agents = self
            .agents
            .iter()
            .enumerate()
            .map(|(index, agent)| AgentView {
                index,
                kind: agent.kind,
                hostile: agent.hostile,
                position: agent.position(),
                real_position: agent.real_position(),
                last_command: agent.last_command(),
                command_count: agent.history().len(),
            })
            .collect();
        let snapshot = LevelSnapshot {
            tick: self.tick,
            elapsed_ms: self.elapsed_ms,
            stage: self.stage,
            agents,
            outcome: self.outcome,
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> LevelSummary {
        LevelSummary {
            outcome: self.outcome,
            duration_ms: self.elapsed_ms,
            ticks: self.tick,
            stage: self.stage,
            instructions: self.instructions,
            teleports: self.teleports,
        }
    }

    fn current_stage(&self) -> Option<Stage> {
        self.data.stages.get(self.stage).copied()
    }

    fn update_stage(&mut self) {
        let Some(stage) = self.current_stage() else {
            return;
        };
        let StageDuration::Millis(duration_ms) = stage.duration else {
            return;
        };
        if self.time_since_stage_start <= duration_ms {
            return;
        }

        let next = self.stage + 1;
        if next >= self.data.stages.len() {
            self.end(LevelOutcome::Survived);
            return;
        }
        self.stage = next;
        self.time_since_stage_start = 0;
        let instruction_every_ms = self.data.stages[next].instruction_every_ms;
        self.events.push(RuntimeEvent::StageAdvanced {
            stage: next,
            instruction_every_ms,
        });
        info!(stage = next, instruction_every_ms, "stage advanced");
    }

    fn resolve_collisions(&mut self) -> Result<(), LevelError> {
        let Some(player) = self.agents.get(PLAYER) else {
            return Ok(());
        };
        let hit = self
            .agents
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, agent)| agent.hostile != player.hostile && is_colliding(player, agent))
            .map(|(idx, _)| idx);
        let Some(enemy) = hit else {
            return Ok(());
        };

        self.events.push(RuntimeEvent::Collision { enemy });
        match self.data.on_collision {
            CollisionPolicy::Teleport => {
                if let Err(error) = self.teleport_agent(PLAYER) {
                    self.end(LevelOutcome::Faulted);
                    return Err(error);
                }
            }
            CollisionPolicy::Die => self.end(LevelOutcome::Caught),
        }
        Ok(())
    }

    fn run_instructions(&mut self, duration_ms: u64) -> Result<(), LevelError> {
        for idx in 0..self.agents.len() {
            let enemies = self.opposing_positions(self.agents[idx].hostile);
            let resolved = resolve_instruction(
                &mut self.agents[idx],
                &self.world,
                &mut self.rng,
                &enemies,
                duration_ms,
            );
            match resolved {
                Ok(command) => {
                    self.instructions += 1;
                    if let Some(to) = self.agents[idx].position() {
                        self.events.push(RuntimeEvent::InstructionResolved {
                            agent: idx,
                            command,
                            to,
                        });
                    }
                }
                Err(source) => {
                    self.events.push(RuntimeEvent::InstructionFailed {
                        agent: idx,
                        message: source.to_string(),
                    });
                    self.end(LevelOutcome::Faulted);
                    return Err(LevelError::Instruction { agent: idx, source });
                }
            }
        }
        Ok(())
    }

    fn opposing_positions(&self, hostile: bool) -> Vec<Position> {
        self.agents
            .iter()
            .filter(|agent| agent.hostile != hostile)
            .filter_map(Agent::position)
            .collect()
    }

    fn find_placement(&mut self, idx: usize) -> Result<Position, LevelError> {
        let hostile = self
            .agents
            .get(idx)
            .map(|agent| agent.hostile)
            .ok_or(LevelError::UnknownAgent(idx))?;
        let opponents = self.opposing_positions(hostile);
        let far_enough = |cell: Position| {
            opponents
                .iter()
                .all(|opponent| opponent.manhattan(cell) >= MIN_ENEMY_SPAWN_DISTANCE)
        };

        for _ in 0..TELEPORT_ATTEMPTS {
            let cell = Position::new(
                self.rng.floor_range(0, self.world.width),
                self.rng.floor_range(0, self.world.height),
            );
            if far_enough(cell) && self.is_placeable(cell, &opponents) {
                return Ok(cell);
            }
        }

        // Scan every cell, then give up on the distance requirement.
        let cells = self.world.ground_cells();
        for keep_distance in [true, false] {
            for &cell in &cells {
                if (!keep_distance || far_enough(cell)) && self.is_placeable(cell, &opponents) {
                    debug!(agent = idx, keep_distance, "placement fell back to scan");
                    return Ok(cell);
                }
            }
        }

        Err(LevelError::PlacementFailed {
            agent: idx,
            reference: self.spawn,
        })
    }

    fn is_placeable(&mut self, cell: Position, opponents: &[Position]) -> bool {
        if !self.world.is_ground_at(cell) || opponents.contains(&cell) {
            return false;
        }
        let world = &self.world;
        is_connected(cell, self.spawn, |x, y| world.is_ground(x, y), &mut self.rng)
    }

    fn end(&mut self, outcome: LevelOutcome) {
        if self.outcome.is_some() {
            return;
        }
        self.outcome = Some(outcome);
        self.events.push(RuntimeEvent::LevelEnded { outcome });
        info!(
            ?outcome,
            elapsed_ms = self.elapsed_ms,
            tick = self.tick,
            instructions = self.instructions,
            "level ended"
        );
    }
}
