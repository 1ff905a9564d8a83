use chrono::{SecondsFormat, Utc};
use clap::Parser;
use dungeon_pursuit::algorithms::BuiltinAlgorithm;
use dungeon_pursuit::constants::{DEFAULT_FRAME_MS, DEFAULT_MAX_LEVEL_MS};
use dungeon_pursuit::error::LevelDataError;
use dungeon_pursuit::level::Level;
use dungeon_pursuit::levels::{level_data, load_level_file, resolve_level, LevelData, LevelId};
use dungeon_pursuit::rng::Rng;
use dungeon_pursuit::types::{LevelOutcome, RuntimeEvent};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value = "one")]
    level: String,
    #[arg(long)]
    level_file: Option<PathBuf>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "random-movement")]
    player: String,
    #[arg(long)]
    frame_ms: Option<u64>,
    #[arg(long)]
    max_ms: Option<u64>,
    #[arg(long)]
    campaign: bool,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct LevelPlan {
    name: String,
    id: Option<LevelId>,
    data: LevelData,
    seed: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct LevelResultLine {
    level: String,
    seed: u32,
    player: String,
    outcome: String,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    ticks: u64,
    #[serde(rename = "stageReached")]
    stage_reached: usize,
    instructions: u64,
    collisions: usize,
    teleports: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "levelCount")]
    level_count: usize,
    #[serde(rename = "faultCount")]
    fault_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    levels: Vec<LevelResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let started_at = now_rfc3339();
    let seed = cli
        .seed
        .map(normalize_seed)
        .unwrap_or_else(|| Rng::from_entropy().seed_used());
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed, now_ms()));

    let Some(player) = BuiltinAlgorithm::parse(&cli.player) else {
        emit_log(
            "error",
            "unknown_player_algorithm",
            &match_id,
            None,
            None,
            None,
            json!({
                "player": cli.player,
                "known": BuiltinAlgorithm::ALL.map(BuiltinAlgorithm::as_str),
            }),
        );
        std::process::exit(2);
    };

    let mut plan = match resolve_first_plan(&cli, seed) {
        Ok(plan) => plan,
        Err(error) => {
            emit_log(
                "error",
                "level_load_failed",
                &match_id,
                None,
                Some(seed),
                None,
                json!({ "error": error.to_string() }),
            );
            std::process::exit(2);
        }
    };
    let frame_ms = cli.frame_ms.unwrap_or(DEFAULT_FRAME_MS).max(1);
    let max_ms = cli.max_ms.unwrap_or(DEFAULT_MAX_LEVEL_MS);

    let mut results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration_ms = 0u64;

    loop {
        emit_log(
            "info",
            "level_started",
            &match_id,
            Some(&plan.name),
            Some(plan.seed),
            None,
            json!({
                "player": player.as_str(),
                "enemies": plan.data.enemies.len(),
                "stages": plan.data.stages.len(),
                "frameMs": frame_ms,
            }),
        );
        let (line, finished_tick, outcome) = run_level(&plan, player, frame_ms, max_ms);

        if let Some(error) = line.error.as_ref() {
            emit_log(
                "warn",
                "level_faulted",
                &match_id,
                Some(&plan.name),
                Some(plan.seed),
                Some(finished_tick),
                json!({ "error": error }),
            );
        }
        emit_log(
            "info",
            "level_finished",
            &match_id,
            Some(&plan.name),
            Some(plan.seed),
            Some(finished_tick),
            json!({
                "outcome": line.outcome,
                "durationMs": line.duration_ms,
                "instructions": line.instructions,
            }),
        );

        total_duration_ms += line.duration_ms;
        *outcome_counts.entry(line.outcome.clone()).or_insert(0) += 1;
        match serde_json::to_string(&line) {
            Ok(text) => println!("{text}"),
            Err(error) => tracing::error!(%error, "failed to serialize level result"),
        }
        results.push(line);

        if !cli.campaign {
            break;
        }
        let Some(next) = next_in_campaign(plan.id, &plan.data, outcome) else {
            break;
        };
        plan = LevelPlan {
            name: next.as_str().to_string(),
            id: Some(next),
            data: level_data(next),
            seed: plan.seed.wrapping_add(1),
        };
    }

    let summary = build_run_summary(
        match_id.clone(),
        started_at,
        now_rfc3339(),
        results,
        outcome_counts,
        total_duration_ms,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "levelCount": summary.level_count,
            "faultCount": summary.fault_count,
            "averageDurationMs": summary.average_duration_ms,
            "outcomeCounts": summary.outcome_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if summary.fault_count > 0 {
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn resolve_first_plan(cli: &Cli, seed: u32) -> Result<LevelPlan, LevelDataError> {
    if let Some(path) = cli.level_file.as_ref() {
        let data = load_level_file(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| "custom".to_string());
        return Ok(LevelPlan {
            name,
            id: None,
            data,
            seed,
        });
    }
    let data = resolve_level(&cli.level)?;
    Ok(LevelPlan {
        name: cli.level.clone(),
        id: LevelId::parse(&cli.level),
        data,
        seed,
    })
}

fn run_level(
    plan: &LevelPlan,
    player: BuiltinAlgorithm,
    frame_ms: u64,
    max_ms: u64,
) -> (LevelResultLine, u64, Option<LevelOutcome>) {
    let mut line = LevelResultLine {
        level: plan.name.clone(),
        seed: plan.seed,
        player: player.as_str().to_string(),
        outcome: outcome_key(Some(LevelOutcome::Faulted)),
        duration_ms: 0,
        ticks: 0,
        stage_reached: 0,
        instructions: 0,
        collisions: 0,
        teleports: 0,
        error: None,
    };

    let mut level = match Level::new(plan.data.clone(), plan.seed, Some(Box::new(player))) {
        Ok(level) => level,
        Err(error) => {
            line.error = Some(error.to_string());
            return (line, 0, Some(LevelOutcome::Faulted));
        }
    };

    while !level.is_ended() && level.elapsed_ms() < max_ms {
        let stepped = level.step(frame_ms);
        let snapshot = level.build_snapshot(true);
        line.collisions += snapshot
            .events
            .iter()
            .filter(|event| matches!(event, RuntimeEvent::Collision { .. }))
            .count();
        if let Err(error) = stepped {
            line.error = Some(error.to_string());
            break;
        }
    }

    let summary = level.build_summary();
    // Placement failures stop the run without ending the level.
    let outcome = match (summary.outcome, line.error.is_some()) {
        (None, true) => Some(LevelOutcome::Faulted),
        (outcome, _) => outcome,
    };
    line.outcome = outcome_key(outcome);
    line.duration_ms = summary.duration_ms;
    line.ticks = summary.ticks;
    line.stage_reached = summary.stage;
    line.instructions = summary.instructions;
    line.teleports = summary.teleports;
    (line, summary.ticks, outcome)
}

fn next_in_campaign(
    current: Option<LevelId>,
    data: &LevelData,
    outcome: Option<LevelOutcome>,
) -> Option<LevelId> {
    if outcome != Some(LevelOutcome::Survived) {
        return None;
    }
    data.next_level.filter(|next| Some(*next) != current)
}

fn outcome_key(outcome: Option<LevelOutcome>) -> String {
    match outcome {
        Some(LevelOutcome::Survived) => "survived",
        Some(LevelOutcome::Caught) => "caught",
        Some(LevelOutcome::Faulted) => "faulted",
        None => "timeout",
    }
    .to_string()
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at: String,
    finished_at: String,
    levels: Vec<LevelResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    total_duration_ms: u64,
) -> RunSummary {
    let level_count = levels.len();
    let fault_count = levels.iter().filter(|line| line.outcome == "faulted").count();
    let average_duration_ms = if level_count == 0 {
        0
    } else {
        total_duration_ms / level_count as u64
    };
    RunSummary {
        match_id,
        started_at,
        finished_at,
        level_count,
        fault_count,
        average_duration_ms,
        outcome_counts,
        levels,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: now_rfc3339(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(text) => eprintln!("{text}"),
        Err(error) => tracing::error!(%error, event, "failed to serialize structured log"),
    }
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
