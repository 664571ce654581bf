use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pitch_bot::{BotDifficulty, HeuristicPolicy, Policy, PolicyContext};
use pitch_core::game::host::HostAction;
use pitch_core::game::moves::{Move, awaiting_seat};
use pitch_core::game::notice::status;
use pitch_core::game::schedule::{TaskKind, TaskOutcome};
use pitch_core::game::session::{GameSession, SessionConfig, SessionError};
use pitch_core::game::state::{GameState, Phase};
use pitch_core::game::transport::{InMemoryTransport, StateTransport};
use pitch_core::model::player::{Player, PlayerId, Seat};
use pitch_core::model::team::TeamId;
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AgentSummary, AnalyticsCollector, AnalyticsError};
use crate::config::{AgentConfig, ResolvedOutputs, SEAT_COUNT, SimConfig};

const HOST_ID: &str = "sim-host";

/// Plays configured games through a host session and an in-memory transport.
pub struct GameRunner {
    config: SimConfig,
    outputs: ResolvedOutputs,
    logging_enabled: bool,
}

/// Summary details returned after a run.
pub struct RunSummary {
    pub games_played: usize,
    pub hands_played: usize,
    pub unfinished: usize,
    pub rows_written: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub agents: Vec<AgentSummary>,
}

impl GameRunner {
    /// Build a runner from a validated configuration.
    pub fn new(config: SimConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        if config.agents.len() != SEAT_COUNT {
            return Err(RunnerError::SeatCount {
                found: config.agents.len(),
            });
        }

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
        })
    }

    /// Execute every game, streaming JSONL rows to disk.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);
        let mut hands_played = 0usize;
        let mut unfinished = 0usize;

        for game_index in 0..self.config.games.count {
            let game_seed = rng.next_u64();
            let outcome = self.play_game(game_index, game_seed)?;
            analytics.record_game(&outcome)?;
            hands_played += outcome.hands_played;
            if outcome.winner.is_none() {
                unfinished += 1;
            }
            rows_written += write_game_rows(&mut writer, &self.config.run_id, &outcome)?;
        }

        writer.flush()?;
        analytics.write_markdown(&self.config.run_id, &self.outputs.summary_md)?;

        Ok(RunSummary {
            games_played: self.config.games.count,
            hands_played,
            unfinished,
            rows_written,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            agents: analytics.agents().to_vec(),
        })
    }

    fn play_game(&self, game_index: usize, game_seed: u64) -> Result<GameOutcome, RunnerError> {
        let transport: Arc<dyn StateTransport> = Arc::new(InMemoryTransport::new());
        let session_config = SessionConfig {
            timings: self.config.timings.clone(),
            seed: Some(game_seed),
            ..SessionConfig::default()
        };
        let host = Player::human(PlayerId::new(HOST_ID), "Host");
        let mut session = GameSession::host(transport, host, session_config)?;
        session.host_action(HostAction::StartGame)?;

        let mut seats = build_seats(game_index, &self.config.agents);
        let mut hands_played = 0usize;
        let mut steps = 0usize;

        loop {
            let state = session.state();
            if state.phase == Phase::GameOver {
                break;
            }
            if steps >= self.config.games.max_steps {
                event!(
                    target: "pitch_sim::runner",
                    Level::WARN,
                    run_id = %self.config.run_id,
                    game_index = game_index as u32,
                    steps = steps as u64,
                    phase = %state.phase,
                    waiting_on = %status(&state).message,
                    "step limit reached; abandoning game"
                );
                break;
            }
            steps += 1;

            if let Some(task) = session.next_task() {
                if self.config.realtime && !task.delay.is_zero() {
                    thread::sleep(task.delay);
                }
                let scoring = task.kind == TaskKind::Host(HostAction::ScoreHand);
                let outcome =
                    session.run_task(&task, |state, seat| seats[seat.index()].decide(state, seat))?;
                if scoring && matches!(outcome, TaskOutcome::Applied { .. }) {
                    let scored = session.state();
                    record_contract(&scored, &mut seats);
                    hands_played += 1;
                    event!(
                        target: "pitch_sim::runner",
                        Level::DEBUG,
                        run_id = %self.config.run_id,
                        game_index = game_index as u32,
                        hand = hands_played as u64,
                        scores = ?[scored.teams[0].score, scored.teams[1].score],
                        status = %status(&scored).message,
                        "hand scored"
                    );
                }
                continue;
            }

            // Nothing scheduled: the host's own seat owes a move.
            let seat = awaiting_seat(&state).ok_or_else(|| {
                RunnerError::game(format!(
                    "game stalled in {} at version {}",
                    state.phase, state.version
                ))
            })?;
            let mv = seats[seat.index()].decide(&state, seat).ok_or_else(|| {
                RunnerError::game(format!("no move produced for {seat} in {}", state.phase))
            })?;
            session.submit_as(seat, mv)?;
        }

        let final_state = session.state();
        let winner = final_state.winner();
        let mut results = Vec::with_capacity(SEAT_COUNT);
        for driver in seats {
            let team = final_state.team_of_seat(driver.seat).ok_or_else(|| {
                RunnerError::game(format!("{} finished without a team", driver.seat))
            })?;
            results.push(SeatResult {
                seat: driver.seat,
                agent: driver.agent,
                difficulty: driver.difficulty,
                team,
                team_score: final_state.team(team).score,
                contracts: driver.contracts,
                contracts_made: driver.contracts_made,
                metrics: driver.metrics.finalize(),
            });
        }

        if self.logging_enabled {
            event!(
                target: "pitch_sim::runner",
                Level::INFO,
                run_id = %self.config.run_id,
                game_index = game_index as u32,
                game_seed,
                winner = ?winner,
                hands_played = hands_played as u64,
                steps = steps as u64,
                version = final_state.version,
                "game finished"
            );
        }

        Ok(GameOutcome {
            game_index,
            game_seed,
            winner,
            hands_played,
            steps,
            seats: results,
        })
    }
}

/// Seat `i` is driven by agent `(i + game_index) % 4`, so every agent visits every seat.
fn build_seats(game_index: usize, agents: &[AgentConfig]) -> Vec<SeatDriver> {
    Seat::LOOP
        .into_iter()
        .zip(agents.iter().cycle().skip(game_index % SEAT_COUNT))
        .map(|(seat, agent)| SeatDriver::new(seat, agent))
        .collect()
}

fn record_contract(state: &GameState, seats: &mut [SeatDriver]) {
    let Some(results) = state.last_round_results.as_ref() else {
        return;
    };
    let Some(bidder) = results.bidder else {
        return;
    };
    if let Some(driver) = seats.get_mut(bidder.index()) {
        driver.contracts += 1;
        if !results.set {
            driver.contracts_made += 1;
        }
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    run_id: &str,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let game_id = format!("G{:05}", outcome.game_index);

    let mut rows_written = 0usize;
    for seat in &outcome.seats {
        let row = GameLogRow {
            run_id: run_id.to_string(),
            game_id: game_id.clone(),
            game_index: outcome.game_index,
            game_seed: outcome.game_seed,
            seat: seat_label(seat.seat),
            agent: seat.agent.clone(),
            difficulty: seat.difficulty,
            team: seat.team,
            team_score: seat.team_score,
            won: outcome.winner == Some(seat.team),
            finished: outcome.winner.is_some(),
            hands_played: outcome.hands_played,
            steps: outcome.steps,
            contracts: seat.contracts,
            contracts_made: seat.contracts_made,
            decisions: seat.metrics.decisions,
            speed_ms_decision: seat.metrics.avg_ms_per_decision,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

fn seat_label(seat: Seat) -> &'static str {
    match seat {
        Seat::North => "north",
        Seat::East => "east",
        Seat::South => "south",
        Seat::West => "west",
    }
}

struct SeatDriver {
    seat: Seat,
    agent: String,
    difficulty: BotDifficulty,
    policy: Box<dyn Policy>,
    metrics: DecisionMetrics,
    contracts: usize,
    contracts_made: usize,
}

impl SeatDriver {
    fn new(seat: Seat, agent: &AgentConfig) -> Self {
        Self {
            seat,
            agent: agent.name.clone(),
            difficulty: agent.difficulty,
            policy: Box::new(HeuristicPolicy::new(agent.difficulty)),
            metrics: DecisionMetrics::default(),
            contracts: 0,
            contracts_made: 0,
        }
    }

    fn decide(&mut self, state: &GameState, seat: Seat) -> Option<Move> {
        let start = Instant::now();
        let mv = self.policy.decide(&PolicyContext::new(seat, state));
        self.metrics.record(start.elapsed());
        mv
    }
}

pub struct GameOutcome {
    pub game_index: usize,
    pub game_seed: u64,
    pub winner: Option<TeamId>,
    pub hands_played: usize,
    pub steps: usize,
    pub seats: Vec<SeatResult>,
}

pub struct SeatResult {
    pub seat: Seat,
    pub agent: String,
    pub difficulty: BotDifficulty,
    pub team: TeamId,
    pub team_score: i32,
    pub contracts: usize,
    pub contracts_made: usize,
    pub metrics: DecisionSummary,
}

#[derive(Default)]
struct DecisionMetrics {
    total: Duration,
    decisions: u32,
}

impl DecisionMetrics {
    fn record(&mut self, duration: Duration) {
        self.total += duration;
        self.decisions += 1;
    }

    fn finalize(self) -> DecisionSummary {
        let avg_ms = if self.decisions == 0 {
            0.0
        } else {
            self.total.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        };

        DecisionSummary {
            decisions: self.decisions,
            avg_ms_per_decision: avg_ms,
            total_ms: self.total.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

#[derive(Serialize)]
struct GameLogRow {
    run_id: String,
    game_id: String,
    game_index: usize,
    game_seed: u64,
    seat: &'static str,
    agent: String,
    difficulty: BotDifficulty,
    team: TeamId,
    team_score: i32,
    won: bool,
    finished: bool,
    hands_played: usize,
    steps: usize,
    contracts: usize,
    contracts_made: usize,
    decisions: u32,
    speed_ms_decision: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("session error: {0}")]
    Session(#[from] SessionError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {message}")]
    Game { message: String },
    #[error("configuration requires exactly 4 agents but found {found}")]
    SeatCount { found: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

impl RunnerError {
    fn game(message: String) -> Self {
        RunnerError::Game { message }
    }
}
