use std::fs;
use std::path::Path;

use pitch_bot::BotDifficulty;
use serde::Serialize;
use thiserror::Error;

use crate::config::SimConfig;
use crate::runner::GameOutcome;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' appears in results but missing from configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Running totals for one configured agent across every seat it occupied.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub name: String,
    pub difficulty: BotDifficulty,
    pub games: usize,
    pub wins: usize,
    pub final_score_total: i64,
    pub contracts: usize,
    pub contracts_made: usize,
    pub decisions: u64,
    pub total_ms: f64,
}

impl AgentSummary {
    fn new(name: String, difficulty: BotDifficulty) -> Self {
        Self {
            name,
            difficulty,
            games: 0,
            wins: 0,
            final_score_total: 0,
            contracts: 0,
            contracts_made: 0,
            decisions: 0,
            total_ms: 0.0,
        }
    }

    pub fn win_rate(&self) -> f64 {
        ratio(self.wins, self.games)
    }

    pub fn avg_final_score(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.final_score_total as f64 / self.games as f64
        }
    }

    pub fn make_rate(&self) -> f64 {
        ratio(self.contracts_made, self.contracts)
    }

    pub fn avg_ms_per_decision(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.total_ms / self.decisions as f64
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

pub struct AnalyticsCollector {
    agents: Vec<AgentSummary>,
    games: usize,
    hands: usize,
    unfinished: usize,
}

impl AnalyticsCollector {
    pub fn new(config: &SimConfig) -> Self {
        let agents = config
            .agents
            .iter()
            .map(|agent| AgentSummary::new(agent.name.clone(), agent.difficulty))
            .collect();
        Self {
            agents,
            games: 0,
            hands: 0,
            unfinished: 0,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        self.games += 1;
        self.hands += outcome.hands_played;
        if outcome.winner.is_none() {
            self.unfinished += 1;
        }
        for seat in &outcome.seats {
            let summary = self
                .agents
                .iter_mut()
                .find(|a| a.name == seat.agent)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent.clone()))?;
            summary.games += 1;
            if outcome.winner.is_some() && outcome.winner == Some(seat.team) {
                summary.wins += 1;
            }
            summary.final_score_total += i64::from(seat.team_score);
            summary.contracts += seat.contracts;
            summary.contracts_made += seat.contracts_made;
            summary.decisions += u64::from(seat.metrics.decisions);
            summary.total_ms += seat.metrics.total_ms;
        }
        Ok(())
    }

    pub fn agents(&self) -> &[AgentSummary] {
        &self.agents
    }

    pub fn write_markdown(&self, run_id: &str, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut rows = String::new();
        rows.push_str(&format!("# Table Summary: {run_id}\n\n"));
        rows.push_str(&format!(
            "Games: {} ({} unfinished), hands scored: {}\n\n",
            self.games, self.unfinished, self.hands
        ));
        rows.push_str("| Agent | Difficulty | Games | Win % | Avg final score | Contracts | Made % | Avg ms/decision |\n");
        rows.push_str("|-------|------------|-------|-------|-----------------|-----------|--------|-----------------|\n");

        for agent in &self.agents {
            rows.push_str(&format!(
                "| {name} | {difficulty} | {games} | {win:.1}% | {score:.2} | {contracts} | {made:.1}% | {latency:.3} |\n",
                name = agent.name,
                difficulty = agent.difficulty,
                games = agent.games,
                win = agent.win_rate() * 100.0,
                score = agent.avg_final_score(),
                contracts = agent.contracts,
                made = agent.make_rate() * 100.0,
                latency = agent.avg_ms_per_decision(),
            ));
        }

        fs::write(path.as_ref(), rows).map_err(|e| AnalyticsError::Io {
            context: "writing summary markdown",
            source: e,
        })?;
        Ok(())
    }
}
