//! Delayed transitions as explicit values.
//!
//! A [`ScheduledTask`] remembers the version and phase it was issued for.
//! When it fires against a newer document it must be dropped, never applied.

use crate::game::host::{HostAction, pending_host_action};
use crate::game::moves::awaiting_seat;
use crate::game::state::{GameState, Phase};
use crate::model::player::Seat;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Every delay the table observes, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    pub trick_display_ms: u64,
    pub widow_pickup_ms: u64,
    pub play_countdown_ms: u64,
    pub redeal_ms: u64,
    pub scoring_ms: u64,
    pub next_round_ms: u64,
    pub ai_think_ms: u64,
    pub ai_jitter_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            trick_display_ms: 2000,
            widow_pickup_ms: 1500,
            play_countdown_ms: 3000,
            redeal_ms: 2000,
            scoring_ms: 1500,
            next_round_ms: 3000,
            ai_think_ms: 1000,
            ai_jitter_ms: 500,
        }
    }
}

impl Timings {
    /// No delays at all; used by simulations and tests.
    pub fn instant() -> Self {
        Self {
            trick_display_ms: 0,
            widow_pickup_ms: 0,
            play_countdown_ms: 0,
            redeal_ms: 0,
            scoring_ms: 0,
            next_round_ms: 0,
            ai_think_ms: 0,
            ai_jitter_ms: 0,
        }
    }

    pub fn host_delay(&self, action: HostAction) -> Duration {
        let ms = match action {
            HostAction::Redeal => self.redeal_ms,
            HostAction::AbsorbWidow => self.widow_pickup_ms,
            HostAction::BeginPlay => self.play_countdown_ms,
            HostAction::ResolveTrick => self.trick_display_ms,
            HostAction::ScoreHand => self.scoring_ms,
            HostAction::StartNextRound => self.next_round_ms,
            HostAction::StartGame | HostAction::ResetToLobby => 0,
        };
        Duration::from_millis(ms)
    }

    /// Thinking time for an AI seat: the base delay plus uniform jitter.
    pub fn ai_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let jitter = if self.ai_jitter_ms == 0 {
            0
        } else {
            rng.gen_range(0..=self.ai_jitter_ms)
        };
        Duration::from_millis(self.ai_think_ms + jitter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum TaskKind {
    Host(HostAction),
    AiTurn(Seat),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub kind: TaskKind,
    pub issued_for_version: u64,
    pub phase: Phase,
    pub delay: Duration,
}

impl ScheduledTask {
    pub fn new(kind: TaskKind, state: &GameState, delay: Duration) -> Self {
        Self {
            kind,
            issued_for_version: state.version,
            phase: state.phase,
            delay,
        }
    }

    /// Whether `state` is still the document this task was issued against.
    pub fn is_current(&self, state: &GameState) -> bool {
        self.issued_for_version == state.version && self.phase == state.phase
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Applied { version: u64 },
    Stale,
}

/// The next delayed transition the host should arm for `state`, if any.
///
/// Host transitions take precedence; otherwise an AI seat that owes a move
/// gets a thinking delay.
pub fn next_task<R: Rng + ?Sized>(
    state: &GameState,
    timings: &Timings,
    rng: &mut R,
) -> Option<ScheduledTask> {
    if let Some(action) = pending_host_action(state) {
        return Some(ScheduledTask::new(
            TaskKind::Host(action),
            state,
            timings.host_delay(action),
        ));
    }
    let seat = awaiting_seat(state)?;
    let player = state.player(seat)?;
    if !player.is_ai {
        return None;
    }
    Some(ScheduledTask::new(
        TaskKind::AiTurn(seat),
        state,
        timings.ai_delay(rng),
    ))
}

#[cfg(test)]
mod tests {
    use super::{ScheduledTask, TaskKind, Timings, next_task};
    use crate::game::host::{HostAction, apply_host_action};
    use crate::game::state::{GameState, Phase};
    use crate::model::player::{Player, PlayerId, Seat};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    #[test]
    fn defaults_match_table_pacing() {
        let timings = Timings::default();
        assert_eq!(timings.host_delay(HostAction::ResolveTrick), Duration::from_millis(2000));
        assert_eq!(timings.host_delay(HostAction::AbsorbWidow), Duration::from_millis(1500));
        assert_eq!(timings.host_delay(HostAction::BeginPlay), Duration::from_millis(3000));
    }

    #[test]
    fn ai_delay_stays_within_jitter() {
        let timings = Timings::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let delay = timings.ai_delay(&mut rng);
            assert!(delay >= Duration::from_millis(1000));
            assert!(delay <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn partial_timings_fill_from_defaults() {
        let timings: Timings = serde_json::from_str(r#"{"trick_display_ms": 10}"#).unwrap();
        assert_eq!(timings.trick_display_ms, 10);
        assert_eq!(timings.widow_pickup_ms, 1500);
    }

    #[test]
    fn task_goes_stale_when_version_moves() {
        let state = GameState::new_lobby(Player::human(PlayerId::new("h"), "H"));
        let task = ScheduledTask::new(
            TaskKind::Host(HostAction::StartGame),
            &state,
            Duration::ZERO,
        );
        assert!(task.is_current(&state));
        let mut moved = state.clone();
        moved.version += 1;
        assert!(!task.is_current(&moved));
        let mut rephased = state;
        rephased.phase = Phase::Bidding;
        assert!(!task.is_current(&rephased));
    }

    #[test]
    fn ai_seat_gets_a_turn_task_and_humans_do_not() {
        let mut rng = StdRng::seed_from_u64(2);
        let lobby = GameState::new_lobby(Player::human(PlayerId::new("h"), "H"));
        let state = apply_host_action(&lobby, HostAction::StartGame, &mut rng).unwrap();
        // The host sits North and bids first.
        assert_eq!(next_task(&state, &Timings::instant(), &mut rng), None);

        let mut east_turn = state.clone();
        east_turn.turn = Seat::East;
        let task = next_task(&east_turn, &Timings::instant(), &mut rng).unwrap();
        assert_eq!(task.kind, TaskKind::AiTurn(Seat::East));
        assert_eq!(task.issued_for_version, east_turn.version);
    }
}
