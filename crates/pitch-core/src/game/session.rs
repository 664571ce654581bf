//! One participant's view of a shared game.
//!
//! A session never trusts its own writes: the local snapshot only changes when
//! the transport echoes an accepted document back (or on an explicit resync).

use crate::game::host::{HostAction, HostError, apply_host_action};
use crate::game::invariants::InvariantViolation;
use crate::game::lobby::{self, LobbyError};
use crate::game::moves::{Move, MoveError, apply_move};
use crate::game::notice::Notice;
use crate::game::schedule::{ScheduledTask, TaskKind, TaskOutcome, Timings, next_task};
use crate::game::state::GameState;
use crate::game::transport::{GameId, StateTransport, SubscriptionId, TransportError};
use crate::model::bid::Bid;
use crate::model::card::CardId;
use crate::model::player::{Player, PlayerId, Seat};
use crate::model::suit::Suit;
use crate::model::team::TeamId;
use parking_lot::RwLock;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Extra attempts after a retryable transport failure.
    pub max_retries: u32,
    pub timings: Timings,
    /// Seeds the host's shuffles; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timings: Timings::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Lobby(#[from] LobbyError),
    #[error("refusing to publish corrupt state: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{actor} may not act for {seat}")]
    NotAuthorized { actor: PlayerId, seat: Seat },
    #[error("only the host may do that")]
    NotHost,
    #[error("{0} is not seated at this table")]
    NotSeated(PlayerId),
}

impl SessionError {
    pub fn notice(&self) -> Notice {
        match self {
            SessionError::Move(err) => err.notice(),
            SessionError::Transport(TransportError::VersionConflict { .. }) => Notice::new(
                "The table changed before your move arrived. Please try again.",
                Some(Duration::from_millis(3000)),
            ),
            other => Notice::new(other.to_string(), Some(Duration::from_millis(3000))),
        }
    }
}

pub struct GameSession {
    transport: Arc<dyn StateTransport>,
    game: GameId,
    actor: PlayerId,
    latest: Arc<RwLock<GameState>>,
    subscription: SubscriptionId,
    config: SessionConfig,
    rng: StdRng,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("game", &self.game)
            .field("actor", &self.actor)
            .field("version", &self.latest.read().version)
            .finish()
    }
}

impl GameSession {
    /// Creates a new lobby hosted by `host` and attaches to it.
    pub fn host(
        transport: Arc<dyn StateTransport>,
        host: Player,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let actor = host.id.clone();
        let game = transport.create_game(GameState::new_lobby(host))?;
        event!(target: "pitch_core::session", Level::INFO, game = %game, host = %actor, "game created");
        Self::attach(transport, game, actor, config)
    }

    /// Attaches to an existing game as `actor`.
    pub fn attach(
        transport: Arc<dyn StateTransport>,
        game: GameId,
        actor: PlayerId,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let latest = Arc::new(RwLock::new(transport.fetch(&game)?));
        let sink = Arc::clone(&latest);
        let subscription = transport.subscribe(
            &game,
            Arc::new(move |state: &GameState| {
                let mut latest = sink.write();
                if state.version >= latest.version {
                    *latest = state.clone();
                }
            }),
        )?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            transport,
            game,
            actor,
            latest,
            subscription,
            config,
            rng,
        })
    }

    pub fn game_id(&self) -> &GameId {
        &self.game
    }

    pub fn actor(&self) -> &PlayerId {
        &self.actor
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The most recent authoritative document this session has observed.
    pub fn state(&self) -> GameState {
        self.latest.read().clone()
    }

    pub fn is_host(&self) -> bool {
        self.latest.read().is_host(&self.actor)
    }

    pub fn seat(&self) -> Option<Seat> {
        self.latest.read().seat_of(&self.actor)
    }

    /// Re-reads the document from the transport.
    pub fn resync(&self) -> Result<GameState, SessionError> {
        let fresh = self.transport.fetch(&self.game)?;
        let mut latest = self.latest.write();
        if fresh.version >= latest.version {
            *latest = fresh.clone();
        }
        Ok(fresh)
    }

    pub fn join_lobby(&mut self, name: &str) -> Result<u64, SessionError> {
        let state = self.state();
        let next = lobby::add_player(&state, self.actor.clone(), name)?;
        if next.version == state.version {
            return Ok(state.version);
        }
        self.commit(&state, next)
    }

    pub fn choose_team(&mut self, team: TeamId) -> Result<u64, SessionError> {
        let state = self.state();
        let next = lobby::choose_team(&state, &self.actor, team)?;
        self.commit(&state, next)
    }

    pub fn submit_bid(&mut self, bid: Bid) -> Result<u64, SessionError> {
        self.submit_own(Move::Bid(bid))
    }

    pub fn submit_trump_choice(&mut self, suit: Suit) -> Result<u64, SessionError> {
        self.submit_own(Move::ChooseTrump(suit))
    }

    pub fn submit_discard(&mut self, cards: Vec<CardId>) -> Result<u64, SessionError> {
        self.submit_own(Move::Discard(cards))
    }

    pub fn submit_play(&mut self, card: CardId) -> Result<u64, SessionError> {
        self.submit_own(Move::PlayCard(card))
    }

    fn submit_own(&mut self, mv: Move) -> Result<u64, SessionError> {
        let seat = self
            .seat()
            .ok_or_else(|| SessionError::NotSeated(self.actor.clone()))?;
        self.submit_as(seat, mv)
    }

    /// Submits `mv` for `seat`. Allowed for the seat's own player, or for the
    /// host acting on behalf of an AI seat.
    pub fn submit_as(&mut self, seat: Seat, mv: Move) -> Result<u64, SessionError> {
        let state = self.state();
        let occupant = state.player(seat).ok_or(MoveError::UnknownSeat(seat))?;
        let allowed =
            occupant.id == self.actor || (occupant.is_ai && state.is_host(&self.actor));
        if !allowed {
            return Err(SessionError::NotAuthorized {
                actor: self.actor.clone(),
                seat,
            });
        }
        let next = match apply_move(&state, &mv, seat) {
            Ok(next) => next,
            Err(err) => {
                event!(
                    target: "pitch_core::session",
                    Level::DEBUG,
                    seat = %seat,
                    phase = %state.phase,
                    error = %err,
                    "move rejected"
                );
                return Err(err.into());
            }
        };
        event!(target: "pitch_core::session", Level::DEBUG, seat = %seat, ?mv, "move accepted");
        self.commit(&state, next)
    }

    /// Runs a host-only transition immediately.
    pub fn host_action(&mut self, action: HostAction) -> Result<u64, SessionError> {
        let state = self.state();
        if !state.is_host(&self.actor) {
            return Err(SessionError::NotHost);
        }
        let next = apply_host_action(&state, action, &mut self.rng)?;
        self.commit(&state, next)
    }

    /// The delayed transition this session should arm next. Only the host
    /// schedules anything.
    pub fn next_task(&mut self) -> Option<ScheduledTask> {
        if !self.is_host() {
            return None;
        }
        let state = self.state();
        next_task(&state, &self.config.timings, &mut self.rng)
    }

    /// Fires `task` unless the document has moved on since it was issued.
    /// AI turns ask `decide` for the seat's move.
    pub fn run_task<F>(&mut self, task: &ScheduledTask, decide: F) -> Result<TaskOutcome, SessionError>
    where
        F: FnOnce(&GameState, Seat) -> Option<Move>,
    {
        let state = self.state();
        if !task.is_current(&state) {
            event!(
                target: "pitch_core::session",
                Level::DEBUG,
                issued_for = task.issued_for_version,
                current = state.version,
                "dropping stale task"
            );
            return Ok(TaskOutcome::Stale);
        }
        let version = match task.kind {
            TaskKind::Host(action) => self.host_action(action)?,
            TaskKind::AiTurn(seat) => {
                let Some(mv) = decide(&state, seat) else {
                    return Ok(TaskOutcome::Stale);
                };
                self.submit_as(seat, mv)?
            }
        };
        Ok(TaskOutcome::Applied { version })
    }

    fn commit(&mut self, base: &GameState, next: GameState) -> Result<u64, SessionError> {
        if let Err(violation) = next.check_invariants() {
            event!(
                target: "pitch_core::session",
                Level::ERROR,
                game = %self.game,
                version = base.version,
                error = %violation,
                "invariant violated; write aborted"
            );
            return Err(violation.into());
        }
        let mut attempt = 0;
        loop {
            match self
                .transport
                .apply_update(&self.game, base.version, next.clone())
            {
                Ok(version) => return Ok(version),
                Err(err @ TransportError::VersionConflict { .. }) => {
                    event!(
                        target: "pitch_core::session",
                        Level::WARN,
                        game = %self.game,
                        error = %err,
                        "stale write rejected; resyncing"
                    );
                    self.resync()?;
                    return Err(err.into());
                }
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    event!(
                        target: "pitch_core::session",
                        Level::WARN,
                        game = %self.game,
                        attempt,
                        error = %err,
                        "transport write failed; retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.transport.unsubscribe(&self.game, self.subscription);
    }
}
