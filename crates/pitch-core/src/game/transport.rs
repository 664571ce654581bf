//! The shared-document service the table synchronises through.
//!
//! Every write names the version it was based on; the store refuses writes
//! based on anything older than what it holds.

use crate::game::state::GameState;
use core::fmt;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked with every accepted document.
pub type UpdateListener = Arc<dyn Fn(&GameState) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("game {0} does not exist")]
    UnknownGame(GameId),
    #[error("stale write: based on version {expected}, store holds {actual}")]
    VersionConflict { expected: u64, actual: u64 },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

impl TransportError {
    /// Whether repeating the same write may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Unavailable(_))
    }
}

pub trait StateTransport: Send + Sync {
    fn create_game(&self, initial: GameState) -> Result<GameId, TransportError>;

    /// Registers `listener`; it is called immediately with the current document
    /// and then after every accepted write.
    fn subscribe(
        &self,
        game: &GameId,
        listener: UpdateListener,
    ) -> Result<SubscriptionId, TransportError>;

    fn unsubscribe(&self, game: &GameId, subscription: SubscriptionId);

    /// Replaces the document with `next` if the store still holds `expected_version`.
    /// Returns the version now stored.
    fn apply_update(
        &self,
        game: &GameId,
        expected_version: u64,
        next: GameState,
    ) -> Result<u64, TransportError>;

    fn fetch(&self, game: &GameId) -> Result<GameState, TransportError>;
}

struct Document {
    state: GameState,
    listeners: Vec<(SubscriptionId, UpdateListener)>,
}

/// Process-local transport. Listeners run on the writer's thread after the
/// store lock has been released.
#[derive(Default)]
pub struct InMemoryTransport {
    games: RwLock<HashMap<GameId, Mutex<Document>>>,
    next_game: AtomicU64,
    next_subscription: AtomicU64,
    failures_pending: AtomicUsize,
}

impl fmt::Debug for InMemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTransport")
            .field("games", &self.games.read().len())
            .finish()
    }
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` writes fail with [`TransportError::Unavailable`].
    pub fn fail_next_writes(&self, count: usize) {
        self.failures_pending.store(count, Ordering::SeqCst);
    }

    fn take_injected_failure(&self) -> bool {
        self.failures_pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl StateTransport for InMemoryTransport {
    fn create_game(&self, initial: GameState) -> Result<GameId, TransportError> {
        let n = self.next_game.fetch_add(1, Ordering::SeqCst) + 1;
        let id = GameId::new(format!("game-{n}"));
        self.games.write().insert(
            id.clone(),
            Mutex::new(Document {
                state: initial,
                listeners: Vec::new(),
            }),
        );
        Ok(id)
    }

    fn subscribe(
        &self,
        game: &GameId,
        listener: UpdateListener,
    ) -> Result<SubscriptionId, TransportError> {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::SeqCst));
        let current = {
            let games = self.games.read();
            let doc = games
                .get(game)
                .ok_or_else(|| TransportError::UnknownGame(game.clone()))?;
            let mut doc = doc.lock();
            doc.listeners.push((id, Arc::clone(&listener)));
            doc.state.clone()
        };
        listener(&current);
        Ok(id)
    }

    fn unsubscribe(&self, game: &GameId, subscription: SubscriptionId) {
        let games = self.games.read();
        if let Some(doc) = games.get(game) {
            doc.lock().listeners.retain(|(id, _)| *id != subscription);
        }
    }

    fn apply_update(
        &self,
        game: &GameId,
        expected_version: u64,
        next: GameState,
    ) -> Result<u64, TransportError> {
        if self.take_injected_failure() {
            return Err(TransportError::Unavailable("injected failure".to_string()));
        }
        let (listeners, snapshot) = {
            let games = self.games.read();
            let doc = games
                .get(game)
                .ok_or_else(|| TransportError::UnknownGame(game.clone()))?;
            let mut doc = doc.lock();
            if doc.state.version != expected_version {
                return Err(TransportError::VersionConflict {
                    expected: expected_version,
                    actual: doc.state.version,
                });
            }
            doc.state = next;
            let listeners: Vec<UpdateListener> =
                doc.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (listeners, doc.state.clone())
        };
        for listener in listeners {
            listener(&snapshot);
        }
        Ok(snapshot.version)
    }

    fn fetch(&self, game: &GameId) -> Result<GameState, TransportError> {
        let games = self.games.read();
        let doc = games
            .get(game)
            .ok_or_else(|| TransportError::UnknownGame(game.clone()))?;
        let state = doc.lock().state.clone();
        Ok(state)
    }
}
