pub mod deal;
pub mod host;
pub mod invariants;
pub mod lobby;
pub mod moves;
pub mod notice;
pub mod schedule;
pub mod scoring;
pub mod serialization;
pub mod session;
pub mod state;
pub mod transport;

pub use host::{HostAction, HostError, apply_host_action, pending_host_action};
pub use moves::{Move, MoveError, apply_move, legal_bids, legal_moves, legal_plays};
pub use session::{GameSession, SessionConfig, SessionError};
pub use state::{GameState, Phase};
