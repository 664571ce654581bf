use crate::game::state::{GameState, Phase};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A transient, non-blocking message for the table (a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    /// `None` keeps the message up until it is replaced.
    pub dismiss_after: Option<Duration>,
}

impl Notice {
    pub fn new(message: impl Into<String>, dismiss_after: Option<Duration>) -> Self {
        Self {
            message: message.into(),
            dismiss_after,
        }
    }

    pub fn sticky(message: impl Into<String>) -> Self {
        Self::new(message, None)
    }
}

/// Status line describing what the table is waiting on.
pub fn status(state: &GameState) -> Notice {
    let name = |seat| {
        state
            .player(seat)
            .map(|p| p.name.clone())
            .unwrap_or_default()
    };
    match state.phase {
        Phase::Lobby => Notice::sticky("Waiting for host to start the game..."),
        Phase::Bidding if state.bids_made >= 4 => {
            Notice::new("All players passed. Redealing...", Some(Duration::from_millis(2000)))
        }
        Phase::Bidding => {
            let opening = state
                .high_bidder
                .map(|seat| format!(" High bid: {} by {}.", state.high_bid, name(seat)))
                .unwrap_or_default();
            Notice::sticky(format!("{}'s turn to bid.{opening}", name(state.turn)))
        }
        Phase::WidowPickup => Notice::new(
            format!("{} takes the widow...", name(state.turn)),
            Some(Duration::from_millis(1500)),
        ),
        Phase::TrumpSelection => Notice::sticky(format!("{} is choosing trump...", name(state.turn))),
        Phase::Discarding if state.discards_made >= 4 => Notice::sticky("Play starts soon..."),
        Phase::Discarding => Notice::sticky(format!("{} is discarding...", name(state.turn))),
        Phase::Playing => Notice::sticky(format!("{}'s turn to play.", name(state.turn))),
        Phase::Scoring => Notice::new(
            "Round over! Calculating scores...",
            Some(Duration::from_millis(2000)),
        ),
        Phase::RoundEnd => Notice::sticky("Round complete."),
        Phase::GameOver => match state.winner() {
            Some(team) => Notice::sticky(format!("Game over! {team} wins.")),
            None => Notice::sticky("Game over!"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{Notice, status};
    use crate::game::state::{GameState, Phase};
    use crate::model::player::{Player, PlayerId};

    #[test]
    fn lobby_status_is_sticky() {
        let state = GameState::new_lobby(Player::human(PlayerId::new("h"), "Host"));
        assert_eq!(status(&state).dismiss_after, None);
    }

    #[test]
    fn bidding_status_names_the_seat() {
        let mut state = GameState::new_lobby(Player::human(PlayerId::new("h"), "Ada"));
        state.phase = Phase::Bidding;
        assert_eq!(status(&state), Notice::sticky("Ada's turn to bid."));
    }

    #[test]
    fn playing_status_names_the_seat_to_act() {
        let mut state = GameState::new_lobby(Player::human(PlayerId::new("h"), "Ada"));
        state.phase = Phase::Playing;
        assert_eq!(status(&state).message, "Ada's turn to play.");
    }
}
