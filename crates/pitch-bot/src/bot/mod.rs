mod bid;
mod discard;
mod play;

pub use bid::BidPlanner;
pub use discard::DiscardPlanner;
pub use play::PlayPlanner;

use core::fmt;
use core::str::FromStr;
use pitch_core::game::state::GameState;
use pitch_core::model::card::{Card, CardId};
use pitch_core::model::player::Seat;
use pitch_core::model::rank::Rank;
use pitch_core::model::suit::Suit;
use pitch_core::model::team::TeamId;
use pitch_core::model::trump::{is_trump, rank};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotDifficulty {
    Easy,
    Normal,
}

impl Default for BotDifficulty {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bot difficulty `{0}` (expected easy or normal)")]
pub struct ParseDifficultyError(String);

impl FromStr for BotDifficulty {
    type Err = ParseDifficultyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" | "legacy" => Ok(BotDifficulty::Easy),
            "normal" | "default" => Ok(BotDifficulty::Normal),
            other => Err(ParseDifficultyError(other.to_string())),
        }
    }
}

impl fmt::Display for BotDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BotDifficulty {
    pub const fn as_str(self) -> &'static str {
        match self {
            BotDifficulty::Easy => "easy",
            BotDifficulty::Normal => "normal",
        }
    }

    pub fn from_env() -> Self {
        static CACHED: OnceLock<BotDifficulty> = OnceLock::new();
        *CACHED.get_or_init(|| {
            std::env::var("PITCH_BOT_DIFFICULTY")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or_default()
        })
    }
}

/// Read-only view of the table from one seat.
#[derive(Debug, Clone, Copy)]
pub struct BotContext<'a> {
    pub seat: Seat,
    pub state: &'a GameState,
    pub difficulty: BotDifficulty,
}

impl<'a> BotContext<'a> {
    pub fn new(seat: Seat, state: &'a GameState, difficulty: BotDifficulty) -> Self {
        Self {
            seat,
            state,
            difficulty,
        }
    }

    pub fn hand(&self) -> &'a [Card] {
        self.state
            .player(self.seat)
            .map(|p| p.hand.as_slice())
            .unwrap_or(&[])
    }

    pub fn trump(&self) -> Option<Suit> {
        self.state.trump
    }

    pub fn team(&self) -> Option<TeamId> {
        self.state.team_of_seat(self.seat)
    }

    pub fn is_bidder(&self) -> bool {
        self.state.high_bidder == Some(self.seat)
    }
}

/// How much `hand` is worth if `suit` were trump.
pub(crate) fn evaluate_suit(hand: &[Card], suit: Suit) -> f32 {
    let trump = Some(suit);
    hand.iter()
        .map(|card| {
            if is_trump(card.id, trump) {
                match card.id {
                    CardId::Joker(_) => 4.0,
                    CardId::Suited { rank, .. } => match rank {
                        Rank::Jack => 3.5,
                        Rank::Ace | Rank::King => 2.0,
                        Rank::Two | Rank::Three => 0.5,
                        _ => 1.0,
                    },
                }
            } else if card.id.rank() == Some(Rank::Ace) {
                1.5
            } else {
                0.0
            }
        })
        .sum()
}

/// The suit `hand` is strongest in, with its evaluation. Ties keep the earlier suit.
pub(crate) fn best_suit(hand: &[Card]) -> (Suit, f32) {
    let mut best = (Suit::ALL[0], f32::MIN);
    for suit in Suit::ALL {
        let score = evaluate_suit(hand, suit);
        if score > best.1 {
            best = (suit, score);
        }
    }
    best
}

/// Trump cards above everything else, then the trump-relative rank.
pub(crate) fn card_sort_key(card: CardId, trump: Option<Suit>) -> i32 {
    let base = if is_trump(card, trump) { 100 } else { 0 };
    base + i32::from(rank(card, trump))
}
