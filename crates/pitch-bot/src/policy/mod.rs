mod heuristic;

pub use heuristic::HeuristicPolicy;

use pitch_core::game::moves::{Move, awaiting_seat};
use pitch_core::game::state::{GameState, Phase};
use pitch_core::model::bid::Bid;
use pitch_core::model::card::{Card, CardId};
use pitch_core::model::player::Seat;
use pitch_core::model::suit::Suit;

/// Context provided to policies for decision-making
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    pub seat: Seat,
    pub state: &'a GameState,
}

impl<'a> PolicyContext<'a> {
    pub fn new(seat: Seat, state: &'a GameState) -> Self {
        Self { seat, state }
    }

    pub fn hand(&self) -> &'a [Card] {
        self.state
            .player(self.seat)
            .map(|p| p.hand.as_slice())
            .unwrap_or(&[])
    }
}

/// Pluggable decision-maker for a seat. Whatever it returns is submitted
/// through the same validation as a human move.
pub trait Policy: Send {
    fn choose_bid(&mut self, ctx: &PolicyContext) -> Bid;

    /// Called only for the high bidder once the widow is absorbed.
    fn choose_trump(&mut self, ctx: &PolicyContext) -> Suit;

    fn choose_discards(&mut self, ctx: &PolicyContext) -> Vec<CardId>;

    /// `None` only when the seat holds no playable card.
    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<CardId>;

    /// The move owed by `ctx.seat` in the current phase, if any.
    fn decide(&mut self, ctx: &PolicyContext) -> Option<Move> {
        if awaiting_seat(ctx.state) != Some(ctx.seat) {
            return None;
        }
        match ctx.state.phase {
            Phase::Bidding => Some(Move::Bid(self.choose_bid(ctx))),
            Phase::TrumpSelection => Some(Move::ChooseTrump(self.choose_trump(ctx))),
            Phase::Discarding => Some(Move::Discard(self.choose_discards(ctx))),
            Phase::Playing => self.choose_play(ctx).map(Move::PlayCard),
            _ => None,
        }
    }
}
