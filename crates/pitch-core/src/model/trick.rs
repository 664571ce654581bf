use crate::model::card::{Card, CardId};
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trump::{effective_suit, is_trump, rank};

pub const TRICK_SIZE: usize = 4;

/// Effective suit of the lead card; the suit every later play must follow.
pub fn lead_suit(trick: &[Card], trump: Option<Suit>) -> Option<Suit> {
    trick.first().and_then(|card| effective_suit(card.id, trump))
}

/// Whether `challenger` takes the trick away from `current`.
pub fn beats(challenger: CardId, current: CardId, lead: Option<Suit>, trump: Option<Suit>) -> bool {
    match (is_trump(challenger, trump), is_trump(current, trump)) {
        (true, true) => rank(challenger, trump) > rank(current, trump),
        (true, false) => true,
        (false, true) => false,
        (false, false) => {
            effective_suit(challenger, trump) == lead
                && rank(challenger, trump) > rank(current, trump)
        }
    }
}

/// Position within `trick` of the card currently winning it. Works on partial tricks.
pub fn winning_offset(trick: &[Card], trump: Option<Suit>) -> Option<usize> {
    let lead = lead_suit(trick, trump);
    let mut best = 0usize;
    let first = trick.first()?;
    let mut best_card = first.id;
    for (offset, card) in trick.iter().enumerate().skip(1) {
        if beats(card.id, best_card, lead, trump) {
            best = offset;
            best_card = card.id;
        }
    }
    Some(best)
}

/// Winning seat of a complete trick led by `leader`.
pub fn trick_winner(trick: &[Card], leader: Seat, trump: Option<Suit>) -> Option<Seat> {
    if trick.len() != TRICK_SIZE {
        return None;
    }
    winning_offset(trick, trump).map(|offset| leader.advance(offset))
}

pub fn trick_point_value(trick: &[Card]) -> u32 {
    trick.iter().map(Card::point_value).sum()
}
