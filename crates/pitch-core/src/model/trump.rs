//! Trump-relative card comparisons.
//!
//! Every "what beats what" question in bidding, trick resolution, discard
//! validation and scoring goes through these functions. The trump suit is
//! always passed in; `None` means trump has not been chosen yet.

use crate::model::card::CardId;
use crate::model::rank::Rank;
use crate::model::suit::{Suit, SuitColor};

/// Rank reported for a missing card; loses every comparison.
pub const NO_CARD_RANK: i8 = -1;

const HIGH_JOKER_RANK: i8 = 13;
const LOW_JOKER_RANK: i8 = 12;
const OFF_JACK_RANK: i8 = 14;

pub fn is_trump(card: CardId, trump: Option<Suit>) -> bool {
    let Some(trump) = trump else {
        return false;
    };
    match card {
        CardId::Joker(_) => true,
        CardId::Suited { suit, .. } if suit == trump => true,
        CardId::Suited { rank, suit } => rank == Rank::Jack && suit == trump.partner(),
    }
}

/// True for the trump Jack, the off-jack and both Jokers. These may never be discarded.
pub fn is_protected(card: CardId, trump: Option<Suit>) -> bool {
    is_trump(card, trump) && (card.is_jack() || card.is_joker())
}

/// Whether the card is the Jack of the suit sharing trump's color.
pub fn is_off_jack(card: CardId, trump: Option<Suit>) -> bool {
    match (card, trump) {
        (CardId::Suited { rank: Rank::Jack, suit }, Some(trump)) => suit == trump.partner(),
        _ => false,
    }
}

/// The suit a card counts as for following and winning tricks.
pub fn effective_suit(card: CardId, trump: Option<Suit>) -> Option<Suit> {
    if is_trump(card, trump) {
        trump
    } else {
        card.suit()
    }
}

/// Comparator value. Off-suit cards use 2..=14; trump cards use the
/// 3..=18 scale A > K > Q > J > off-J > red Joker > black Joker > 10 > ... > 2.
pub fn rank(card: CardId, trump: Option<Suit>) -> i8 {
    match card {
        CardId::Joker(SuitColor::Red) => HIGH_JOKER_RANK,
        CardId::Joker(SuitColor::Black) => LOW_JOKER_RANK,
        CardId::Suited { rank, suit } => {
            if Some(suit) == trump {
                trump_suit_rank(rank)
            } else if is_off_jack(card, trump) {
                OFF_JACK_RANK
            } else {
                rank.value() as i8
            }
        }
    }
}

/// [`rank`] for a possibly missing card.
pub fn rank_or_lowest(card: Option<CardId>, trump: Option<Suit>) -> i8 {
    card.map_or(NO_CARD_RANK, |card| rank(card, trump))
}

/// Value counted toward the Game point; independent of trump.
pub const fn point_value(card: CardId) -> u32 {
    card.point_value()
}

const fn trump_suit_rank(rank: Rank) -> i8 {
    match rank {
        Rank::Ace => 18,
        Rank::King => 17,
        Rank::Queen => 16,
        Rank::Jack => 15,
        // 10 → 11 down to 2 → 3
        other => other.value() as i8 + 1,
    }
}
