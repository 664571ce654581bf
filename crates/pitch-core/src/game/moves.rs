//! Seat-submitted moves and the validator that guards them.
//!
//! Every move goes through [`apply_move`], which either returns the next
//! state or a [`MoveError`] and leaves the input untouched.

use crate::game::notice::Notice;
use crate::game::state::{FINAL_HAND_SIZE, GameState, PLAYER_COUNT, Phase};
use crate::model::bid::{Bid, MAX_BID, MIN_BID};
use crate::model::card::CardId;
use crate::model::hand;
use crate::model::player::Seat;
use crate::model::suit::Suit;
use crate::model::trick::{TRICK_SIZE, lead_suit};
use crate::model::trump::{effective_suit, is_protected};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

/// How long rule-violation notices stay on screen.
pub const MOVE_NOTICE_DISMISS: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Move {
    Bid(Bid),
    ChooseTrump(Suit),
    Discard(Vec<CardId>),
    PlayCard(CardId),
}

impl Move {
    pub const fn phase(&self) -> Phase {
        match self {
            Move::Bid(_) => Phase::Bidding,
            Move::ChooseTrump(_) => Phase::TrumpSelection,
            Move::Discard(_) => Phase::Discarding,
            Move::PlayCard(_) => Phase::Playing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("no player sits at {0}")]
    UnknownSeat(Seat),
    #[error("that move is not allowed during {actual} (expected {expected})")]
    WrongPhase { expected: Phase, actual: Phase },
    #[error("it is {turn}'s turn, not {seat}'s")]
    NotYourTurn { seat: Seat, turn: Seat },
    #[error("{0} has already bid")]
    AlreadyBid(Seat),
    #[error("bidding is closed")]
    BiddingClosed,
    #[error("bids must be between 4 and 7, got {0}")]
    BidOutOfRange(u8),
    #[error("a bid of {bid} does not raise the high bid of {high_bid}")]
    BidTooLow { bid: u8, high_bid: u8 },
    #[error("only the high bidder may choose trump")]
    NotHighBidder,
    #[error("{0} has already discarded")]
    AlreadyDiscarded(Seat),
    #[error("{0} is not in hand")]
    CardNotHeld(CardId),
    #[error("{0} was selected twice")]
    DuplicateDiscard(CardId),
    #[error("{0} is protected and cannot be discarded")]
    ProtectedDiscard(CardId),
    #[error("select at least {required} cards to discard, got {offered}")]
    TooFewDiscards { required: usize, offered: usize },
    #[error("at most {max} cards can be discarded, got {offered}")]
    TooManyDiscards { max: usize, offered: usize },
    #[error("the trick is complete")]
    TrickFull,
    #[error("you must follow suit ({lead})")]
    MustFollowSuit { lead: Suit },
}

impl MoveError {
    /// Transient message to show the seat that attempted the move.
    pub fn notice(&self) -> Notice {
        let message = match self {
            MoveError::ProtectedDiscard(_) => "Cannot discard protected cards.".to_string(),
            MoveError::TooFewDiscards { required, .. } => {
                format!("You must select at least {required} cards to discard.")
            }
            MoveError::MustFollowSuit { lead } => format!("You must follow suit ({lead})"),
            MoveError::NotYourTurn { .. } => "It's not your turn.".to_string(),
            other => other.to_string(),
        };
        Notice::new(message, Some(MOVE_NOTICE_DISMISS))
    }
}

/// Validates `mv` for `seat` and returns the resulting state. The input is never modified.
pub fn apply_move(state: &GameState, mv: &Move, seat: Seat) -> Result<GameState, MoveError> {
    state.player(seat).ok_or(MoveError::UnknownSeat(seat))?;
    if state.phase != mv.phase() {
        return Err(MoveError::WrongPhase {
            expected: mv.phase(),
            actual: state.phase,
        });
    }
    let mut next = state.clone();
    match mv {
        Move::Bid(bid) => place_bid(&mut next, seat, *bid)?,
        Move::ChooseTrump(suit) => choose_trump(&mut next, seat, *suit)?,
        Move::Discard(cards) => discard(&mut next, seat, cards)?,
        Move::PlayCard(card) => play_card(&mut next, seat, *card)?,
    }
    next.bump_version();
    Ok(next)
}

fn ensure_turn(state: &GameState, seat: Seat) -> Result<(), MoveError> {
    if state.turn != seat {
        return Err(MoveError::NotYourTurn {
            seat,
            turn: state.turn,
        });
    }
    Ok(())
}

pub fn validate_bid(state: &GameState, seat: Seat, bid: Bid) -> Result<(), MoveError> {
    if usize::from(state.bids_made) >= PLAYER_COUNT {
        return Err(MoveError::BiddingClosed);
    }
    ensure_turn(state, seat)?;
    let player = state.player(seat).ok_or(MoveError::UnknownSeat(seat))?;
    if player.has_bid {
        return Err(MoveError::AlreadyBid(seat));
    }
    if let Bid::Points(value) = bid {
        if !(MIN_BID..=MAX_BID).contains(&value) {
            return Err(MoveError::BidOutOfRange(value));
        }
        if value <= state.high_bid {
            return Err(MoveError::BidTooLow {
                bid: value,
                high_bid: state.high_bid,
            });
        }
    }
    Ok(())
}

fn place_bid(state: &mut GameState, seat: Seat, bid: Bid) -> Result<(), MoveError> {
    validate_bid(state, seat, bid)?;
    if let Some(player) = state.player_mut(seat) {
        player.bid = Some(bid);
        player.has_bid = true;
    }
    if let Bid::Points(value) = bid {
        state.high_bid = value;
        state.high_bidder = Some(seat);
    }
    state.bids_made += 1;
    state.turn = seat.next();

    if usize::from(state.bids_made) == PLAYER_COUNT {
        if let Some(bidder) = state.high_bidder {
            state.phase = Phase::WidowPickup;
            state.turn = bidder;
        }
        // An all-pass round stays in bidding until the host redeals.
    }
    Ok(())
}

fn choose_trump(state: &mut GameState, seat: Seat, suit: Suit) -> Result<(), MoveError> {
    if state.high_bidder != Some(seat) {
        return Err(MoveError::NotHighBidder);
    }
    state.trump = Some(suit);
    state.phase = Phase::Discarding;
    state.turn = Seat::North;
    state.discards_made = 0;
    Ok(())
}

/// Inclusive bounds on how many cards `seat` may discard right now.
///
/// The minimum brings the hand down to six; anything above that must be
/// refillable from the deck.
pub fn discard_bounds(state: &GameState, seat: Seat) -> (usize, usize) {
    let held = state.player(seat).map(|p| p.hand.len()).unwrap_or(0);
    let required = held.saturating_sub(FINAL_HAND_SIZE);
    let max = (required + state.deck.len()).min(held);
    (required, max)
}

/// Cards in `seat`'s hand that may be selected for discard.
pub fn discardable(state: &GameState, seat: Seat) -> Vec<CardId> {
    state
        .player(seat)
        .map(|p| {
            p.hand
                .iter()
                .map(|c| c.id)
                .filter(|id| !is_protected(*id, state.trump))
                .collect()
        })
        .unwrap_or_default()
}

pub fn validate_discard(state: &GameState, seat: Seat, cards: &[CardId]) -> Result<(), MoveError> {
    ensure_turn(state, seat)?;
    let player = state.player(seat).ok_or(MoveError::UnknownSeat(seat))?;
    if player.has_discarded {
        return Err(MoveError::AlreadyDiscarded(seat));
    }
    let mut seen = HashSet::with_capacity(cards.len());
    for card in cards {
        if !seen.insert(*card) {
            return Err(MoveError::DuplicateDiscard(*card));
        }
        if !player.holds(*card) {
            return Err(MoveError::CardNotHeld(*card));
        }
        if is_protected(*card, state.trump) {
            return Err(MoveError::ProtectedDiscard(*card));
        }
    }
    let (required, max) = discard_bounds(state, seat);
    if cards.len() < required {
        return Err(MoveError::TooFewDiscards {
            required,
            offered: cards.len(),
        });
    }
    if cards.len() > max {
        return Err(MoveError::TooManyDiscards {
            max,
            offered: cards.len(),
        });
    }
    Ok(())
}

fn discard(state: &mut GameState, seat: Seat, cards: &[CardId]) -> Result<(), MoveError> {
    validate_discard(state, seat, cards)?;
    let GameState {
        players,
        deck,
        discards,
        ..
    } = state;
    let player = players
        .get_mut(seat.index())
        .ok_or(MoveError::UnknownSeat(seat))?;
    for id in cards {
        if let Some(card) = hand::take(&mut player.hand, *id) {
            discards.push(card);
        }
    }
    while player.hand.len() < FINAL_HAND_SIZE {
        let Some(mut card) = deck.pop() else {
            break;
        };
        card.original_owner = Some(player.id.clone());
        player.hand.push(card.clone());
        player.original_hand.push(card);
    }
    player.has_discarded = true;
    state.discards_made += 1;
    state.turn = seat.next();
    Ok(())
}

pub fn validate_play(state: &GameState, seat: Seat, card: CardId) -> Result<(), MoveError> {
    ensure_turn(state, seat)?;
    if state.current_trick.len() >= TRICK_SIZE {
        return Err(MoveError::TrickFull);
    }
    let player = state.player(seat).ok_or(MoveError::UnknownSeat(seat))?;
    if !player.holds(card) {
        return Err(MoveError::CardNotHeld(card));
    }
    if let Some(lead) = lead_suit(&state.current_trick, state.trump) {
        let follows = effective_suit(card, state.trump) == Some(lead);
        if !follows && hand::holds_effective_suit(&player.hand, lead, state.trump) {
            return Err(MoveError::MustFollowSuit { lead });
        }
    }
    Ok(())
}

fn play_card(state: &mut GameState, seat: Seat, card: CardId) -> Result<(), MoveError> {
    validate_play(state, seat, card)?;
    let player = state
        .player_mut(seat)
        .ok_or(MoveError::UnknownSeat(seat))?;
    let mut played = hand::take(&mut player.hand, card).ok_or(MoveError::CardNotHeld(card))?;
    played.player = Some(player.id.clone());
    if state.current_trick.is_empty() {
        state.trick_leader = Some(seat);
    }
    state.current_trick.push(played);
    state.turn = seat.next();
    Ok(())
}

/// Bids `seat` may make now; empty when it is not their turn to bid.
pub fn legal_bids(state: &GameState, seat: Seat) -> Vec<Bid> {
    if state.phase != Phase::Bidding || validate_bid(state, seat, Bid::Pass).is_err() {
        return Vec::new();
    }
    Bid::legal_over(state.high_bid)
}

/// Cards `seat` may play now, in hand order.
pub fn legal_plays(state: &GameState, seat: Seat) -> Vec<CardId> {
    if state.phase != Phase::Playing {
        return Vec::new();
    }
    state
        .player(seat)
        .map(|p| {
            p.hand
                .iter()
                .map(|c| c.id)
                .filter(|id| validate_play(state, seat, *id).is_ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Every move `seat` could submit now. Discards are represented by the
/// single minimal discard of the first eligible cards.
pub fn legal_moves(state: &GameState, seat: Seat) -> Vec<Move> {
    match state.phase {
        Phase::Bidding => legal_bids(state, seat).into_iter().map(Move::Bid).collect(),
        Phase::TrumpSelection if state.high_bidder == Some(seat) => {
            Suit::ALL.iter().copied().map(Move::ChooseTrump).collect()
        }
        Phase::Discarding => {
            let (required, _) = discard_bounds(state, seat);
            let picks: Vec<CardId> = discardable(state, seat).into_iter().take(required).collect();
            if validate_discard(state, seat, &picks).is_ok() {
                vec![Move::Discard(picks)]
            } else {
                Vec::new()
            }
        }
        Phase::Playing => legal_plays(state, seat)
            .into_iter()
            .map(Move::PlayCard)
            .collect(),
        _ => Vec::new(),
    }
}

/// The seat whose move is awaited, if any player move is pending.
pub fn awaiting_seat(state: &GameState) -> Option<Seat> {
    match state.phase {
        Phase::Bidding if usize::from(state.bids_made) < PLAYER_COUNT => Some(state.turn),
        Phase::TrumpSelection => state.high_bidder,
        Phase::Discarding if usize::from(state.discards_made) < PLAYER_COUNT => Some(state.turn),
        Phase::Playing if state.current_trick.len() < TRICK_SIZE => Some(state.turn),
        _ => None,
    }
}
