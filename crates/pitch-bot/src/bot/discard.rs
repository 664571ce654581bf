use super::{BotContext, card_sort_key};
use pitch_core::game::moves::{discard_bounds, discardable};
use pitch_core::model::card::{Card, CardId};
use pitch_core::model::rank::Rank;
use pitch_core::model::suit::Suit;
use pitch_core::model::trump::is_trump;

pub struct DiscardPlanner;

impl DiscardPlanner {
    /// The bidder sheds down to six. Everyone else keeps only what is worth
    /// keeping and redraws the rest, as far as the deck allows.
    pub fn choose(ctx: &BotContext<'_>) -> Vec<CardId> {
        let hand = ctx.hand();
        let trump = ctx.trump();
        let (required, max) = discard_bounds(ctx.state, ctx.seat);
        let wanted = if ctx.is_bidder() {
            required
        } else {
            hand.len().saturating_sub(keep_count(hand, trump))
        };
        let count = wanted.max(required).min(max);

        let mut candidates = discardable(ctx.state, ctx.seat);
        candidates.sort_by_key(|card| discard_value(*card, trump));
        candidates.truncate(count);
        candidates
    }
}

/// Cards a defender holds on to: more with a longer trump holding.
pub(crate) fn keep_count(hand: &[Card], trump: Option<Suit>) -> usize {
    let trumps = hand.iter().filter(|c| is_trump(c.id, trump)).count();
    let side_aces = hand
        .iter()
        .filter(|c| c.id.rank() == Some(Rank::Ace) && !is_trump(c.id, trump))
        .count();
    match trumps {
        n if n >= 4 => 5,
        3 => 4,
        2 if side_aces > 0 => 4,
        2 => 3,
        _ => 2,
    }
}

fn discard_value(card: CardId, trump: Option<Suit>) -> i32 {
    let ace = if card.rank() == Some(Rank::Ace) { 5 } else { 0 };
    card_sort_key(card, trump) + ace
}
