use super::{BotContext, best_suit};
use pitch_core::model::bid::Bid;

pub struct BidPlanner;

impl BidPlanner {
    /// Bids what the strongest suit supports, or passes when that would not raise.
    pub fn choose(ctx: &BotContext<'_>) -> Bid {
        let (_, strength) = best_suit(ctx.hand());
        match bid_for_strength(strength) {
            Some(points) if Bid::Points(points).is_legal_over(ctx.state.high_bid) => {
                Bid::Points(points)
            }
            _ => Bid::Pass,
        }
    }
}

pub(crate) fn bid_for_strength(strength: f32) -> Option<u8> {
    if strength > 12.0 {
        Some(6)
    } else if strength > 10.0 {
        Some(5)
    } else if strength > 8.0 {
        Some(4)
    } else {
        None
    }
}
