use super::{BotContext, card_sort_key};
use pitch_core::model::card::{Card, CardId};
use pitch_core::model::trick::{beats, lead_suit, winning_offset};
use pitch_core::model::trump::{is_protected, rank};

pub struct PlayPlanner;

impl PlayPlanner {
    /// Leads the strongest card. When following: wins as cheaply as possible,
    /// feeds a point card to a winning partner, and otherwise sheds the lowest.
    pub fn choose(legal: &[CardId], ctx: &BotContext<'_>) -> Option<CardId> {
        let trump = ctx.trump();
        let trick = &ctx.state.current_trick;
        let Some(winning) = winning_offset(trick, trump).and_then(|i| trick.get(i)) else {
            return legal
                .iter()
                .copied()
                .max_by_key(|card| card_sort_key(*card, trump));
        };
        let lead = lead_suit(trick, trump);

        let cheapest_winner = legal
            .iter()
            .copied()
            .filter(|card| beats(*card, winning.id, lead, trump))
            .min_by_key(|card| rank(*card, trump));
        if cheapest_winner.is_some() {
            return cheapest_winner;
        }

        if partner_is_winning(ctx, winning) {
            let gift = legal
                .iter()
                .copied()
                .filter(|card| is_protected(*card, trump))
                .max_by_key(|card| rank(*card, trump));
            if gift.is_some() {
                return gift;
            }
        }

        legal.iter().copied().min_by_key(|card| rank(*card, trump))
    }
}

fn partner_is_winning(ctx: &BotContext<'_>, winning: &Card) -> bool {
    let Some(owner) = winning.player.as_ref() else {
        return false;
    };
    ctx.team().is_some() && ctx.state.team_of_player(owner) == ctx.team()
}
