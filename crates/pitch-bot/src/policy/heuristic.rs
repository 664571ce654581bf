use super::{Policy, PolicyContext};
use crate::bot::{BidPlanner, BotContext, BotDifficulty, DiscardPlanner, PlayPlanner, best_suit};
use core::fmt;
use pitch_core::game::moves::{discard_bounds, discardable, legal_plays};
use pitch_core::model::bid::{Bid, MIN_BID};
use pitch_core::model::card::CardId;
use pitch_core::model::suit::Suit;
use pitch_core::model::trump::is_trump;
use tracing::{Level, event};

/// Adapter that wraps the bid/discard/play planners to implement the Policy trait
pub struct HeuristicPolicy {
    difficulty: BotDifficulty,
}

impl HeuristicPolicy {
    pub fn new(difficulty: BotDifficulty) -> Self {
        Self { difficulty }
    }

    pub fn easy() -> Self {
        Self::new(BotDifficulty::Easy)
    }

    pub fn normal() -> Self {
        Self::new(BotDifficulty::Normal)
    }

    pub fn difficulty(&self) -> BotDifficulty {
        self.difficulty
    }

    fn bot_context<'a>(&self, ctx: &PolicyContext<'a>) -> BotContext<'a> {
        BotContext::new(ctx.seat, ctx.state, self.difficulty)
    }
}

impl Default for HeuristicPolicy {
    fn default() -> Self {
        Self::new(BotDifficulty::from_env())
    }
}

impl Policy for HeuristicPolicy {
    fn choose_bid(&mut self, ctx: &PolicyContext) -> Bid {
        if self.difficulty == BotDifficulty::Easy {
            let bid = if ctx.state.high_bid == 0 {
                Bid::Points(MIN_BID)
            } else {
                Bid::Pass
            };
            log_decision(ctx, self.difficulty, "bid", &bid, "easy_open_minimum");
            return bid;
        }

        let bid = BidPlanner::choose(&self.bot_context(ctx));
        log_decision(ctx, self.difficulty, "bid", &bid, "suit_strength");
        bid
    }

    fn choose_trump(&mut self, ctx: &PolicyContext) -> Suit {
        let hand = ctx.hand();
        if self.difficulty == BotDifficulty::Easy {
            let suit = Suit::ALL
                .into_iter()
                .max_by_key(|suit| hand.iter().filter(|c| is_trump(c.id, Some(*suit))).count())
                .unwrap_or(Suit::Spades);
            log_decision(ctx, self.difficulty, "trump", &suit, "easy_longest_trump");
            return suit;
        }

        let (suit, _) = best_suit(hand);
        log_decision(ctx, self.difficulty, "trump", &suit, "suit_strength");
        suit
    }

    fn choose_discards(&mut self, ctx: &PolicyContext) -> Vec<CardId> {
        if self.difficulty == BotDifficulty::Easy {
            let (required, _) = discard_bounds(ctx.state, ctx.seat);
            let cards: Vec<CardId> = discardable(ctx.state, ctx.seat)
                .into_iter()
                .take(required)
                .collect();
            log_decision(
                ctx,
                self.difficulty,
                "discard",
                &CardList(&cards),
                "easy_first_required",
            );
            return cards;
        }

        let cards = DiscardPlanner::choose(&self.bot_context(ctx));
        log_decision(ctx, self.difficulty, "discard", &CardList(&cards), "keep_strength");
        cards
    }

    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<CardId> {
        let legal = legal_plays(ctx.state, ctx.seat);
        if self.difficulty == BotDifficulty::Easy {
            let chosen = legal.first().copied()?;
            log_decision(ctx, self.difficulty, "play", &chosen, "easy_first_legal");
            return Some(chosen);
        }

        let chosen = PlayPlanner::choose(&legal, &self.bot_context(ctx))
            .or_else(|| legal.first().copied())?;
        log_decision(ctx, self.difficulty, "play", &chosen, "heuristic_play");
        Some(chosen)
    }
}

struct CardList<'a>(&'a [CardId]);

impl fmt::Display for CardList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, card) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

fn log_decision(
    ctx: &PolicyContext,
    difficulty: BotDifficulty,
    decision: &str,
    chosen: &dyn fmt::Display,
    reason: &str,
) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    event!(
        target: "pitch_bot::policy",
        Level::INFO,
        seat = %ctx.seat,
        difficulty = %difficulty,
        phase = %ctx.state.phase,
        high_bid = ctx.state.high_bid,
        hand_size = ctx.hand().len(),
        decision,
        chosen = %chosen,
        reason,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitch_core::game::host::{HostAction, apply_host_action, pending_host_action};
    use pitch_core::game::moves::{apply_move, awaiting_seat};
    use pitch_core::game::state::{GameState, Phase};
    use pitch_core::model::card::Card;
    use pitch_core::model::player::{Player, PlayerId, Seat};
    use pitch_core::model::rank::Rank;
    use pitch_core::model::suit::SuitColor;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn started(seed: u64) -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let lobby = GameState::new_lobby(Player::human(PlayerId::new("host"), "Host"));
        let state = apply_host_action(&lobby, HostAction::StartGame, &mut rng).unwrap();
        (state, rng)
    }

    fn strong_hearts() -> Vec<Card> {
        [
            CardId::joker(SuitColor::Red),
            CardId::joker(SuitColor::Black),
            CardId::new(Rank::Jack, Suit::Hearts),
            CardId::new(Rank::Jack, Suit::Diamonds),
            CardId::new(Rank::Ace, Suit::Hearts),
            CardId::new(Rank::King, Suit::Hearts),
            CardId::new(Rank::Ace, Suit::Clubs),
        ]
        .into_iter()
        .map(Card::from)
        .collect()
    }

    #[test]
    fn easy_policy_opens_at_minimum_then_passes() {
        let (mut state, _) = started(1);
        let mut policy = HeuristicPolicy::easy();
        let ctx = PolicyContext::new(Seat::North, &state);
        assert_eq!(policy.choose_bid(&ctx), Bid::Points(4));

        state.high_bid = 4;
        let ctx = PolicyContext::new(Seat::North, &state);
        assert_eq!(policy.choose_bid(&ctx), Bid::Pass);
    }

    #[test]
    fn normal_policy_bids_from_hand_strength() {
        let (mut state, _) = started(2);
        state.players[0].hand = strong_hearts();
        let mut policy = HeuristicPolicy::normal();
        let ctx = PolicyContext::new(Seat::North, &state);
        assert_eq!(policy.choose_bid(&ctx), Bid::Points(6));
        assert_eq!(policy.choose_trump(&ctx), Suit::Hearts);

        state.high_bid = 6;
        let ctx = PolicyContext::new(Seat::North, &state);
        assert_eq!(policy.choose_bid(&ctx), Bid::Pass);
    }

    #[test]
    fn decide_is_silent_for_seats_not_awaited() {
        let (state, _) = started(3);
        let mut policy = HeuristicPolicy::normal();
        assert_eq!(awaiting_seat(&state), Some(Seat::North));
        assert!(policy.decide(&PolicyContext::new(Seat::East, &state)).is_none());
        assert!(policy.decide(&PolicyContext::new(Seat::North, &state)).is_some());
    }

    #[test]
    fn policies_only_produce_accepted_moves() {
        for seed in [4_u64, 19, 2025] {
            let (mut state, mut rng) = started(seed);
            let mut policies = [
                HeuristicPolicy::normal(),
                HeuristicPolicy::easy(),
                HeuristicPolicy::normal(),
                HeuristicPolicy::easy(),
            ];
            let mut hands_scored = 0;
            for _ in 0..4_000 {
                if state.phase == Phase::GameOver {
                    break;
                }
                if let Some(action) = pending_host_action(&state) {
                    if action == HostAction::ScoreHand {
                        hands_scored += 1;
                    }
                    state = apply_host_action(&state, action, &mut rng).unwrap();
                    continue;
                }
                let seat = awaiting_seat(&state).expect("someone owes a move");
                let ctx = PolicyContext::new(seat, &state);
                let mv = policies[seat.index()]
                    .decide(&ctx)
                    .expect("policy answers its own turn");
                state = apply_move(&state, &mv, seat)
                    .unwrap_or_else(|err| panic!("seed {seed}: {mv:?} rejected: {err}"));
            }
            assert!(hands_scored > 0, "seed {seed} never finished a hand");
        }
    }
}
