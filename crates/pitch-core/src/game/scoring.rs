use crate::game::state::{GameState, Phase, WINNING_SCORE};
use crate::model::card::{Card, CardId};
use crate::model::player::Seat;
use crate::model::team::{Team, TeamId};
use crate::model::trump::{is_trump, rank};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoundResult {
    pub team: TeamId,
    /// Points taken before any set penalty.
    pub earned: i32,
    /// Points actually applied to the score this hand.
    pub round_points: i32,
    pub point_cards: Vec<Card>,
    pub card_value: u32,
    pub score: i32,
}

impl TeamRoundResult {
    fn capture(team: &Team, earned: i32) -> Self {
        Self {
            team: team.id,
            earned,
            round_points: team.round_points,
            point_cards: team.point_cards.clone(),
            card_value: team.card_value,
            score: team.score,
        }
    }
}

/// What happened in the hand that was just scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResults {
    pub teams: [TeamRoundResult; 2],
    pub high: Option<TeamId>,
    pub low: Option<TeamId>,
    pub game: Option<TeamId>,
    pub bidder: Option<Seat>,
    pub bidding_team: Option<TeamId>,
    pub bid: u8,
    pub set: bool,
}

impl RoundResults {
    pub fn team(&self, id: TeamId) -> &TeamRoundResult {
        &self.teams[id.index()]
    }
}

/// Highest and lowest ranked trumps among `cards`.
pub fn high_and_low<'a>(
    cards: impl IntoIterator<Item = &'a Card>,
    trump: Option<crate::model::suit::Suit>,
) -> Option<(&'a Card, &'a Card)> {
    let trumps: Vec<&Card> = cards
        .into_iter()
        .filter(|c| is_trump(c.id, trump))
        .collect();
    let high = trumps.iter().copied().max_by_key(|c| rank(c.id, trump))?;
    let low = trumps.iter().copied().min_by_key(|c| rank(c.id, trump))?;
    Some((high, low))
}

/// Marks `card` as High or Low. A card already credited keeps its single
/// point and only gains the badge.
fn badge(team: &mut Team, card: &Card, high: bool) {
    let index = match team.point_cards.iter().position(|pc| pc.id == card.id) {
        Some(index) => index,
        None => {
            team.point_cards.push(card.clone());
            team.round_points += 1;
            team.point_cards.len() - 1
        }
    };
    let entry = &mut team.point_cards[index];
    if high {
        entry.is_high = true;
    } else {
        entry.is_low = true;
    }
}

fn capturing_team(state: &GameState, card: CardId) -> Option<TeamId> {
    state
        .teams
        .iter()
        .find(|team| team.has_won(card))
        .map(|team| team.id)
}

/// Awards High, Low and Game, applies the set penalty and folds the hand into
/// the cumulative scores. Jack, off-jack and Joker credits were made when the
/// tricks were resolved and are carried as they stand.
///
/// High and Low are drawn from every card that entered a hand this deal, so a
/// discarded trump still counts. High scores only if it was captured; Low
/// scores for the team of the seat it was dealt to.
pub fn score_hand(state: &mut GameState) -> RoundResults {
    let trump = state.trump;
    let in_play: Vec<&Card> = state
        .players
        .iter()
        .flat_map(|p| p.original_hand.iter())
        .chain(state.widow.iter())
        .collect();
    let extremes =
        high_and_low(in_play.iter().copied(), trump).map(|(high, low)| (high.clone(), low.clone()));

    let mut high_team = None;
    let mut low_team = None;
    if let Some((high, low)) = extremes {
        high_team = capturing_team(state, high.id);
        low_team = low
            .original_owner
            .as_ref()
            .and_then(|owner| state.team_of_player(owner));
        if let Some(team) = high_team {
            badge(state.team_mut(team), &high, true);
        }
        if let Some(team) = low_team {
            badge(state.team_mut(team), &low, false);
        }
    }

    let [one, two] = &state.teams;
    let game_team = match one.card_value.cmp(&two.card_value) {
        core::cmp::Ordering::Greater => Some(TeamId::One),
        core::cmp::Ordering::Less => Some(TeamId::Two),
        core::cmp::Ordering::Equal => None,
    };
    if let Some(team) = game_team {
        state.team_mut(team).round_points += 1;
    }

    let earned = [state.teams[0].round_points, state.teams[1].round_points];
    let bidding_team = state.bidding_team();
    let bid = i32::from(state.high_bid);
    let mut set = false;
    if let Some(team) = bidding_team {
        let team = state.team_mut(team);
        if team.round_points < bid {
            team.round_points = -bid;
            set = true;
        }
    }

    for team in state.teams.iter_mut() {
        team.apply_round();
    }

    let results = RoundResults {
        teams: [
            TeamRoundResult::capture(&state.teams[0], earned[0]),
            TeamRoundResult::capture(&state.teams[1], earned[1]),
        ],
        high: high_team,
        low: low_team,
        game: game_team,
        bidder: state.high_bidder,
        bidding_team,
        bid: state.high_bid,
        set,
    };
    state.last_round_results = Some(results.clone());
    state.phase = if state.teams.iter().any(|t| t.score >= WINNING_SCORE) {
        Phase::GameOver
    } else {
        Phase::RoundEnd
    };
    results
}
