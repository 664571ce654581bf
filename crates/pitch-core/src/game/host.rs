//! Host-only automatic transitions. Exactly one participant (the host) drives
//! these so that observers of the shared document never race each other.

use crate::game::deal::deal;
use crate::game::lobby::{LobbyError, seat_players};
use crate::game::scoring::score_hand;
use crate::game::state::{GameState, PLAYER_COUNT, Phase, TRICKS_PER_HAND};
use crate::model::player::Seat;
use crate::model::team::{Team, TeamId};
use crate::model::trick::{TRICK_SIZE, trick_winner};
use crate::model::trump::is_protected;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HostAction {
    StartGame,
    Redeal,
    AbsorbWidow,
    BeginPlay,
    ResolveTrick,
    ScoreHand,
    StartNextRound,
    ResetToLobby,
}

impl HostAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            HostAction::StartGame => "start_game",
            HostAction::Redeal => "redeal",
            HostAction::AbsorbWidow => "absorb_widow",
            HostAction::BeginPlay => "begin_play",
            HostAction::ResolveTrick => "resolve_trick",
            HostAction::ScoreHand => "score_hand",
            HostAction::StartNextRound => "start_next_round",
            HostAction::ResetToLobby => "reset_to_lobby",
        }
    }
}

impl core::fmt::Display for HostAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{action} is not due during {phase}")]
    NotDue { action: HostAction, phase: Phase },
    #[error("no high bidder recorded")]
    MissingHighBidder,
    #[error("trick has no leader")]
    MissingTrickLeader,
    #[error("{0} has no seated player on a team")]
    EmptySeat(Seat),
    #[error(transparent)]
    Lobby(#[from] LobbyError),
}

/// The automatic transition the host owes the table, if any.
///
/// Starting a game and resetting to the lobby are deliberate host choices and
/// are never reported here.
pub fn pending_host_action(state: &GameState) -> Option<HostAction> {
    match state.phase {
        Phase::Bidding
            if usize::from(state.bids_made) == PLAYER_COUNT && state.high_bidder.is_none() =>
        {
            Some(HostAction::Redeal)
        }
        Phase::WidowPickup => Some(HostAction::AbsorbWidow),
        Phase::Discarding if usize::from(state.discards_made) == PLAYER_COUNT => {
            Some(HostAction::BeginPlay)
        }
        Phase::Playing if state.current_trick.len() == TRICK_SIZE => Some(HostAction::ResolveTrick),
        Phase::Scoring => Some(HostAction::ScoreHand),
        Phase::RoundEnd => Some(HostAction::StartNextRound),
        _ => None,
    }
}

fn is_due(state: &GameState, action: HostAction) -> bool {
    match action {
        HostAction::StartGame => state.phase == Phase::Lobby,
        HostAction::ResetToLobby => state.phase == Phase::GameOver,
        other => pending_host_action(state) == Some(other),
    }
}

/// Applies a host transition to a copy of `state`.
pub fn apply_host_action<R: Rng + ?Sized>(
    state: &GameState,
    action: HostAction,
    rng: &mut R,
) -> Result<GameState, HostError> {
    if !is_due(state, action) {
        return Err(HostError::NotDue {
            action,
            phase: state.phase,
        });
    }
    let mut next = state.clone();
    match action {
        HostAction::StartGame => start_game(&mut next, rng)?,
        HostAction::Redeal => {
            event!(target: "pitch_core::host", Level::INFO, dealer = ?next.dealer, "all players passed; redealing");
            start_bidding(&mut next, rng);
        }
        HostAction::AbsorbWidow => absorb_widow(&mut next)?,
        HostAction::BeginPlay => begin_play(&mut next)?,
        HostAction::ResolveTrick => resolve_trick(&mut next)?,
        HostAction::ScoreHand => {
            let results = score_hand(&mut next);
            event!(
                target: "pitch_core::host",
                Level::INFO,
                team1 = results.teams[0].round_points,
                team2 = results.teams[1].round_points,
                set = results.set,
                phase = %next.phase,
                "hand scored"
            );
        }
        HostAction::StartNextRound => {
            for team in next.teams.iter_mut() {
                team.reset_for_hand();
            }
            start_bidding(&mut next, rng);
        }
        HostAction::ResetToLobby => reset_to_lobby(&mut next),
    }
    next.bump_version();
    Ok(next)
}

fn start_game<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Result<(), HostError> {
    seat_players(state)?;
    state.dealer = None;
    clear_hand_counters(state);
    deal(state, rng);
    state.phase = Phase::Bidding;
    state.turn = Seat::after(state.dealer);
    event!(target: "pitch_core::host", Level::INFO, players = state.players.len(), "game started");
    Ok(())
}

/// Advances the dealer, redeals and opens bidding with the seat after the dealer.
fn start_bidding<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    let dealer = Seat::after(state.dealer);
    state.dealer = Some(dealer);
    clear_hand_counters(state);
    deal(state, rng);
    state.phase = Phase::Bidding;
    state.turn = dealer.next();
}

fn clear_hand_counters(state: &mut GameState) {
    state.high_bid = 0;
    state.high_bidder = None;
    state.bids_made = 0;
    state.trump = None;
    state.current_trick.clear();
    state.trick_leader = None;
    state.tricks_played = 0;
    state.discards_made = 0;
}

fn absorb_widow(state: &mut GameState) -> Result<(), HostError> {
    let bidder = state.high_bidder.ok_or(HostError::MissingHighBidder)?;
    let widow: Vec<_> = state.widow.drain(..).collect();
    let player = state
        .player_mut(bidder)
        .ok_or(HostError::EmptySeat(bidder))?;
    for mut card in widow {
        card.original_owner = Some(player.id.clone());
        player.hand.push(card.clone());
        player.original_hand.push(card);
    }
    state.phase = Phase::TrumpSelection;
    state.turn = bidder;
    Ok(())
}

fn begin_play(state: &mut GameState) -> Result<(), HostError> {
    let bidder = state.high_bidder.ok_or(HostError::MissingHighBidder)?;
    state.phase = Phase::Playing;
    state.turn = bidder;
    state.trick_leader = None;
    Ok(())
}

fn resolve_trick(state: &mut GameState) -> Result<(), HostError> {
    let leader = state.trick_leader.ok_or(HostError::MissingTrickLeader)?;
    let trump = state.trump;
    let winner =
        trick_winner(&state.current_trick, leader, trump).ok_or(HostError::MissingTrickLeader)?;
    let team_id: TeamId = state
        .team_of_seat(winner)
        .ok_or(HostError::EmptySeat(winner))?;

    let trick: Vec<_> = state.current_trick.drain(..).collect();
    let team: &mut Team = state.team_mut(team_id);
    for card in trick {
        team.card_value += card.point_value();
        if is_protected(card.id, trump) {
            team.credit_point_card(&card);
        }
        team.cards_won.push(card);
    }

    state.tricks_played += 1;
    state.trick_leader = None;
    state.turn = winner;
    if state.tricks_played >= TRICKS_PER_HAND {
        state.phase = Phase::Scoring;
    }
    event!(
        target: "pitch_core::host",
        Level::DEBUG,
        winner = %winner,
        team = %team_id,
        tricks_played = state.tricks_played,
        "trick resolved"
    );
    Ok(())
}

fn reset_to_lobby(state: &mut GameState) {
    for player in state.players.iter_mut() {
        player.clear_for_deal();
        player.team = None;
        player.is_online = !player.is_ai && state.host_id == player.id;
    }
    state.teams = [Team::new(TeamId::One), Team::new(TeamId::Two)];
    state.deck.clear();
    state.widow.clear();
    state.discards.clear();
    clear_hand_counters(state);
    state.dealer = None;
    state.turn = Seat::North;
    state.last_round_results = None;
    state.phase = Phase::Lobby;
}

#[cfg(test)]
mod tests {
    use super::{HostAction, HostError, apply_host_action, pending_host_action};
    use crate::game::moves::{Move, apply_move};
    use crate::game::state::{GameState, Phase};
    use crate::model::bid::Bid;
    use crate::model::card::{Card, CardId};
    use crate::model::deck::DECK_SIZE;
    use crate::model::player::{Player, PlayerId, Seat};
    use crate::model::rank::Rank;
    use crate::model::suit::{Suit, SuitColor};
    use crate::model::team::TeamId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn started(seed: u64) -> (GameState, StdRng) {
        let mut rng = StdRng::seed_from_u64(seed);
        let lobby = GameState::new_lobby(Player::human(PlayerId::new("host"), "Host"));
        let state = apply_host_action(&lobby, HostAction::StartGame, &mut rng).unwrap();
        (state, rng)
    }

    #[test]
    fn start_game_deals_and_opens_bidding_at_north() {
        let (state, _) = started(1);
        assert_eq!(state.phase, Phase::Bidding);
        assert_eq!(state.dealer, None);
        assert_eq!(state.turn, Seat::North);
        assert_eq!(state.players.len(), 4);
        assert_eq!(state.card_count(), DECK_SIZE);
        assert_eq!(state.check_invariants(), Ok(()));
    }

    #[test]
    fn all_pass_redeals_with_next_dealer() {
        let (mut state, mut rng) = started(2);
        for seat in Seat::LOOP {
            state = apply_move(&state, &Move::Bid(Bid::Pass), seat).unwrap();
        }
        assert_eq!(pending_host_action(&state), Some(HostAction::Redeal));
        let redealt = apply_host_action(&state, HostAction::Redeal, &mut rng).unwrap();
        assert_eq!(redealt.dealer, Some(Seat::North));
        assert_eq!(redealt.turn, Seat::East);
        assert_eq!(redealt.bids_made, 0);
        assert!(redealt.players.iter().all(|p| !p.has_bid && p.hand.len() == 7));
        assert!(redealt.discards.is_empty());
        assert_eq!(redealt.check_invariants(), Ok(()));
    }

    #[test]
    fn host_actions_that_are_not_due_are_refused() {
        let (state, mut rng) = started(3);
        let before = state.clone();
        let err = apply_host_action(&state, HostAction::ScoreHand, &mut rng).unwrap_err();
        assert_eq!(
            err,
            HostError::NotDue {
                action: HostAction::ScoreHand,
                phase: Phase::Bidding
            }
        );
        assert_eq!(state, before);
    }

    #[test]
    fn absorbing_the_widow_transfers_provenance_to_the_bidder() {
        let (mut state, mut rng) = started(4);
        state = apply_move(&state, &Move::Bid(Bid::Points(5)), Seat::North).unwrap();
        for seat in [Seat::East, Seat::South, Seat::West] {
            state = apply_move(&state, &Move::Bid(Bid::Pass), seat).unwrap();
        }
        assert_eq!(pending_host_action(&state), Some(HostAction::AbsorbWidow));
        let widow: Vec<CardId> = state.widow.iter().map(|c| c.id).collect();
        let next = apply_host_action(&state, HostAction::AbsorbWidow, &mut rng).unwrap();
        let north = next.player(Seat::North).unwrap();
        assert_eq!(north.hand.len(), 14);
        assert_eq!(north.original_hand.len(), 14);
        assert!(next.widow.is_empty());
        for id in widow {
            let card = north.hand.iter().find(|c| c.id == id).unwrap();
            assert_eq!(card.original_owner.as_ref(), Some(&north.id));
        }
        assert_eq!(next.phase, Phase::TrumpSelection);
        assert_eq!(next.turn, Seat::North);
    }

    fn trick_state() -> GameState {
        let (mut state, _) = started(5);
        state.phase = Phase::Playing;
        state.trump = Some(Suit::Spades);
        state.trick_leader = Some(Seat::West);
        let played = [
            CardId::new(Rank::Jack, Suit::Clubs),
            CardId::joker(SuitColor::Red),
            CardId::new(Rank::Ten, Suit::Spades),
            CardId::new(Rank::Two, Suit::Spades),
        ];
        for id in played {
            for zone in state
                .players
                .iter_mut()
                .map(|p| &mut p.hand)
                .chain([&mut state.widow, &mut state.deck])
            {
                if let Some(pos) = zone.iter().position(|c| c.id == id) {
                    let card: Card = zone.remove(pos);
                    state.current_trick.push(card);
                }
            }
        }
        state
    }

    #[test]
    fn trick_resolution_credits_bowers_once_and_passes_the_lead() {
        let state = trick_state();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(pending_host_action(&state), Some(HostAction::ResolveTrick));
        let next = apply_host_action(&state, HostAction::ResolveTrick, &mut rng).unwrap();
        // West led the off-jack, which outranks the red Joker and the spades.
        assert_eq!(next.turn, Seat::West);
        let team = next.team(TeamId::Two);
        assert_eq!(team.cards_won.len(), 4);
        assert_eq!(team.point_cards.len(), 2);
        assert_eq!(team.round_points, 2);
        assert_eq!(team.card_value, 1 + 10);
        assert_eq!(next.tricks_played, 1);
        assert!(next.current_trick.is_empty());
        assert_eq!(next.phase, Phase::Playing);
        assert_eq!(next.card_count(), DECK_SIZE);
    }

    #[test]
    fn sixth_trick_moves_to_scoring() {
        let mut state = trick_state();
        state.tricks_played = 5;
        let next =
            apply_host_action(&state, HostAction::ResolveTrick, &mut StdRng::seed_from_u64(0))
                .unwrap();
        assert_eq!(next.phase, Phase::Scoring);
        assert_eq!(pending_host_action(&next), Some(HostAction::ScoreHand));
    }

    #[test]
    fn begin_play_gives_the_lead_to_the_high_bidder() {
        let (mut state, mut rng) = started(8);
        state.phase = Phase::Discarding;
        state.discards_made = 4;
        state.high_bid = 5;
        state.high_bidder = Some(Seat::East);
        state.trump = Some(Suit::Diamonds);
        state.trick_leader = Some(Seat::North);
        state.turn = Seat::West;
        assert_eq!(pending_host_action(&state), Some(HostAction::BeginPlay));
        let next = apply_host_action(&state, HostAction::BeginPlay, &mut rng).unwrap();
        assert_eq!(next.phase, Phase::Playing);
        assert_eq!(next.turn, Seat::East);
        assert_eq!(next.trick_leader, None);
        assert_eq!(next.version, state.version + 1);
    }

    #[test]
    fn begin_play_without_a_bidder_is_refused() {
        let (mut state, mut rng) = started(9);
        state.phase = Phase::Discarding;
        state.discards_made = 4;
        let err = apply_host_action(&state, HostAction::BeginPlay, &mut rng).unwrap_err();
        assert_eq!(err, HostError::MissingHighBidder);
    }

    #[test]
    fn next_round_advances_the_dealer_and_keeps_scores() {
        let (mut state, mut rng) = started(10);
        state.phase = Phase::RoundEnd;
        state.dealer = Some(Seat::South);
        state.high_bid = 6;
        state.high_bidder = Some(Seat::West);
        state.trump = Some(Suit::Clubs);
        state.tricks_played = 6;
        state.teams[0].score = 9;
        state.teams[0].round_points = 3;
        state.teams[0].card_value = 15;
        state.teams[1].score = -4;
        state.teams[1].round_points = -6;
        state.teams[1].point_cards = vec![Card::new(CardId::joker(SuitColor::Red))];
        assert_eq!(pending_host_action(&state), Some(HostAction::StartNextRound));

        let next = apply_host_action(&state, HostAction::StartNextRound, &mut rng).unwrap();
        assert_eq!(next.phase, Phase::Bidding);
        assert_eq!(next.dealer, Some(Seat::West));
        assert_eq!(next.turn, Seat::North);
        assert_eq!(next.teams[0].score, 9);
        assert_eq!(next.teams[1].score, -4);
        for team in &next.teams {
            assert_eq!(team.round_points, 0);
            assert_eq!(team.card_value, 0);
            assert!(team.point_cards.is_empty() && team.cards_won.is_empty());
        }
        assert_eq!(next.high_bidder, None);
        assert_eq!(next.trump, None);
        assert_eq!(next.tricks_played, 0);
        assert!(next.players.iter().all(|p| p.hand.len() == 7 && p.original_hand.len() == 7));
        assert_eq!(next.card_count(), DECK_SIZE);
        assert_eq!(next.check_invariants(), Ok(()));
    }

    #[test]
    fn reset_to_lobby_keeps_players_and_clears_teams() {
        let (mut state, mut rng) = started(6);
        state.phase = Phase::GameOver;
        state.teams[0].score = 23;
        let lobby = apply_host_action(&state, HostAction::ResetToLobby, &mut rng).unwrap();
        assert_eq!(lobby.phase, Phase::Lobby);
        assert_eq!(lobby.players.len(), 4);
        assert!(lobby.players.iter().all(|p| p.team.is_none() && p.hand.is_empty()));
        assert_eq!(lobby.teams[0].score, 0);
        assert_eq!(lobby.dealer, None);
        assert_eq!(lobby.card_count(), 0);

        let again = apply_host_action(&lobby, HostAction::StartGame, &mut rng).unwrap();
        assert_eq!(again.players.len(), 4);
        assert_eq!(again.check_invariants(), Ok(()));
    }
}
