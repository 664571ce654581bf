use pitch_core::game::host::{HostAction, apply_host_action, pending_host_action};
use pitch_core::game::moves::{Move, apply_move, awaiting_seat, legal_moves};
use pitch_core::game::state::{GameState, Phase};
use pitch_core::model::bid::Bid;
use pitch_core::model::deck::DECK_SIZE;
use pitch_core::model::player::{Player, PlayerId, Seat};
use pitch_core::model::suit::Suit;
use pitch_core::model::trump::is_trump;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

const STEP_LIMIT: usize = 20_000;

fn started(rng: &mut StdRng) -> GameState {
    let lobby = GameState::new_lobby(Player::human(PlayerId::new("host"), "Host"));
    apply_host_action(&lobby, HostAction::StartGame, rng).expect("start game")
}

/// Opens at four and otherwise passes; names the suit with the most trumps in
/// hand; discards and plays the first legal option.
fn choose(state: &GameState, seat: Seat) -> Option<Move> {
    match state.phase {
        Phase::Bidding if state.high_bid == 0 => Some(Move::Bid(Bid::Points(4))),
        Phase::Bidding => Some(Move::Bid(Bid::Pass)),
        Phase::TrumpSelection => {
            let hand = &state.player(seat)?.hand;
            Suit::ALL
                .into_iter()
                .max_by_key(|suit| hand.iter().filter(|c| is_trump(c.id, Some(*suit))).count())
                .map(Move::ChooseTrump)
        }
        _ => legal_moves(state, seat).into_iter().next(),
    }
}

/// Advances one step: a due host transition, otherwise a move by the seat
/// being waited on.
fn step(state: &GameState, rng: &mut StdRng) -> Option<GameState> {
    if let Some(action) = pending_host_action(state) {
        return Some(apply_host_action(state, action, rng).expect("host action"));
    }
    let seat = awaiting_seat(state)?;
    let mv = choose(state, seat)?;
    Some(apply_move(state, &mv, seat).expect("legal move accepted"))
}

fn play_game(seed: u64) -> (GameState, usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = started(&mut rng);
    let mut steps = 0;
    while state.phase != Phase::GameOver && steps < STEP_LIMIT {
        let next = step(&state, &mut rng).expect("game never stalls");
        assert_eq!(next.version, state.version + 1);
        assert_eq!(next.card_count(), DECK_SIZE);
        assert_eq!(next.check_invariants(), Ok(()));
        state = next;
        steps += 1;
    }
    (state, steps)
}

#[test]
fn seeded_game_runs_to_completion() {
    let (state, steps) = play_game(2024);
    assert_eq!(state.phase, Phase::GameOver);
    assert!(steps < STEP_LIMIT);
    assert!(state.teams.iter().any(|t| t.score >= 21));
    assert!(state.winner().is_some());
    assert!(state.last_round_results.is_some());
}

#[test]
fn all_pass_redeal_rotates_the_dealer() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut state = started(&mut rng);
    assert_eq!(state.dealer, None);
    assert_eq!(state.turn, Seat::North);

    for seat in Seat::LOOP {
        state = apply_move(&state, &Move::Bid(Bid::Pass), seat).unwrap();
    }
    assert_eq!(state.phase, Phase::Bidding);
    assert_eq!(pending_host_action(&state), Some(HostAction::Redeal));

    let redealt = apply_host_action(&state, HostAction::Redeal, &mut rng).unwrap();
    assert_eq!(redealt.dealer, Some(Seat::North));
    assert_eq!(redealt.turn, Seat::East);
    assert_eq!(redealt.phase, Phase::Bidding);
    assert!(redealt.discards.is_empty());
    assert!(redealt.players.iter().all(|p| p.bid.is_none() && p.hand.len() == 7));
    assert_ne!(
        redealt.players[0].hand, state.players[0].hand,
        "fresh shuffle expected"
    );

    let mut again = redealt;
    for seat in [Seat::East, Seat::South, Seat::West, Seat::North] {
        again = apply_move(&again, &Move::Bid(Bid::Pass), seat).unwrap();
    }
    let third = apply_host_action(&again, HostAction::Redeal, &mut rng).unwrap();
    assert_eq!(third.dealer, Some(Seat::East));
    assert_eq!(third.turn, Seat::South);
}

#[test]
fn every_hand_plays_exactly_six_tricks() {
    let mut rng = StdRng::seed_from_u64(77);
    let mut state = started(&mut rng);
    let mut resolved = 0;
    while state.phase != Phase::Scoring {
        let due = pending_host_action(&state);
        state = step(&state, &mut rng).unwrap();
        if due == Some(HostAction::ResolveTrick) {
            resolved += 1;
        }
    }
    assert_eq!(resolved, 6);
    assert_eq!(state.tricks_played, 6);
    assert!(state.players.iter().all(|p| p.hand.is_empty()));
    let won: usize = state.teams.iter().map(|t| t.cards_won.len()).sum();
    assert_eq!(won, 24);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn cards_are_conserved_through_whole_games(seed in any::<u64>()) {
        let (state, _) = play_game(seed);
        prop_assert_eq!(state.card_count(), DECK_SIZE);
    }
}
