use crate::game::state::{CARDS_DEALT, GameState, PLAYER_COUNT, WIDOW_SIZE};
use crate::model::deck::Deck;
use crate::model::player::Seat;
use rand::Rng;

/// Shuffles a fresh deck and deals it. See [`deal_from`].
pub fn deal<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) {
    deal_from(state, Deck::shuffled(rng));
}

/// Clears every hand and deals `deck` from the top: seven cards per seat in
/// rotation starting after the dealer, then seven to the widow. The rest
/// stays as the draw deck.
pub fn deal_from(state: &mut GameState, mut deck: Deck) {
    for player in state.players.iter_mut() {
        player.clear_for_deal();
    }
    state.widow.clear();
    state.discards.clear();
    state.current_trick.clear();
    state.trick_leader = None;

    let first = Seat::after(state.dealer);
    for _ in 0..CARDS_DEALT {
        for offset in 0..PLAYER_COUNT {
            let seat = first.advance(offset);
            let Some(mut card) = deck.draw() else {
                return;
            };
            let Some(player) = state.player_mut(seat) else {
                continue;
            };
            card.original_owner = Some(player.id.clone());
            player.hand.push(card.clone());
            player.original_hand.push(card);
        }
    }
    for _ in 0..WIDOW_SIZE {
        if let Some(card) = deck.draw() {
            state.widow.push(card);
        }
    }
    state.deck = deck.into_cards();
}

#[cfg(test)]
mod tests {
    use super::{deal, deal_from};
    use crate::game::state::{CARDS_DEALT, GameState, WIDOW_SIZE};
    use crate::model::deck::{DECK_SIZE, Deck};
    use crate::model::player::{Player, PlayerId, Seat};
    use crate::model::team::TeamId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn table() -> GameState {
        let mut state = GameState::new_lobby(Player::human(PlayerId::new("p0"), "Zero"));
        for i in 1..4 {
            state.players.push(Player::ai(
                PlayerId::new(format!("p{i}")),
                format!("Bot {i}"),
                TeamId::Two,
            ));
        }
        state
    }

    #[test]
    fn deal_exhausts_the_deck_exactly() {
        let mut state = table();
        let mut rng = StdRng::seed_from_u64(7);
        deal(&mut state, &mut rng);
        for player in &state.players {
            assert_eq!(player.hand.len(), CARDS_DEALT);
            assert_eq!(player.original_hand, player.hand);
        }
        assert_eq!(state.widow.len(), WIDOW_SIZE);
        assert_eq!(state.deck.len(), DECK_SIZE - 4 * CARDS_DEALT - WIDOW_SIZE);
        assert_eq!(state.card_count(), DECK_SIZE);
    }

    #[test]
    fn first_card_goes_to_seat_after_dealer() {
        let mut state = table();
        state.dealer = Some(Seat::South);
        let deck = Deck::standard();
        let top = deck.cards().last().map(|c| c.id);
        deal_from(&mut state, deck);
        let west = state.player(Seat::West).unwrap();
        assert_eq!(west.hand.first().map(|c| c.id), top);
        assert_eq!(
            west.hand[0].original_owner.as_ref(),
            Some(&PlayerId::new("p3"))
        );
    }

    #[test]
    fn redeal_clears_previous_hands() {
        let mut state = table();
        let mut rng = StdRng::seed_from_u64(1);
        deal(&mut state, &mut rng);
        state.players[0].bid = Some(crate::model::bid::Bid::Pass);
        state.players[0].has_bid = true;
        deal(&mut state, &mut rng);
        assert_eq!(state.players[0].hand.len(), CARDS_DEALT);
        assert!(!state.players[0].has_bid);
        assert!(state.discards.is_empty());
        assert_eq!(state.card_count(), DECK_SIZE);
    }
}
