//! Helpers over a seat's held cards. Hands are plain `Vec<Card>` so they
//! serialize as part of the shared game document; order carries no meaning.

use crate::model::card::{Card, CardId};
use crate::model::suit::Suit;
use crate::model::trump::{effective_suit, rank};

pub fn contains(hand: &[Card], card: CardId) -> bool {
    hand.iter().any(|c| c.id == card)
}

/// Removes and returns `card` if it is held.
pub fn take(hand: &mut Vec<Card>, card: CardId) -> Option<Card> {
    let index = hand.iter().position(|c| c.id == card)?;
    Some(hand.swap_remove(index))
}

/// Whether any held card counts as `suit` under the current trump.
pub fn holds_effective_suit(hand: &[Card], suit: Suit, trump: Option<Suit>) -> bool {
    hand.iter()
        .any(|c| effective_suit(c.id, trump) == Some(suit))
}

/// Cards ordered for display: grouped by effective suit, highest first.
pub fn sorted(hand: &[Card], trump: Option<Suit>) -> Vec<Card> {
    let mut cards = hand.to_vec();
    cards.sort_by(|a, b| {
        effective_suit(a.id, trump)
            .cmp(&effective_suit(b.id, trump))
            .then(rank(b.id, trump).cmp(&rank(a.id, trump)))
    });
    cards
}

#[cfg(test)]
mod tests {
    use super::{contains, holds_effective_suit, sorted, take};
    use crate::model::card::{Card, CardId};
    use crate::model::rank::Rank;
    use crate::model::suit::Suit;

    fn card(rank: Rank, suit: Suit) -> Card {
        Card::new(CardId::new(rank, suit))
    }

    #[test]
    fn take_removes_only_held_cards() {
        let mut hand = vec![card(Rank::Three, Suit::Clubs), card(Rank::Ace, Suit::Hearts)];
        let three = CardId::new(Rank::Three, Suit::Clubs);
        assert!(take(&mut hand, three).is_some());
        assert!(!contains(&hand, three));
        assert!(take(&mut hand, three).is_none());
        assert_eq!(hand.len(), 1);
    }

    #[test]
    fn off_jack_follows_trump_not_its_printed_suit() {
        let hand = vec![card(Rank::Jack, Suit::Spades)];
        assert!(holds_effective_suit(&hand, Suit::Clubs, Some(Suit::Clubs)));
        assert!(!holds_effective_suit(&hand, Suit::Spades, Some(Suit::Clubs)));
        assert!(holds_effective_suit(&hand, Suit::Spades, None));
    }

    #[test]
    fn sorted_groups_by_suit_then_rank_descending() {
        let hand = vec![
            card(Rank::Two, Suit::Spades),
            card(Rank::King, Suit::Clubs),
            card(Rank::Ace, Suit::Clubs),
        ];
        let ordered: Vec<_> = sorted(&hand, None).into_iter().map(|c| c.id).collect();
        assert_eq!(
            ordered,
            vec![
                CardId::new(Rank::Ace, Suit::Clubs),
                CardId::new(Rank::King, Suit::Clubs),
                CardId::new(Rank::Two, Suit::Spades),
            ]
        );
    }
}
