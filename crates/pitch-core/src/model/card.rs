use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use crate::model::suit::{Suit, SuitColor};
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// Stable identity of one of the 54 cards, rendered as `"value-suit"` (`"Jack-Spades"`, `"Joker-red"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CardId {
    Suited { rank: Rank, suit: Suit },
    Joker(SuitColor),
}

impl CardId {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        CardId::Suited { rank, suit }
    }

    pub const fn joker(color: SuitColor) -> Self {
        CardId::Joker(color)
    }

    pub const fn suit(self) -> Option<Suit> {
        match self {
            CardId::Suited { suit, .. } => Some(suit),
            CardId::Joker(_) => None,
        }
    }

    pub const fn rank(self) -> Option<Rank> {
        match self {
            CardId::Suited { rank, .. } => Some(rank),
            CardId::Joker(_) => None,
        }
    }

    pub const fn color(self) -> SuitColor {
        match self {
            CardId::Suited { suit, .. } => suit.color(),
            CardId::Joker(color) => color,
        }
    }

    pub const fn is_joker(self) -> bool {
        matches!(self, CardId::Joker(_))
    }

    pub const fn is_jack(self) -> bool {
        matches!(self, CardId::Suited { rank: Rank::Jack, .. })
    }

    pub const fn point_value(self) -> u32 {
        match self {
            CardId::Suited { rank, .. } => rank.point_value(),
            CardId::Joker(_) => 0,
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardId::Suited { rank, suit } => write!(f, "{rank}-{suit}"),
            CardId::Joker(color) => write!(f, "Joker-{color}"),
        }
    }
}

impl FromStr for CardId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (head, tail) = value
            .split_once('-')
            .ok_or_else(|| format!("card id '{value}' is not of the form value-suit"))?;
        if head.eq_ignore_ascii_case("joker") {
            return tail.parse::<SuitColor>().map(CardId::Joker);
        }
        Ok(CardId::new(head.parse()?, tail.parse()?))
    }
}

impl From<CardId> for String {
    fn from(id: CardId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for CardId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A physical card together with the provenance the game tracks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    /// Seat identity that received the card in the deal (or absorbed/drew it later).
    #[serde(default)]
    pub original_owner: Option<PlayerId>,
    /// Set once the card is played into a trick.
    #[serde(default)]
    pub player: Option<PlayerId>,
    #[serde(default)]
    pub is_high: bool,
    #[serde(default)]
    pub is_low: bool,
}

impl Card {
    pub const fn new(id: CardId) -> Self {
        Self {
            id,
            original_owner: None,
            player: None,
            is_high: false,
            is_low: false,
        }
    }

    pub const fn suit(&self) -> Option<Suit> {
        self.id.suit()
    }

    pub const fn color(&self) -> SuitColor {
        self.id.color()
    }

    pub const fn point_value(&self) -> u32 {
        self.id.point_value()
    }
}

impl From<CardId> for Card {
    fn from(id: CardId) -> Self {
        Card::new(id)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{Card, CardId};
    use crate::model::rank::Rank;
    use crate::model::suit::{Suit, SuitColor};

    #[test]
    fn id_renders_value_and_suit() {
        assert_eq!(CardId::new(Rank::Jack, Suit::Spades).to_string(), "Jack-Spades");
        assert_eq!(CardId::new(Rank::Ten, Suit::Hearts).to_string(), "10-Hearts");
        assert_eq!(CardId::joker(SuitColor::Red).to_string(), "Joker-red");
    }

    #[test]
    fn id_parses_back_from_text() {
        for text in ["2-Clubs", "Ace-Diamonds", "Joker-black", "Queen-Hearts"] {
            let id: CardId = text.parse().unwrap();
            assert_eq!(id.to_string(), text);
        }
        assert!("Joker-green".parse::<CardId>().is_err());
        assert!("AceDiamonds".parse::<CardId>().is_err());
    }

    #[test]
    fn joker_has_color_but_no_suit() {
        let joker = CardId::joker(SuitColor::Black);
        assert_eq!(joker.suit(), None);
        assert_eq!(joker.color(), SuitColor::Black);
        assert_eq!(joker.point_value(), 0);
    }

    #[test]
    fn card_serializes_id_as_string() {
        let card = Card::new(CardId::new(Rank::King, Suit::Clubs));
        let json = serde_json::to_string(&card).unwrap();
        assert!(json.contains("\"id\":\"King-Clubs\""));
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }
}
