use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[repr(u8)]
pub enum Rank {
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
    Seven = 7,
    Eight = 8,
    Nine = 9,
    Ten = 10,
    Jack = 11,
    Queen = 12,
    King = 13,
    Ace = 14,
}

impl Rank {
    pub const ORDERED: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            2 => Some(Rank::Two),
            3 => Some(Rank::Three),
            4 => Some(Rank::Four),
            5 => Some(Rank::Five),
            6 => Some(Rank::Six),
            7 => Some(Rank::Seven),
            8 => Some(Rank::Eight),
            9 => Some(Rank::Nine),
            10 => Some(Rank::Ten),
            11 => Some(Rank::Jack),
            12 => Some(Rank::Queen),
            13 => Some(Rank::King),
            14 => Some(Rank::Ace),
            _ => None,
        }
    }

    /// Standard (non-trump) ordering value, Ace high.
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Card value counted toward the Game point.
    pub const fn point_value(self) -> u32 {
        match self {
            Rank::Ace => 4,
            Rank::King => 3,
            Rank::Queen => 2,
            Rank::Jack => 1,
            Rank::Ten => 10,
            _ => 0,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
            Rank::Ace => "Ace",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "jack" | "j" => Ok(Rank::Jack),
            "queen" | "q" => Ok(Rank::Queen),
            "king" | "k" => Ok(Rank::King),
            "ace" | "a" => Ok(Rank::Ace),
            digits => digits
                .parse::<u8>()
                .ok()
                .filter(|v| *v <= 10)
                .and_then(Rank::from_value)
                .ok_or_else(|| format!("unknown rank '{value}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rank;

    #[test]
    fn from_value_maps() {
        assert_eq!(Rank::from_value(11), Some(Rank::Jack));
        assert_eq!(Rank::from_value(1), None);
    }

    #[test]
    fn point_values_match_game_table() {
        assert_eq!(Rank::Ace.point_value(), 4);
        assert_eq!(Rank::King.point_value(), 3);
        assert_eq!(Rank::Queen.point_value(), 2);
        assert_eq!(Rank::Jack.point_value(), 1);
        assert_eq!(Rank::Ten.point_value(), 10);
        assert_eq!(Rank::Nine.point_value(), 0);
    }

    #[test]
    fn parse_accepts_names_and_numbers() {
        assert_eq!("Queen".parse::<Rank>(), Ok(Rank::Queen));
        assert_eq!("10".parse::<Rank>(), Ok(Rank::Ten));
        assert!("11".parse::<Rank>().is_err());
        assert!("1".parse::<Rank>().is_err());
    }
}
