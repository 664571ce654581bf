pub mod bid;
pub mod card;
pub mod deck;
pub mod hand;
pub mod player;
pub mod rank;
pub mod suit;
pub mod team;
pub mod trick;
pub mod trump;
