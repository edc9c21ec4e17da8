pub mod card;
pub mod deck;

pub use card::{CardFilter, LiveCard, SchedulingState};
pub use deck::DeckSummary;
