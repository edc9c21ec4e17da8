mod cards;
mod decks;
