//! Card-related data models for an existing collection.

use serde::{Deserialize, Serialize};

use crate::utils::text::DECK_SEPARATOR;

/// Every scheduling column the maintenance utility snapshots and restores.
///
/// Identity (`id`, `nid`, `ord`) and placement (`did`, `odid`) are never part
/// of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingState {
    #[serde(rename = "type")]
    pub card_type: i64,
    pub queue: i64,
    pub due: i64,
    pub ivl: i64,
    pub factor: i64,
    pub reps: i64,
    pub lapses: i64,
    pub left: i64,
    #[serde(default)]
    pub flags: i64,
    #[serde(default)]
    pub data: String,
}

/// A card joined with its note, deck and note type names.
#[derive(Debug, Clone)]
pub struct LiveCard {
    pub id: i64,
    pub note_id: i64,
    pub ord: i64,
    /// Home deck name (the original deck for cards in a filtered deck).
    pub deck: String,
    pub note_type: String,
    pub fields: Vec<String>,
    pub tags: Vec<String>,
    pub in_filtered_deck: bool,
    /// Raw `odue`, the home-deck due date while in a filtered deck.
    pub original_due: i64,
    pub state: SchedulingState,
}

/// Restricts which cards a snapshot or restore touches. Empty filter matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardFilter {
    /// Deck name; matches the deck itself and every subdeck.
    pub deck_prefix: Option<String>,
    /// Exact note type name.
    pub note_type: Option<String>,
    /// Tag, compared case-insensitively.
    pub tag: Option<String>,
}

impl CardFilter {
    pub fn matches(&self, card: &LiveCard) -> bool {
        let deck_ok = self.deck_prefix.as_deref().map_or(true, |prefix| {
            card.deck == prefix
                || card
                    .deck
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with(DECK_SEPARATOR))
        });
        let note_type_ok = self
            .note_type
            .as_deref()
            .map_or(true, |name| card.note_type == name);
        let tag_ok = self.tag.as_deref().map_or(true, |wanted| {
            card.tags.iter().any(|tag| tag.eq_ignore_ascii_case(wanted))
        });

        deck_ok && note_type_ok && tag_ok
    }
}
