//! Assembled cards and notes, ready for the deck tree and the serializer.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    /// Front shows the foreign term.
    Recognition,
    /// Front shows the translation.
    Production,
}

impl CardKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardKind::Recognition => "recognition",
            CardKind::Production => "production",
        }
    }

    /// Trailing deck segment for cards of this kind.
    pub fn deck_segment(&self) -> &'static str {
        match self {
            CardKind::Recognition => "Recognition",
            CardKind::Production => "Production",
        }
    }
}

/// A glossary card. Serialized as one note with a single card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub kind: CardKind,
    pub deck: String,
    pub front: String,
    pub back: String,
    pub uid: String,
    pub tags: BTreeSet<String>,
    /// Empty unless direction labels are enabled and the file had a header.
    pub direction: String,
}

/// A cloze note. Expands into one card per distinct deletion index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClozeNote {
    pub deck: String,
    pub text: String,
    pub hint: String,
    pub uid: String,
    pub tags: BTreeSet<String>,
}

/// Output of the assembler for one run. Exactly one mode per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "items", rename_all = "lowercase")]
pub enum Assembled {
    Glossary(Vec<Card>),
    Cloze(Vec<ClozeNote>),
}

impl Assembled {
    /// Deck paths referenced by the assembled items, in item order.
    pub fn deck_paths(&self) -> Vec<&str> {
        match self {
            Assembled::Glossary(cards) => cards.iter().map(|card| card.deck.as_str()).collect(),
            Assembled::Cloze(notes) => notes.iter().map(|note| note.deck.as_str()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Assembled::Glossary(cards) => cards.len(),
            Assembled::Cloze(notes) => notes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
