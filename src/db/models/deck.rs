use serde::{Deserialize, Serialize};

/// A deck in an existing collection, with the number of cards whose home
/// deck it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSummary {
    pub id: i64,
    pub name: String,
    pub card_count: i64,
}
