use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::db::{connection::Database, helpers::load_deck_names, models::DeckSummary};

impl Database {
    /// Every deck with the number of cards whose home deck it is, by name.
    pub async fn list_decks(&self) -> Result<Vec<DeckSummary>> {
        self.execute(|conn| {
            let names = load_deck_names(conn)?;

            let mut stmt = conn.prepare(
                "SELECT CASE WHEN odid != 0 THEN odid ELSE did END AS home, COUNT(*)
                 FROM cards
                 GROUP BY home",
            )?;
            let counts = stmt
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<Result<HashMap<_, _>, _>>()
                .context("failed to count cards per deck")?;

            let mut decks: Vec<DeckSummary> = names
                .into_iter()
                .map(|(id, name)| DeckSummary {
                    id,
                    name,
                    card_count: counts.get(&id).copied().unwrap_or(0),
                })
                .collect();
            decks.sort_by(|a, b| a.name.cmp(&b.name));

            Ok(decks)
        })
        .await
    }
}
