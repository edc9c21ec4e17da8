use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{load_deck_names, load_note_type_names, split_fields, split_tags},
    models::{CardFilter, LiveCard, SchedulingState},
};

const ENABLE_LOGS: bool = true;

/// Columns of a card joined with its note, before names are resolved.
struct RawCard {
    id: i64,
    note_id: i64,
    did: i64,
    odid: i64,
    ord: i64,
    odue: i64,
    mid: i64,
    flds: String,
    tags: String,
    state: SchedulingState,
}

fn row_to_raw_card(row: &Row) -> Result<RawCard, rusqlite::Error> {
    Ok(RawCard {
        id: row.get("id")?,
        note_id: row.get("nid")?,
        did: row.get("did")?,
        odid: row.get("odid")?,
        ord: row.get("ord")?,
        odue: row.get("odue")?,
        mid: row.get("mid")?,
        flds: row.get("flds")?,
        tags: row.get("tags")?,
        state: SchedulingState {
            card_type: row.get("type")?,
            queue: row.get("queue")?,
            due: row.get("due")?,
            ivl: row.get("ivl")?,
            factor: row.get("factor")?,
            reps: row.get("reps")?,
            lapses: row.get("lapses")?,
            left: row.get("left")?,
            flags: row.get("flags")?,
            data: row.get::<_, Option<String>>("data")?.unwrap_or_default(),
        },
    })
}

/// Cards matching `filter`, in card id order.
fn read_live_cards(conn: &Connection, filter: &CardFilter) -> Result<Vec<LiveCard>> {
    let decks = load_deck_names(conn)?;
    let note_types = load_note_type_names(conn)?;

    let mut stmt = conn.prepare(
        "SELECT c.id, c.nid, c.did, c.odid, c.ord, c.type, c.queue, c.due, c.ivl, c.factor,
                c.reps, c.lapses, c.left, c.odue, c.flags, c.data,
                n.mid, n.flds, n.tags
         FROM cards c
         JOIN notes n ON n.id = c.nid
         ORDER BY c.id",
    )?;

    let raw_cards = stmt
        .query_map([], row_to_raw_card)?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to read cards")?;

    let mut cards = Vec::with_capacity(raw_cards.len());
    for raw in raw_cards {
        let in_filtered_deck = raw.odid != 0;
        let home = if in_filtered_deck { raw.odid } else { raw.did };
        let deck = match decks.get(&home) {
            Some(name) => name.clone(),
            None => {
                log_warn!("card {} points at unknown deck {home}", raw.id);
                String::new()
            }
        };

        let card = LiveCard {
            id: raw.id,
            note_id: raw.note_id,
            ord: raw.ord,
            deck,
            note_type: note_types.get(&raw.mid).cloned().unwrap_or_default(),
            fields: split_fields(&raw.flds),
            tags: split_tags(&raw.tags),
            in_filtered_deck,
            original_due: raw.odue,
            state: raw.state,
        };

        if filter.matches(&card) {
            cards.push(card);
        }
    }

    Ok(cards)
}

/// Overwrite the scheduling columns of each `(card id, state)` pair.
///
/// All updates share one transaction and one prepared statement: either
/// every row is written or none is. Cards currently in a filtered deck get
/// the due date written to `odue` so they land correctly once returned home.
fn write_scheduling(
    conn: &mut Connection,
    updates: &[(i64, SchedulingState)],
    modified_secs: i64,
) -> Result<usize> {
    let tx = conn
        .transaction()
        .context("failed to open restore transaction")?;
    let mut updated = 0;

    {
        let mut stmt = tx
            .prepare(
                "UPDATE cards
                 SET type = ?1,
                     queue = ?2,
                     due = CASE WHEN odid = 0 THEN ?3 ELSE due END,
                     odue = CASE WHEN odid = 0 THEN odue ELSE ?3 END,
                     ivl = ?4,
                     factor = ?5,
                     reps = ?6,
                     lapses = ?7,
                     left = ?8,
                     flags = ?9,
                     data = ?10,
                     mod = ?11,
                     usn = -1
                 WHERE id = ?12",
            )
            .context("failed to prepare scheduling update")?;

        for (card_id, state) in updates {
            updated += stmt
                .execute(params![
                    state.card_type,
                    state.queue,
                    state.due,
                    state.ivl,
                    state.factor,
                    state.reps,
                    state.lapses,
                    state.left,
                    state.flags,
                    state.data,
                    modified_secs,
                    card_id,
                ])
                .with_context(|| format!("failed to update card {card_id}"))?;
        }
    }

    tx.commit().context("failed to commit restored scheduling")?;
    Ok(updated)
}

impl Database {
    /// Cards matching `filter`, joined with their note, deck and note type.
    pub async fn live_cards(&self, filter: CardFilter) -> Result<Vec<LiveCard>> {
        self.execute(move |conn| read_live_cards(conn, &filter)).await
    }

    /// See [`write_scheduling`].
    pub async fn apply_scheduling(
        &self,
        updates: Vec<(i64, SchedulingState)>,
        modified_secs: i64,
    ) -> Result<usize> {
        self.execute(move |conn| write_scheduling(conn, &updates, modified_secs))
            .await
    }
}
