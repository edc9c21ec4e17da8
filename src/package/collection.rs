//! JSON blobs and timestamps for the single `col` row.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Transaction};
use serde::Serialize;
use serde_json::json;

use super::{note_types::NoteType, schema::SCHEMA_VERSION};
use crate::decks::{DeckNode, DeckTree, OptionGroup, DEFAULT_DECK_ID};

const SECS_PER_DAY: i64 = 86_400;

/// A deck as legacy Anki stores it inside `col.decks`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckRecord {
    pub id: i64,
    pub name: String,
    #[serde(rename = "mod")]
    pub modified: i64,
    pub usn: i64,
    pub lrn_today: [i64; 2],
    pub rev_today: [i64; 2],
    pub new_today: [i64; 2],
    pub time_today: [i64; 2],
    pub collapsed: bool,
    pub browser_collapsed: bool,
    pub desc: String,
    #[serde(rename = "dyn")]
    pub dynamic: i64,
    pub conf: i64,
    pub extend_new: u32,
    pub extend_rev: u32,
}

impl DeckRecord {
    pub fn from_node(node: &DeckNode, modified_secs: i64) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            modified: modified_secs,
            usn: -1,
            lrn_today: [0, 0],
            rev_today: [0, 0],
            new_today: [0, 0],
            time_today: [0, 0],
            collapsed: node.options.collapsed,
            browser_collapsed: node.options.browser_collapsed,
            desc: String::new(),
            dynamic: 0,
            conf: node.options.option_group,
            extend_new: node.options.extend_new,
            extend_rev: node.options.extend_rev,
        }
    }
}

/// Timestamps shared by every row written in one run.
#[derive(Debug, Clone, Copy)]
pub struct Stamps {
    /// Collection creation: start of the creation day, seconds.
    pub crt: i64,
    /// Modification time in milliseconds (col.mod, col.scm).
    pub mod_ms: i64,
    /// Modification time in seconds (notes, cards, JSON blobs).
    pub mod_secs: i64,
}

impl Stamps {
    pub fn at(created_at: DateTime<Utc>) -> Self {
        let secs = created_at.timestamp();
        Self {
            crt: secs - secs.rem_euclid(SECS_PER_DAY),
            mod_ms: created_at.timestamp_millis(),
            mod_secs: secs,
        }
    }
}

/// `col.decks`: id (as string) to deck record.
pub fn decks_json(tree: &DeckTree, modified_secs: i64) -> Result<String> {
    let decks: BTreeMap<String, DeckRecord> = tree
        .iter()
        .map(|node| (node.id.to_string(), DeckRecord::from_node(node, modified_secs)))
        .collect();
    serde_json::to_string(&decks).context("failed to serialize decks")
}

/// `col.dconf`: the one option group every deck points at.
pub fn dconf_json(group: &OptionGroup, modified_secs: i64) -> Result<String> {
    let conf = json!({
        group.id.to_string(): {
            "id": group.id,
            "name": group.name,
            "mod": modified_secs,
            "usn": -1,
            "maxTaken": group.max_answer_secs,
            "autoplay": true,
            "timer": 0,
            "replayq": true,
            "dyn": false,
            "new": {
                "delays": group.learning_steps,
                "ints": [group.graduating_interval, group.easy_interval, 7],
                "initialFactor": group.initial_factor,
                "order": 1,
                "perDay": group.new_per_day,
                "bury": false,
                "separate": true,
            },
            "rev": {
                "perDay": group.reviews_per_day,
                "ease4": group.easy_bonus,
                "ivlFct": group.interval_modifier,
                "maxIvl": group.max_interval,
                "bury": false,
                "hardFactor": 1.2,
                "minSpace": 1,
                "fuzz": 0.05,
            },
            "lapse": {
                "delays": group.lapse_steps,
                "mult": 0,
                "minInt": group.lapse_min_interval,
                "leechFails": group.leech_threshold,
                "leechAction": 1,
            },
        }
    });
    serde_json::to_string(&conf).context("failed to serialize deck options")
}

/// `col.models`: just the note type used in this run.
pub fn models_json(note_type: &NoteType, modified_secs: i64) -> Result<String> {
    let models = json!({ note_type.id.to_string(): note_type.to_json(DEFAULT_DECK_ID, modified_secs) });
    serde_json::to_string(&models).context("failed to serialize note types")
}

/// `col.conf`: collection-wide preferences.
pub fn conf_json(note_type: &NoteType, next_position: i64) -> Result<String> {
    let conf = json!({
        "activeDecks": [DEFAULT_DECK_ID],
        "curDeck": DEFAULT_DECK_ID,
        "newSpread": 0,
        "collapseTime": 1200,
        "timeLim": 0,
        "estTimes": true,
        "dueCounts": true,
        "curModel": note_type.id,
        "nextPos": next_position,
        "sortType": "noteFld",
        "sortBackwards": false,
        "addToCur": true,
    });
    serde_json::to_string(&conf).context("failed to serialize collection config")
}

/// Write the single `col` row.
pub fn insert_collection_row(
    tx: &Transaction<'_>,
    stamps: Stamps,
    note_type: &NoteType,
    tree: &DeckTree,
    next_position: i64,
) -> Result<()> {
    tx.execute(
        "INSERT INTO col (id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags)
         VALUES (1, ?1, ?2, ?3, ?4, 0, 0, 0, ?5, ?6, ?7, ?8, '{}')",
        params![
            stamps.crt,
            stamps.mod_ms,
            stamps.mod_ms,
            SCHEMA_VERSION,
            conf_json(note_type, next_position)?,
            models_json(note_type, stamps.mod_secs)?,
            decks_json(tree, stamps.mod_secs)?,
            dconf_json(&OptionGroup::default(), stamps.mod_secs)?,
        ],
    )
    .context("failed to insert collection row")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::Value;

    use super::*;

    #[test]
    fn stamps_round_crt_down_to_the_day() {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 13, 45, 10).single().expect("valid date");
        let stamps = Stamps::at(created);

        assert_eq!(stamps.mod_secs, created.timestamp());
        assert_eq!(stamps.mod_ms, created.timestamp() * 1000);
        assert_eq!(stamps.crt % SECS_PER_DAY, 0);
        assert!(stamps.mod_secs - stamps.crt < SECS_PER_DAY);
    }

    #[test]
    fn decks_json_uses_anki_keys() {
        let tree = DeckTree::build(["A::B"]);
        let value: Value = serde_json::from_str(&decks_json(&tree, 7).expect("json")).expect("parse");
        let deck = &value["1"];

        assert_eq!(deck["name"], "Default");
        assert_eq!(deck["mod"], 7);
        assert_eq!(deck["dyn"], 0);
        assert_eq!(deck["conf"], 1);
        assert!(deck.get("extendNew").is_some());
        assert_eq!(value.as_object().map(|o| o.len()), Some(3));
    }

    #[test]
    fn dconf_json_is_keyed_by_group_id() {
        let value: Value =
            serde_json::from_str(&dconf_json(&OptionGroup::default(), 0).expect("json")).expect("parse");
        assert_eq!(value["1"]["new"]["perDay"], 20);
        assert_eq!(value["1"]["lapse"]["leechFails"], 8);
    }
}
