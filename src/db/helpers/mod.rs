use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection};
use serde::Deserialize;

use crate::utils::text::DECK_SEPARATOR;

/// Collection schema versions the maintenance utility understands.
pub const MIN_COLLECTION_VERSION: i64 = 11;
pub const MAX_COLLECTION_VERSION: i64 = 18;

/// Deck name separator used by the `decks` table in newer collections.
const NATIVE_DECK_SEPARATOR: char = '\u{1f}';

const FIELD_SEPARATOR: char = '\u{1f}';

pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to look up table {name}"))?;
    Ok(count > 0)
}

/// Read `col.ver` and refuse collections outside the supported range.
pub fn check_collection_version(conn: &Connection) -> Result<i64> {
    if !table_exists(conn, "col")? {
        bail!("not an Anki collection: table `col` is missing");
    }

    let version: i64 = conn
        .query_row("SELECT ver FROM col LIMIT 1", [], |row| row.get(0))
        .context("failed to read collection version")?;

    if !(MIN_COLLECTION_VERSION..=MAX_COLLECTION_VERSION).contains(&version) {
        bail!(
            "collection version ({version}) is outside the supported range ({MIN_COLLECTION_VERSION}..={MAX_COLLECTION_VERSION})"
        );
    }

    Ok(version)
}

pub fn normalize_deck_name(raw: &str) -> String {
    raw.replace(NATIVE_DECK_SEPARATOR, DECK_SEPARATOR)
}

pub fn split_fields(flds: &str) -> Vec<String> {
    flds.split(FIELD_SEPARATOR).map(str::to_string).collect()
}

pub fn split_tags(tags: &str) -> Vec<String> {
    tags.split_whitespace().map(str::to_string).collect()
}

#[derive(Deserialize)]
struct NamedEntry {
    name: String,
}

/// Id -> name for a table (`decks`, `notetypes`) or, in older collections,
/// the equivalent JSON map stored in a `col` column.
fn load_names(conn: &Connection, table: &str, legacy_column: &str) -> Result<HashMap<i64, String>> {
    if table_exists(conn, table)? {
        let mut stmt = conn.prepare(&format!("SELECT id, name FROM {table}"))?;
        let names = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<HashMap<_, _>, _>>()
            .with_context(|| format!("failed to read {table}"))?;
        return Ok(names);
    }

    let raw: String = conn
        .query_row(&format!("SELECT {legacy_column} FROM col LIMIT 1"), [], |row| row.get(0))
        .with_context(|| format!("failed to read col.{legacy_column}"))?;
    let entries: HashMap<String, NamedEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse col.{legacy_column}"))?;

    entries
        .into_iter()
        .map(|(id, entry)| {
            let id = id
                .parse::<i64>()
                .map_err(|_| anyhow!("invalid id '{id}' in col.{legacy_column}"))?;
            Ok((id, entry.name))
        })
        .collect()
}

pub fn load_deck_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    Ok(load_names(conn, "decks", "decks")?
        .into_iter()
        .map(|(id, name)| (id, normalize_deck_name(&name)))
        .collect())
}

pub fn load_note_type_names(conn: &Connection) -> Result<HashMap<i64, String>> {
    load_names(conn, "notetypes", "models")
}
