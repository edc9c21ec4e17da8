//! Serializes assembled cards into an Anki package.
//!
//! The collection image is built in a scratch SQLite file, then zipped with
//! the media manifest. Every row gets "new card" scheduling; nothing is
//! carried over from earlier packages.

pub mod archive;
pub mod cloze;
pub mod collection;
pub mod ids;
pub mod note_types;
pub mod schema;

use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Transaction};
use serde::Serialize;
use sha1::{Digest, Sha1};

use crate::{
    decks::DeckTree,
    identity::note_guid,
    models::Assembled,
    utils::text::strip_html,
};

pub use archive::{write_archive, COLLECTION_ENTRY, MEDIA_ENTRY};
pub use cloze::cloze_ordinals;
use collection::{insert_collection_row, Stamps};
use ids::IdSequence;
use note_types::{NoteType, CLOZE, TWO_SIDED};

const ENABLE_LOGS: bool = true;

/// Anki's field separator inside `notes.flds`.
pub const FIELD_SEPARATOR: char = '\u{1f}';

#[derive(Debug, Clone)]
pub struct PackageOptions {
    /// Stamped on the collection and every row; also seeds note/card ids.
    pub created_at: DateTime<Utc>,
}

impl Default for PackageOptions {
    fn default() -> Self {
        Self {
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PackageSummary {
    pub notes: usize,
    pub cards: usize,
    pub decks: usize,
    /// Cloze notes dropped because they had no deletion markers.
    pub skipped_notes: usize,
}

/// One `notes` row and the template ordinals it produces cards for.
struct NoteRow<'a> {
    uid: &'a str,
    deck: &'a str,
    fields: Vec<&'a str>,
    tags: Vec<&'a str>,
    ordinals: Vec<u32>,
}

fn note_rows(assembled: &Assembled) -> (&'static NoteType, Vec<NoteRow<'_>>) {
    match assembled {
        Assembled::Glossary(cards) => (
            &TWO_SIDED,
            cards
                .iter()
                .map(|card| NoteRow {
                    uid: &card.uid,
                    deck: &card.deck,
                    fields: vec![
                        card.uid.as_str(),
                        card.front.as_str(),
                        card.back.as_str(),
                        card.direction.as_str(),
                    ],
                    tags: card.tags.iter().map(String::as_str).collect(),
                    ordinals: vec![0],
                })
                .collect(),
        ),
        Assembled::Cloze(notes) => (
            &CLOZE,
            notes
                .iter()
                .map(|note| NoteRow {
                    uid: &note.uid,
                    deck: &note.deck,
                    fields: vec![note.text.as_str(), note.hint.as_str(), ""],
                    tags: note.tags.iter().map(String::as_str).collect(),
                    ordinals: cloze_ordinals(&note.text),
                })
                .collect(),
        ),
    }
}

/// Anki's tag column format: space-separated with a leading and trailing space.
fn tag_column(tags: &[&str]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" {} ", tags.join(" "))
    }
}

/// First 32 bits of the SHA-1 of the stripped sort field.
pub fn field_checksum(sort_field: &str) -> i64 {
    let digest = Sha1::digest(strip_html(sort_field).as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

fn insert_rows(
    tx: &Transaction<'_>,
    note_type: &NoteType,
    rows: &[NoteRow<'_>],
    tree: &DeckTree,
    stamps: Stamps,
) -> Result<(PackageSummary, i64)> {
    let mut note_ids = IdSequence::starting_at(stamps.mod_ms);
    let mut card_ids = IdSequence::starting_at(stamps.mod_ms);
    let mut summary = PackageSummary {
        decks: tree.len(),
        ..PackageSummary::default()
    };
    // Due numbers of new cards, one per note, shared by its cards.
    let mut positions = IdSequence::starting_at(1);

    let mut insert_note = tx
        .prepare(
            "INSERT INTO notes (id, guid, mid, mod, usn, tags, flds, sfld, csum, flags, data)
             VALUES (?1, ?2, ?3, ?4, -1, ?5, ?6, ?7, ?8, 0, '')",
        )
        .context("failed to prepare note insert")?;
    let mut insert_card = tx
        .prepare(
            "INSERT INTO cards (id, nid, did, ord, mod, usn, type, queue, due, ivl, factor,
                                reps, lapses, left, odue, odid, flags, data)
             VALUES (?1, ?2, ?3, ?4, ?5, -1, 0, 0, ?6, 0, 0, 0, 0, 0, 0, 0, 0, '')",
        )
        .context("failed to prepare card insert")?;

    for row in rows {
        if row.ordinals.is_empty() {
            log_warn!("{}: no cloze markers, skipping note", row.uid);
            summary.skipped_notes += 1;
            continue;
        }

        let note_id = note_ids.next_id();
        let sort_field = row.fields.get(note_type.sort_field).copied().unwrap_or_default();
        let position = positions.next_id();

        insert_note
            .execute(params![
                note_id,
                note_guid(row.uid),
                note_type.id,
                stamps.mod_secs,
                tag_column(&row.tags),
                row.fields.join(&FIELD_SEPARATOR.to_string()),
                strip_html(sort_field),
                field_checksum(sort_field),
            ])
            .with_context(|| format!("failed to insert note {}", row.uid))?;
        summary.notes += 1;

        let deck_id = tree.id_for(row.deck);
        for ordinal in &row.ordinals {
            insert_card
                .execute(params![
                    card_ids.next_id(),
                    note_id,
                    deck_id,
                    ordinal,
                    stamps.mod_secs,
                    position,
                ])
                .with_context(|| format!("failed to insert card {} ord {ordinal}", row.uid))?;
            summary.cards += 1;
        }
    }

    Ok((summary, positions.peek()))
}

/// Create the schema in `conn` and write every note, card and the `col` row
/// in one transaction.
pub fn populate_collection(
    conn: &mut Connection,
    assembled: &Assembled,
    tree: &DeckTree,
    options: &PackageOptions,
) -> Result<PackageSummary> {
    schema::initialize_schema(conn)?;

    let stamps = Stamps::at(options.created_at);
    let (note_type, rows) = note_rows(assembled);

    let tx = conn
        .transaction()
        .context("failed to open collection transaction")?;
    let (summary, next_position) = insert_rows(&tx, note_type, &rows, tree, stamps)?;
    insert_collection_row(&tx, stamps, note_type, tree, next_position)?;
    tx.commit().context("failed to commit collection image")?;

    Ok(summary)
}

/// Write a complete collection image to `path`.
pub fn build_collection_image(
    path: &Path,
    assembled: &Assembled,
    tree: &DeckTree,
    options: &PackageOptions,
) -> Result<PackageSummary> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to create collection image {}", path.display()))?;
    let summary = populate_collection(&mut conn, assembled, tree, options)?;
    conn.close()
        .map_err(|(_, err)| err)
        .context("failed to close collection image")?;
    Ok(summary)
}

/// Build the package for `assembled` and write it to `output`.
pub fn write_package(
    output: &Path,
    assembled: &Assembled,
    tree: &DeckTree,
    options: &PackageOptions,
) -> Result<PackageSummary> {
    let scratch = tempfile::tempdir().context("failed to create scratch directory")?;
    let image_path = scratch.path().join(COLLECTION_ENTRY);

    let summary = build_collection_image(&image_path, assembled, tree, options)?;
    let image = fs::read(&image_path)
        .with_context(|| format!("failed to read collection image {}", image_path.display()))?;
    write_archive(output, &image)?;

    log_info!(
        "wrote {} ({} notes, {} cards, {} decks)",
        output.display(),
        summary.notes,
        summary.cards,
        summary.decks
    );

    Ok(summary)
}
