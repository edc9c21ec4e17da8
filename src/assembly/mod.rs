//! Turns parsed entries into cards (glossary mode) or notes (cloze mode).

use std::collections::BTreeSet;

use crate::{
    identity::{derive_uid, UidSource},
    models::{Assembled, Card, CardKind, ClozeEntry, ClozeNote, Entry, GenerationMode, SourceEntries, SourceFile},
    utils::text::{deck_tag, DECK_SEPARATOR},
};

const ENABLE_LOGS: bool = true;

pub const VOCAB_TAG: &str = "vocab";
pub const CLOZE_TAG: &str = "cloze";
pub const CLOZE_KIND: &str = "cloze";

#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    pub mode: GenerationMode,
    /// Show "<label1> → <label2>" on glossary cards when the file has a header.
    pub direction_labels: bool,
}

fn card_for(
    entry: &Entry,
    group: &str,
    kind: CardKind,
    direction: &str,
) -> Card {
    let (front, back) = match kind {
        CardKind::Recognition => (&entry.term1, &entry.term2),
        CardKind::Production => (&entry.term2, &entry.term1),
    };
    let deck = format!("{group}{DECK_SEPARATOR}{}", kind.deck_segment());

    let uid = derive_uid(UidSource {
        group,
        kind: kind.as_str(),
        row_id: entry.row_id.as_deref(),
        field1: front,
        field2: back,
        label: front,
    });

    let tags = BTreeSet::from([
        VOCAB_TAG.to_string(),
        deck_tag(&deck),
        kind.as_str().to_string(),
        uid.clone(),
    ]);

    Card {
        kind,
        deck,
        front: front.clone(),
        back: back.clone(),
        uid,
        tags,
        direction: direction.to_string(),
    }
}

/// Recognition and production card for every entry, in entry order.
pub fn assemble_glossary(
    group: &str,
    entries: &[Entry],
    header: Option<&(String, String)>,
    direction_labels: bool,
) -> Vec<Card> {
    let (recognition_label, production_label) = match header {
        Some((left, right)) if direction_labels => {
            (format!("{left} → {right}"), format!("{right} → {left}"))
        }
        _ => (String::new(), String::new()),
    };

    entries
        .iter()
        .flat_map(|entry| {
            [
                card_for(entry, group, CardKind::Recognition, &recognition_label),
                card_for(entry, group, CardKind::Production, &production_label),
            ]
        })
        .collect()
}

/// One note per entry, filed directly under the group deck.
pub fn assemble_cloze(group: &str, entries: &[ClozeEntry]) -> Vec<ClozeNote> {
    entries
        .iter()
        .map(|entry| {
            let label = if entry.hint.trim().is_empty() { &entry.text } else { &entry.hint };
            let uid = derive_uid(UidSource {
                group,
                kind: CLOZE_KIND,
                row_id: entry.row_id.as_deref(),
                field1: &entry.text,
                field2: &entry.hint,
                label,
            });

            let tags = BTreeSet::from([CLOZE_TAG.to_string(), deck_tag(group), uid.clone()]);

            ClozeNote {
                deck: group.to_string(),
                text: entry.text.clone(),
                hint: entry.hint.clone(),
                uid,
                tags,
            }
        })
        .collect()
}

/// Assemble every source file, concatenated in the order given.
///
/// Files whose entries don't match `options.mode` are skipped with a warning;
/// the parser never produces them for a single run.
pub fn assemble(sources: &[SourceFile], options: AssemblyOptions) -> Assembled {
    match options.mode {
        GenerationMode::Glossary => {
            let mut cards = Vec::new();
            for source in sources {
                match &source.entries {
                    SourceEntries::Glossary(entries) => cards.extend(assemble_glossary(
                        &source.group,
                        entries,
                        source.header.as_ref(),
                        options.direction_labels,
                    )),
                    SourceEntries::Cloze(_) => {
                        log_warn!("{}: cloze entries in a glossary run, skipping", source.path.display())
                    }
                }
            }
            log_info!("assembled {} glossary cards", cards.len());
            Assembled::Glossary(cards)
        }
        GenerationMode::Cloze => {
            let mut notes = Vec::new();
            for source in sources {
                match &source.entries {
                    SourceEntries::Cloze(entries) => notes.extend(assemble_cloze(&source.group, entries)),
                    SourceEntries::Glossary(_) => {
                        log_warn!("{}: glossary entries in a cloze run, skipping", source.path.display())
                    }
                }
            }
            log_info!("assembled {} cloze notes", notes.len());
            Assembled::Cloze(notes)
        }
    }
}
