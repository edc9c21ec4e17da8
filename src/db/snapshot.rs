//! Scheduling snapshots keyed by note uid.
//!
//! A snapshot maps `<uid>::ord=<ord>` to the scheduling columns of one card.
//! Because uids are derived from content, a regenerated and re-imported
//! package produces cards with the same keys, and their review history can
//! be put back with [`restore`].

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        connection::Database,
        models::{CardFilter, LiveCard, SchedulingState},
    },
    identity::is_uid,
    utils::text::strip_html,
};

const ENABLE_LOGS: bool = true;

/// Field holding the uid on the two-sided note type.
pub const DEFAULT_UID_FIELD: usize = 0;

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub created_at: DateTime<Utc>,
    /// Collection the snapshot was taken from.
    pub source: PathBuf,
    pub uid_field: usize,
    #[serde(default)]
    pub filter: CardFilter,
    pub cards: BTreeMap<String, SchedulingState>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            bail!("snapshot {} does not exist", path.display());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read snapshot {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse snapshot {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write snapshot {}", path.display()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SnapshotReport {
    pub scanned: usize,
    pub recorded: usize,
    pub skipped_no_uid: usize,
    /// Cards whose key was already recorded; the first one wins.
    pub duplicates: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct RestoreOptions {
    pub dry_run: bool,
    pub backup: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Live cards whose key was found in the snapshot.
    pub matched: usize,
    /// Rows actually written. Zero on a dry run.
    pub updated: usize,
    /// Keys present on one side only: `not_in_snapshot + unused`.
    pub missing: usize,
    /// Live cards with a uid the snapshot doesn't know. Left untouched.
    pub not_in_snapshot: usize,
    /// Snapshot keys no live card matched. Nothing is written for them.
    pub unused: usize,
    pub skipped_no_uid: usize,
    pub backup: Option<PathBuf>,
}

/// The card's uid, from field `uid_field` when it holds one, else from the
/// first uid-shaped tag.
pub fn extract_uid(card: &LiveCard, uid_field: usize) -> Option<String> {
    let from_field = card
        .fields
        .get(uid_field)
        .map(|raw| strip_html(raw))
        .filter(|value| is_uid(value));

    from_field.or_else(|| card.tags.iter().find(|tag| is_uid(tag)).cloned())
}

pub fn snapshot_key(uid: &str, ord: i64) -> String {
    format!("{uid}::ord={ord}")
}

/// Scheduling state as it will look once the card is back in its home deck.
fn home_state(card: &LiveCard) -> SchedulingState {
    let mut state = card.state.clone();
    if card.in_filtered_deck {
        state.due = card.original_due;
    }
    state
}

/// Record the scheduling state of every card matching `filter`.
pub async fn take_snapshot(
    db: &Database,
    filter: &CardFilter,
    uid_field: usize,
) -> Result<(Snapshot, SnapshotReport)> {
    let cards = db.live_cards(filter.clone()).await?;
    let mut report = SnapshotReport {
        scanned: cards.len(),
        ..SnapshotReport::default()
    };
    let mut recorded = BTreeMap::new();

    for card in &cards {
        let Some(uid) = extract_uid(card, uid_field) else {
            log_debug!("card {} has no uid, skipping", card.id);
            report.skipped_no_uid += 1;
            continue;
        };

        let key = snapshot_key(&uid, card.ord);
        if recorded.contains_key(&key) {
            log_warn!("duplicate snapshot key {key} (card {})", card.id);
            report.duplicates += 1;
            continue;
        }
        recorded.insert(key, home_state(card));
    }
    report.recorded = recorded.len();

    log_info!(
        "snapshot: {} cards scanned, {} recorded, {} without uid",
        report.scanned,
        report.recorded,
        report.skipped_no_uid
    );

    let snapshot = Snapshot {
        created_at: Utc::now(),
        source: db.path().to_path_buf(),
        uid_field,
        filter: filter.clone(),
        cards: recorded,
    };
    Ok((snapshot, report))
}

/// `<file>.<YYYYmmdd-HHMMSS>.bak` next to `path`.
pub fn backup_path(path: &Path, at: DateTime<Local>) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(format!(".{}.bak", at.format(BACKUP_TIMESTAMP_FORMAT)));
    path.with_file_name(name)
}

/// Copy the collection, and its write-ahead log when there is one.
fn backup_collection(path: &Path) -> Result<PathBuf> {
    let target = backup_path(path, Local::now());
    fs::copy(path, &target)
        .with_context(|| format!("failed to back up {} to {}", path.display(), target.display()))?;

    let mut wal = path.as_os_str().to_os_string();
    wal.push("-wal");
    let wal = PathBuf::from(wal);
    if wal.is_file() {
        let mut wal_target = target.as_os_str().to_os_string();
        wal_target.push("-wal");
        fs::copy(&wal, &wal_target)
            .with_context(|| format!("failed to back up {}", wal.display()))?;
    }

    log_info!("backed up collection to {}", target.display());
    Ok(target)
}

/// Write the snapshot's scheduling state back onto matching live cards.
pub async fn restore(
    db: &Database,
    snapshot: &Snapshot,
    filter: &CardFilter,
    uid_field: usize,
    options: RestoreOptions,
) -> Result<RestoreReport> {
    let cards = db.live_cards(filter.clone()).await?;
    let mut report = RestoreReport::default();
    let mut seen = BTreeSet::new();
    let mut updates = Vec::new();

    for card in &cards {
        let Some(uid) = extract_uid(card, uid_field) else {
            report.skipped_no_uid += 1;
            continue;
        };

        let key = snapshot_key(&uid, card.ord);
        match snapshot.cards.get_key_value(&key) {
            Some((key, state)) => {
                report.matched += 1;
                seen.insert(key.as_str());
                updates.push((card.id, state.clone()));
            }
            None => {
                log_debug!("{key} not in snapshot, leaving card {} untouched", card.id);
                report.not_in_snapshot += 1;
            }
        }
    }
    report.unused = snapshot.cards.len() - seen.len();
    report.missing = report.not_in_snapshot + report.unused;

    if options.dry_run {
        log_info!("dry run: {} cards would be restored", updates.len());
        return Ok(report);
    }
    if updates.is_empty() {
        log_info!("nothing to restore");
        return Ok(report);
    }

    if options.backup {
        report.backup = Some(backup_collection(db.path())?);
    }

    report.updated = db.apply_scheduling(updates, Utc::now().timestamp()).await?;
    log_info!(
        "restored {} cards ({} missing: {} not in snapshot, {} unused snapshot entries)",
        report.updated,
        report.missing,
        report.not_in_snapshot,
        report.unused
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    const UID: &str = "vocadeck:animals:gato:h=0123456789ab";

    fn card(fields: &[&str], tags: &[&str]) -> LiveCard {
        LiveCard {
            id: 10,
            note_id: 1,
            ord: 0,
            deck: "Animals".into(),
            note_type: "Vocadeck Cloze".into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            in_filtered_deck: false,
            original_due: 0,
            state: SchedulingState {
                card_type: 2,
                queue: 2,
                due: 30,
                ivl: 4,
                factor: 2500,
                reps: 3,
                lapses: 0,
                left: 0,
                flags: 0,
                data: String::new(),
            },
        }
    }

    #[test]
    fn uid_comes_from_field_then_tags() {
        let in_field = card(&[&format!("<div>{UID}</div>"), "gato"], &[]);
        assert_eq!(extract_uid(&in_field, 0).as_deref(), Some(UID));

        let in_tags = card(&["Yo {{c1::fui}}", "ir"], &["cloze", UID]);
        assert_eq!(extract_uid(&in_tags, 0).as_deref(), Some(UID));

        let neither = card(&["gato", "cat"], &["vocab"]);
        assert_eq!(extract_uid(&neither, 0), None);
    }

    #[test]
    fn filtered_cards_record_home_due() {
        let mut filtered = card(&[UID], &[]);
        filtered.in_filtered_deck = true;
        filtered.state.due = -100_000;
        filtered.original_due = 42;

        assert_eq!(home_state(&filtered).due, 42);
        assert_eq!(home_state(&card(&[UID], &[])).due, 30);
    }

    #[test]
    fn backup_name_carries_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = backup_path(Path::new("/data/collection.anki2"), at);
        assert_eq!(path, Path::new("/data/collection.anki2.20240309-070501.bak"));
    }

    #[test]
    fn missing_snapshot_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Snapshot::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
