//! Fixtures shared by the integration tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{TimeZone as _, Utc};
use vocadeck_lib::{
    assembly::assemble_glossary,
    decks::DeckTree,
    models::{Assembled, Entry},
    package::{build_collection_image, PackageOptions},
};

/// Write `content` to `root/relative`, creating folders on the way.
#[allow(dead_code, reason = "not every test binary uses every fixture")]
pub fn write_source(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create source folder");
    }
    fs::write(path, content).expect("write source file");
}

/// Creation time fixed per test so ids are reproducible.
#[allow(dead_code, reason = "not every test binary uses every fixture")]
pub fn options_at(day: u32) -> PackageOptions {
    PackageOptions {
        created_at: Utc
            .with_ymd_and_hms(2024, 5, day, 9, 30, 0)
            .single()
            .expect("valid fixture date"),
    }
}

#[allow(dead_code, reason = "not every test binary uses every fixture")]
pub fn entry(term1: &str, term2: &str) -> Entry {
    Entry {
        row_id: None,
        term1: term1.into(),
        term2: term2.into(),
        line: 0,
    }
}

/// A bare `collection.anki2` holding two cards per entry under
/// `Animals::cats`, as Anki would have it after importing the package.
#[allow(dead_code, reason = "not every test binary uses every fixture")]
pub fn collection_with(dir: &Path, name: &str, entries: &[Entry], day: u32) -> PathBuf {
    let cards = assemble_glossary("Animals::cats", entries, None, false);
    let assembled = Assembled::Glossary(cards);
    let tree = DeckTree::build(assembled.deck_paths());

    let path = dir.join(name);
    build_collection_image(&path, &assembled, &tree, &options_at(day)).expect("build collection");
    path
}
