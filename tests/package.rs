//! End-to-end generation: source folders in, `.apkg` out.

mod common;

use std::{
    collections::BTreeSet,
    fs::{self, File},
    io::Read as _,
    path::{Path, PathBuf},
};

use rstest::rstest;
use rusqlite::Connection;
use tempfile::TempDir;
use vocadeck_lib::{
    models::GenerationMode,
    package::{COLLECTION_ENTRY, MEDIA_ENTRY},
    pipeline::generate,
    settings::Settings,
};
use zip::ZipArchive;

use common::{options_at, write_source};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("tsv");
        write_source(
            &input,
            "Animals/cats.tsv",
            "Español\tEnglish\ngato\tcat\nleón\tlion\n",
        );
        write_source(&input, "Animals/birds.tsv", "Español\tEnglish\npájaro\tbird\n");
        write_source(&input, "basics.tsv", "id\tEspañol\tEnglish\n1\thola\thello\n");
        write_source(
            &input,
            "Grammar/past.tsv",
            "Yo {{c1::fui}} al mercado y {{c2::compré}} pan.\tir / comprar\nSin marcadores.\tnada\n",
        );
        Self { dir }
    }

    fn settings(&self, mode: GenerationMode, folder: Option<&str>) -> Settings {
        Settings {
            input_dir: self.dir.path().join("tsv"),
            output_path: self.dir.path().join("build/deck.apkg"),
            debug_path: self.dir.path().join("build/debug_cards.json"),
            mode,
            direction_labels: true,
            root_deck: "Vocabulary".into(),
            folder: folder.map(str::to_string),
        }
    }
}

/// Unzip the package and open its collection image.
fn open_package(apkg: &Path, scratch: &Path) -> (Vec<String>, Vec<u8>, Connection) {
    let mut archive = ZipArchive::new(File::open(apkg).expect("open apkg")).expect("read zip");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();

    let mut media = Vec::new();
    archive
        .by_name(MEDIA_ENTRY)
        .expect("media entry")
        .read_to_end(&mut media)
        .expect("read media");

    let mut image = Vec::new();
    archive
        .by_name(COLLECTION_ENTRY)
        .expect("collection entry")
        .read_to_end(&mut image)
        .expect("read collection");
    let image_path: PathBuf = scratch.join("extracted.anki2");
    fs::write(&image_path, image).expect("write image");

    (names, media, Connection::open(image_path).expect("open image"))
}

fn deck_names(conn: &Connection) -> BTreeSet<String> {
    let raw: String = conn
        .query_row("SELECT decks FROM col", [], |row| row.get(0))
        .expect("decks json");
    let decks: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&raw).expect("parse decks");
    decks
        .values()
        .map(|deck| deck["name"].as_str().expect("deck name").to_string())
        .collect()
}

fn guids(conn: &Connection) -> BTreeSet<String> {
    conn.prepare("SELECT guid FROM notes")
        .expect("prepare")
        .query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows")
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count")
}

#[test]
fn glossary_package_round_trip() {
    let workspace = Workspace::new();
    let settings = workspace.settings(GenerationMode::Glossary, Some("Animals"));

    let summary = generate(&settings, &options_at(1)).expect("generate");
    assert_eq!(summary.source_files, 2);
    assert_eq!(summary.package.notes, 6);
    assert_eq!(summary.package.cards, 6);

    let (names, media, conn) = open_package(&settings.output_path, workspace.dir.path());
    assert_eq!(names, [COLLECTION_ENTRY, MEDIA_ENTRY]);
    assert_eq!(media, b"{}");
    assert_eq!(count(&conn, "col"), 1);
    assert_eq!(count(&conn, "notes"), 6);
    assert_eq!(count(&conn, "cards"), 6);
    assert_eq!(count(&conn, "revlog"), 0);

    let decks = deck_names(&conn);
    for expected in [
        "Default",
        "Animals",
        "Animals::birds",
        "Animals::birds::Production",
        "Animals::birds::Recognition",
        "Animals::cats",
        "Animals::cats::Production",
        "Animals::cats::Recognition",
    ] {
        assert!(decks.contains(expected), "missing deck {expected}");
    }
    assert!(!decks.iter().any(|deck| deck.starts_with("Vocabulary")));

    let flds: String = conn
        .query_row(
            "SELECT flds FROM notes WHERE sfld = 'gato'",
            [],
            |row| row.get(0),
        )
        .expect("gato note");
    let fields: Vec<&str> = flds.split('\u{1f}').collect();
    assert!(fields[0].starts_with("vocadeck:animals-cats:gato:h="));
    assert_eq!(&fields[1..], ["gato", "cat", "Español → English"]);

    assert!(settings.debug_path.is_file());
}

#[test]
fn regenerating_keeps_guids() {
    let workspace = Workspace::new();
    let settings = workspace.settings(GenerationMode::Glossary, None);

    generate(&settings, &options_at(1)).expect("first run");
    let (_, _, first) = open_package(&settings.output_path, workspace.dir.path());
    let first_guids = guids(&first);
    drop(first);

    generate(&settings, &options_at(20)).expect("second run");
    let (_, _, second) = open_package(&settings.output_path, workspace.dir.path());

    assert_eq!(first_guids.len(), 10);
    assert_eq!(first_guids, guids(&second));
    assert!(deck_names(&second).contains("Vocabulary::basics::Recognition"));
}

#[test]
fn cloze_package_expands_markers() {
    let workspace = Workspace::new();
    let settings = workspace.settings(GenerationMode::Cloze, Some("Grammar"));

    let summary = generate(&settings, &options_at(2)).expect("generate");
    assert_eq!(summary.package.notes, 1);
    assert_eq!(summary.package.cards, 2);
    assert_eq!(summary.package.skipped_notes, 1);

    let (_, _, conn) = open_package(&settings.output_path, workspace.dir.path());
    let ords: Vec<i64> = conn
        .prepare("SELECT ord FROM cards ORDER BY ord")
        .expect("prepare")
        .query_map([], |row| row.get(0))
        .expect("query")
        .collect::<Result<_, _>>()
        .expect("rows");
    assert_eq!(ords, [0, 1]);
    assert!(deck_names(&conn).contains("Grammar::past"));
}

#[rstest]
#[case::unknown_folder(Some("Nope"))]
#[case::folder_is_a_file(Some("basics.tsv"))]
fn bad_folder_is_a_structural_error(#[case] folder: Option<&str>) {
    let workspace = Workspace::new();
    let settings = workspace.settings(GenerationMode::Glossary, folder);

    assert!(generate(&settings, &options_at(3)).is_err());
    assert!(!settings.output_path.exists());
}
