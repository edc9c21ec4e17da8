//! Locating source files and naming their decks.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::utils::text::DECK_SEPARATOR;

const SOURCE_EXTENSION: &str = "tsv";

/// A source file and the deck group its cards belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePath {
    pub path: PathBuf,
    pub group: String,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Every non-hidden `*.tsv` below `dir`. Hidden folders are not descended into.
fn collect_tsv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()));

    let mut files = Vec::new();
    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to read source directory {}", dir.display()))?;
        if entry.file_type().is_file() && is_source_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Deck group for `path`: its folders below `input_dir`, then its file stem.
/// Files directly in `input_dir` go under `root_deck`.
pub fn group_for(input_dir: &Path, path: &Path, root_deck: &str) -> String {
    let relative = path.strip_prefix(input_dir).unwrap_or(path);

    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(|parent| parent.components())
        .map(|component| component.as_os_str().to_string_lossy().trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect();

    if segments.is_empty() {
        segments.push(root_deck.to_string());
    }

    let stem = relative
        .file_stem()
        .map(|stem| stem.to_string_lossy().trim().to_string())
        .unwrap_or_default();
    if !stem.is_empty() {
        segments.push(stem);
    }

    segments.join(DECK_SEPARATOR)
}

/// Every `*.tsv` below `input_dir`, sorted by path, optionally limited to the
/// top-level folder `folder`.
pub fn discover(input_dir: &Path, folder: Option<&str>, root_deck: &str) -> Result<Vec<SourcePath>> {
    if !input_dir.is_dir() {
        bail!("input directory {} does not exist", input_dir.display());
    }

    let search_root = match folder {
        Some(name) => {
            let dir = input_dir.join(name);
            if !dir.is_dir() {
                bail!(
                    "folder '{name}' not found under {}",
                    input_dir.display()
                );
            }
            dir
        }
        None => input_dir.to_path_buf(),
    };

    let mut files = collect_tsv_files(&search_root)?;
    files.sort();

    Ok(files
        .into_iter()
        .map(|path| SourcePath {
            group: group_for(input_dir, &path, root_deck),
            path,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn nested_folders_become_deck_segments() {
        let root = Path::new("/data/tsv");
        assert_eq!(
            group_for(root, Path::new("/data/tsv/Animals/Mammals/cats.tsv"), "Vocabulary"),
            "Animals::Mammals::cats"
        );
    }

    #[test]
    fn top_level_files_use_root_deck() {
        let root = Path::new("/data/tsv");
        assert_eq!(
            group_for(root, Path::new("/data/tsv/misc.tsv"), "Vocabulary"),
            "Vocabulary::misc"
        );
    }

    #[test]
    fn discover_walks_sorted_and_honours_folder() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("Animals")).expect("mkdir");
        fs::create_dir_all(root.join("Food")).expect("mkdir");
        fs::write(root.join("Animals/zoo.tsv"), "a\tb\n").expect("write");
        fs::write(root.join("Animals/farm.tsv"), "a\tb\n").expect("write");
        fs::write(root.join("Animals/notes.txt"), "ignored").expect("write");
        fs::write(root.join("Food/fruit.tsv"), "a\tb\n").expect("write");
        fs::write(root.join("top.tsv"), "a\tb\n").expect("write");

        let all = discover(root, None, "Vocabulary").expect("discover");
        let groups: Vec<_> = all.iter().map(|s| s.group.as_str()).collect();
        assert_eq!(
            groups,
            ["Animals::farm", "Animals::zoo", "Food::fruit", "Vocabulary::top"]
        );

        let animals = discover(root, Some("Animals"), "Vocabulary").expect("discover");
        assert_eq!(animals.len(), 2);

        assert!(discover(root, Some("Plants"), "Vocabulary").is_err());
    }

    #[test]
    fn discover_skips_hidden_entries_and_other_extensions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join(".git/Animals")).expect("mkdir");
        fs::create_dir_all(root.join("Animals/Mammals")).expect("mkdir");
        fs::write(root.join(".git/Animals/stale.tsv"), "a\tb\n").expect("write");
        fs::write(root.join("Animals/.draft.tsv"), "a\tb\n").expect("write");
        fs::write(root.join("Animals/Mammals/cats.TSV"), "a\tb\n").expect("write");
        fs::write(root.join("Animals/birds.tsv.bak"), "a\tb\n").expect("write");
        fs::write(root.join("Animals/birds.tsv"), "a\tb\n").expect("write");

        let found = discover(root, None, "Vocabulary").expect("discover");
        let groups: Vec<_> = found.iter().map(|s| s.group.as_str()).collect();
        assert_eq!(groups, ["Animals::Mammals::cats", "Animals::birds"]);
    }
}
