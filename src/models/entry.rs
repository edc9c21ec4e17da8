//! Parsed source rows.
//!
//! Entries are produced by the parser and consumed once by the assembler.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which kind of package a run produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Two-column vocabulary, recognition and production cards.
    #[default]
    Glossary,
    /// Text with `{{cN::...}}` deletions plus a hint.
    Cloze,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Glossary => "glossary",
            GenerationMode::Cloze => "cloze",
        }
    }
}

/// One glossary row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub row_id: Option<String>,
    pub term1: String,
    pub term2: String,
    /// 1-based line in the source file.
    pub line: usize,
}

/// One cloze row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClozeEntry {
    pub row_id: Option<String>,
    pub text: String,
    pub hint: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntries {
    Glossary(Vec<Entry>),
    Cloze(Vec<ClozeEntry>),
}

impl SourceEntries {
    pub fn len(&self) -> usize {
        match self {
            SourceEntries::Glossary(entries) => entries.len(),
            SourceEntries::Cloze(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything parsed out of a single TSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Deck path this file's cards are filed under, e.g. `Animals::food`.
    pub group: String,
    /// Column labels from the glossary header row, if there was one.
    pub header: Option<(String, String)>,
    pub entries: SourceEntries,
}
