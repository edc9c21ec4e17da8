//! Row-level TSV parsing.
//!
//! Bad rows never abort a file: they come back as [`RowError`], get logged
//! with their line number and are skipped.

use thiserror::Error;

use crate::models::{ClozeEntry, Entry};

const ENABLE_LOGS: bool = true;

const BOM: char = '\u{feff}';

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("expected 2 or 3 tab-separated columns, found {found}")]
    ColumnCount { found: usize },

    #[error("required column `{column}` is empty")]
    EmptyField { column: &'static str },
}

/// Non-empty lines with their 1-based line numbers.
fn content_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(idx, line)| {
            let line = if idx == 0 { line.trim_start_matches(BOM) } else { line };
            (idx + 1, line)
        })
        .filter(|(_, line)| !line.trim().is_empty())
}

fn split_row(line: &str) -> Vec<&str> {
    line.split('\t').map(str::trim).collect()
}

/// `[id,] a, b` with the id column treated as absent when blank.
fn split_optional_id<'a>(fields: &[&'a str]) -> Result<(Option<&'a str>, &'a str, &'a str), RowError> {
    match *fields {
        [a, b] => Ok((None, a, b)),
        [id, a, b] => Ok((Some(id).filter(|id| !id.is_empty()), a, b)),
        _ => Err(RowError::ColumnCount { found: fields.len() }),
    }
}

pub fn parse_glossary_row(line: &str, line_no: usize) -> Result<Entry, RowError> {
    let fields = split_row(line);
    let (row_id, term1, term2) = split_optional_id(&fields)?;

    if term1.is_empty() {
        return Err(RowError::EmptyField { column: "term1" });
    }
    if term2.is_empty() {
        return Err(RowError::EmptyField { column: "term2" });
    }

    Ok(Entry {
        row_id: row_id.map(str::to_string),
        term1: term1.to_string(),
        term2: term2.to_string(),
        line: line_no,
    })
}

pub fn parse_cloze_row(line: &str, line_no: usize) -> Result<ClozeEntry, RowError> {
    let fields = split_row(line);
    let (row_id, text, hint) = split_optional_id(&fields)?;

    if text.is_empty() {
        return Err(RowError::EmptyField { column: "text" });
    }

    Ok(ClozeEntry {
        row_id: row_id.map(str::to_string),
        text: text.to_string(),
        hint: hint.to_string(),
        line: line_no,
    })
}

/// Parsed glossary file: the header labels (if usable) and the good rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlossaryTable {
    pub header: Option<(String, String)>,
    pub entries: Vec<Entry>,
}

/// Parse a glossary file. The first non-empty line is always the header.
pub fn parse_glossary(content: &str, source: &str) -> GlossaryTable {
    let mut lines = content_lines(content);
    let mut table = GlossaryTable::default();

    let Some((header_no, header_line)) = lines.next() else {
        log_warn!("{source}: file is empty");
        return table;
    };

    match split_optional_id(&split_row(header_line)) {
        Ok((_, left, right)) if !left.is_empty() && !right.is_empty() => {
            table.header = Some((left.to_string(), right.to_string()));
        }
        Ok(_) => log_warn!("{source}:{header_no}: header has empty labels, ignoring it"),
        Err(err) => log_warn!("{source}:{header_no}: unusable header ({err}), ignoring it"),
    }

    for (line_no, line) in lines {
        match parse_glossary_row(line, line_no) {
            Ok(entry) => table.entries.push(entry),
            Err(err) => log_warn!("{source}:{line_no}: skipping row: {err}"),
        }
    }

    table
}

/// Parse a cloze file. Every non-empty line is a row; there is no header.
pub fn parse_cloze(content: &str, source: &str) -> Vec<ClozeEntry> {
    content_lines(content)
        .filter_map(|(line_no, line)| match parse_cloze_row(line, line_no) {
            Ok(entry) => Some(entry),
            Err(err) => {
                log_warn!("{source}:{line_no}: skipping row: {err}");
                None
            }
        })
        .collect()
}
