//! Advisory checks over parsed entries.
//!
//! Findings are logged and returned; they never change what gets generated.

use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use crate::models::{SourceEntries, SourceFile};

const ENABLE_LOGS: bool = true;

/// Fields longer than this (in characters) are probably pasted paragraphs.
pub const MAX_FIELD_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// The same prompt appears twice in one deck group.
    DuplicateTerm {
        group: String,
        term: String,
        first: (PathBuf, usize),
        again: (PathBuf, usize),
    },
    /// Both sides of a glossary row are identical.
    IdenticalSides { path: PathBuf, line: usize },
    LongField {
        path: PathBuf,
        line: usize,
        column: &'static str,
        chars: usize,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::DuplicateTerm { group, term, first, again } => write!(
                f,
                "duplicate '{term}' in {group}: {}:{} and {}:{}",
                first.0.display(),
                first.1,
                again.0.display(),
                again.1
            ),
            Finding::IdenticalSides { path, line } => {
                write!(f, "{}:{line}: both sides are identical", path.display())
            }
            Finding::LongField { path, line, column, chars } => write!(
                f,
                "{}:{line}: {column} is {chars} characters long",
                path.display()
            ),
        }
    }
}

fn normalized(term: &str) -> String {
    term.trim().to_lowercase()
}

fn check_length(
    findings: &mut Vec<Finding>,
    path: &Path,
    line: usize,
    column: &'static str,
    value: &str,
) {
    let chars = value.chars().count();
    if chars > MAX_FIELD_CHARS {
        findings.push(Finding::LongField {
            path: path.to_path_buf(),
            line,
            column,
            chars,
        });
    }
}

/// Run every check over `sources`.
pub fn review(sources: &[SourceFile]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut seen: HashMap<(String, String), (PathBuf, usize)> = HashMap::new();

    for source in sources {
        let rows: Vec<(usize, &str)> = match &source.entries {
            SourceEntries::Glossary(entries) => {
                for entry in entries {
                    if normalized(&entry.term1) == normalized(&entry.term2) {
                        findings.push(Finding::IdenticalSides {
                            path: source.path.clone(),
                            line: entry.line,
                        });
                    }
                    check_length(&mut findings, &source.path, entry.line, "term1", &entry.term1);
                    check_length(&mut findings, &source.path, entry.line, "term2", &entry.term2);
                }
                entries.iter().map(|e| (e.line, e.term1.as_str())).collect()
            }
            SourceEntries::Cloze(entries) => {
                for entry in entries {
                    check_length(&mut findings, &source.path, entry.line, "text", &entry.text);
                }
                entries.iter().map(|e| (e.line, e.text.as_str())).collect()
            }
        };

        for (line, term) in rows {
            let key = (source.group.clone(), normalized(term));
            match seen.get(&key) {
                Some(first) => findings.push(Finding::DuplicateTerm {
                    group: source.group.clone(),
                    term: term.trim().to_string(),
                    first: first.clone(),
                    again: (source.path.clone(), line),
                }),
                None => {
                    seen.insert(key, (source.path.clone(), line));
                }
            }
        }
    }

    for finding in &findings {
        log_warn!("QA: {finding}");
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Entry;

    fn entry(line: usize, term1: &str, term2: &str) -> Entry {
        Entry {
            row_id: None,
            term1: term1.into(),
            term2: term2.into(),
            line,
        }
    }

    #[test]
    fn flags_duplicates_identical_sides_and_long_fields() {
        let long = "x".repeat(MAX_FIELD_CHARS + 1);
        let source = SourceFile {
            path: PathBuf::from("a.tsv"),
            group: "Vocabulary::a".into(),
            header: None,
            entries: SourceEntries::Glossary(vec![
                entry(2, "Hola", "hello"),
                entry(3, "hola ", "hi"),
                entry(4, "taxi", "taxi"),
                entry(5, "largo", &long),
            ]),
        };

        let findings = review(&[source]);
        assert_eq!(findings.len(), 3);
        assert!(matches!(findings[0], Finding::IdenticalSides { line: 4, .. }));
        assert!(matches!(findings[1], Finding::LongField { column: "term2", .. }));
        assert!(matches!(&findings[2], Finding::DuplicateTerm { again, .. } if again.1 == 3));
    }

    #[test]
    fn same_term_in_different_groups_is_fine() {
        let make = |group: &str| SourceFile {
            path: PathBuf::from(format!("{group}.tsv")),
            group: group.into(),
            header: None,
            entries: SourceEntries::Glossary(vec![entry(2, "hola", "hello")]),
        };
        assert!(review(&[make("A"), make("B")]).is_empty());
    }
}
