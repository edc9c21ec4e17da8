pub mod qa;
pub mod sources;
pub mod tsv;

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::models::{GenerationMode, SourceEntries, SourceFile};

pub use sources::{discover, SourcePath};

const ENABLE_LOGS: bool = true;

/// Read and parse one source file in the given mode.
pub fn load_source(source: &SourcePath, mode: GenerationMode) -> Result<SourceFile> {
    let content = fs::read_to_string(&source.path)
        .with_context(|| format!("failed to read {}", source.path.display()))?;
    let label = source.path.display().to_string();

    let (header, entries) = match mode {
        GenerationMode::Glossary => {
            let table = tsv::parse_glossary(&content, &label);
            (table.header, SourceEntries::Glossary(table.entries))
        }
        GenerationMode::Cloze => (None, SourceEntries::Cloze(tsv::parse_cloze(&content, &label))),
    };

    log_info!("{label}: {} entries -> {}", entries.len(), source.group);

    Ok(SourceFile {
        path: source.path.clone(),
        group: source.group.clone(),
        header,
        entries,
    })
}

/// Discover and parse every source file, in sorted path order.
pub fn load_sources(
    input_dir: &Path,
    folder: Option<&str>,
    root_deck: &str,
    mode: GenerationMode,
) -> Result<Vec<SourceFile>> {
    discover(input_dir, folder, root_deck)?
        .iter()
        .map(|source| load_source(source, mode))
        .collect()
}
