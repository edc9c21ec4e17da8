//! One generation run: discover → parse → review → assemble → deck tree →
//! debug dump → package.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    assembly::{assemble, AssemblyOptions},
    decks::DeckTree,
    models::Assembled,
    package::{write_package, PackageOptions, PackageSummary},
    parser::{load_sources, qa},
    settings::Settings,
};

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSummary {
    pub source_files: usize,
    pub qa_findings: usize,
    pub package: PackageSummary,
}

/// Pretty JSON of everything that went into the package.
pub fn write_debug_dump(path: &Path, assembled: &Assembled) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let serialized = serde_json::to_string_pretty(assembled)?;
    fs::write(path, serialized)
        .with_context(|| format!("failed to write debug dump {}", path.display()))
}

pub fn generate(settings: &Settings, options: &PackageOptions) -> Result<GenerationSummary> {
    log_info!(
        "generating {} package from {}",
        settings.mode.as_str(),
        settings.input_dir.display()
    );

    let sources = load_sources(
        &settings.input_dir,
        settings.folder.as_deref(),
        &settings.root_deck,
        settings.mode,
    )?;
    if sources.is_empty() {
        log_warn!("no source files found under {}", settings.input_dir.display());
    }

    let findings = qa::review(&sources);

    let assembled = assemble(
        &sources,
        AssemblyOptions {
            mode: settings.mode,
            direction_labels: settings.direction_labels,
        },
    );
    let tree = DeckTree::build(assembled.deck_paths());

    write_debug_dump(&settings.debug_path, &assembled)?;
    let package = write_package(&settings.output_path, &assembled, &tree, options)?;

    Ok(GenerationSummary {
        source_files: sources.len(),
        qa_findings: findings.len(),
        package,
    })
}
