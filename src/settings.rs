use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::models::GenerationMode;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_SETTINGS_FILE: &str = "vocadeck.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub debug_path: PathBuf,
    pub mode: GenerationMode,
    pub direction_labels: bool,
    /// Deck for files sitting directly in `input_dir`.
    pub root_deck: String,
    /// Restrict generation to one top-level folder of `input_dir`.
    pub folder: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("tsv"),
            output_path: PathBuf::from("build/vocabulary.apkg"),
            debug_path: PathBuf::from("build/debug_cards.json"),
            mode: GenerationMode::Glossary,
            direction_labels: false,
            root_deck: "Vocabulary".into(),
            folder: None,
        }
    }
}

impl Settings {
    /// Read settings from `path`, or from [`DEFAULT_SETTINGS_FILE`] when it
    /// exists. An explicit path that doesn't exist is an error; a missing
    /// default file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(explicit) if !explicit.is_file() => {
                bail!("config file {} does not exist", explicit.display())
            }
            Some(explicit) => explicit.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_SETTINGS_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings in {}", path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.root_deck.trim().is_empty() {
            bail!("rootDeck must not be empty");
        }
        if self.folder.as_deref().is_some_and(|f| f.trim().is_empty()) {
            bail!("folder must not be empty when set");
        }
        Ok(())
    }
}
