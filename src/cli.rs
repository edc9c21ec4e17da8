//! Command-line arguments for both binaries.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{db::CardFilter, db::snapshot::DEFAULT_UID_FIELD, models::GenerationMode, settings::Settings};

/// Build an Anki package from tab-separated vocabulary or cloze files.
#[derive(Debug, Parser)]
#[command(name = "vocadeck", version, about)]
pub struct GenerateArgs {
    /// Kind of package to build.
    #[arg(long, value_enum)]
    pub mode: Option<GenerationMode>,

    /// Only read this top-level folder of the input directory.
    #[arg(long)]
    pub folder: Option<String>,

    /// Show "<label1> → <label2>" on glossary cards that have a header row.
    #[arg(long)]
    pub labels: bool,

    /// Directory holding the `.tsv` sources.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Where to write the `.apkg`.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Where to write the JSON dump of the assembled cards.
    #[arg(long = "debug-output")]
    pub debug_output: Option<PathBuf>,

    /// Settings file (defaults to ./vocadeck.json when present).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GenerateArgs {
    /// Flags given on the command line win over the settings file.
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(folder) = &self.folder {
            settings.folder = Some(folder.clone());
        }
        if self.labels {
            settings.direction_labels = true;
        }
        if let Some(input) = &self.input {
            settings.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            settings.output_path = output.clone();
        }
        if let Some(debug) = &self.debug_output {
            settings.debug_path = debug.clone();
        }
    }
}

/// Snapshot and restore card scheduling in a closed Anki collection.
#[derive(Debug, Parser)]
#[command(name = "vocadeck-sched", version, about)]
pub struct SchedArgs {
    /// Path to `collection.anki2`. Close Anki first.
    #[arg(long, global = true, default_value = "collection.anki2")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: SchedCommand,
}

#[derive(Debug, Subcommand)]
pub enum SchedCommand {
    /// List decks with their card counts.
    ListDecks,
    /// Record scheduling state of matching cards, keyed by uid.
    Snapshot {
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        selection: Selection,
    },
    /// Write a snapshot's scheduling state back onto matching cards.
    Restore {
        #[arg(long = "from")]
        from: PathBuf,
        #[command(flatten)]
        selection: Selection,
        /// Report what would change without writing.
        #[arg(long)]
        dry_run: bool,
        /// Skip the timestamped backup copy.
        #[arg(long)]
        no_backup: bool,
    },
}

#[derive(Debug, Clone, Args)]
pub struct Selection {
    /// Deck (and its subdecks) to restrict to.
    #[arg(long)]
    pub deck: Option<String>,

    /// Exact note type name.
    #[arg(long)]
    pub note_type: Option<String>,

    /// Tag, case-insensitive.
    #[arg(long)]
    pub tag: Option<String>,

    /// Field index holding the uid.
    #[arg(long, default_value_t = DEFAULT_UID_FIELD)]
    pub uid_field: usize,
}

impl Selection {
    pub fn filter(&self) -> CardFilter {
        CardFilter {
            deck_prefix: self.deck.clone(),
            note_type: self.note_type.clone(),
            tag: self.tag.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_settings() {
        let args = GenerateArgs::parse_from([
            "vocadeck",
            "--mode",
            "cloze",
            "--folder",
            "Grammar",
            "--labels",
            "--output",
            "out/deck.apkg",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings.mode, GenerationMode::Cloze);
        assert_eq!(settings.folder.as_deref(), Some("Grammar"));
        assert!(settings.direction_labels);
        assert_eq!(settings.output_path, PathBuf::from("out/deck.apkg"));
        assert_eq!(settings.input_dir, PathBuf::from("tsv"));
    }

    #[test]
    fn restore_parses_selection() {
        let args = SchedArgs::parse_from([
            "vocadeck-sched",
            "--db",
            "c.anki2",
            "restore",
            "--from",
            "snap.json",
            "--deck",
            "Animals",
            "--uid-field",
            "2",
            "--dry-run",
        ]);
        match args.command {
            SchedCommand::Restore { from, selection, dry_run, no_backup } => {
                assert_eq!(from, PathBuf::from("snap.json"));
                assert_eq!(selection.filter().deck_prefix.as_deref(), Some("Animals"));
                assert_eq!(selection.uid_field, 2);
                assert!(dry_run);
                assert!(!no_backup);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
