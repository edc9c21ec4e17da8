#[macro_use]
pub mod utils;

pub mod assembly;
pub mod cli;
pub mod db;
pub mod decks;
pub mod identity;
pub mod models;
pub mod package;
pub mod parser;
pub mod pipeline;
pub mod settings;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use cli::{GenerateArgs, SchedArgs, SchedCommand};
use db::{snapshot, Database, RestoreOptions, Snapshot};
use package::PackageOptions;
use settings::Settings;

fn init_logging() {
    // Reads RUST_LOG; defaults to info.
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn report_failure(err: anyhow::Error) -> ExitCode {
    error!("{err:#}");
    ExitCode::FAILURE
}

/// Entry point of the `vocadeck` binary.
pub fn run() -> ExitCode {
    init_logging();
    let args = GenerateArgs::parse();

    match generate(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(err),
    }
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let summary = pipeline::generate(&settings, &PackageOptions::default())?;
    info!(
        "{} files, {} notes, {} cards in {} decks ({} skipped, {} QA findings)",
        summary.source_files,
        summary.package.notes,
        summary.package.cards,
        summary.package.decks,
        summary.package.skipped_notes,
        summary.qa_findings
    );
    Ok(())
}

/// Entry point of the `vocadeck-sched` binary.
pub fn run_sched() -> ExitCode {
    init_logging();
    let args = SchedArgs::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
    {
        Ok(runtime) => runtime,
        Err(err) => return report_failure(err),
    };

    match runtime.block_on(sched(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(err),
    }
}

async fn sched(args: SchedArgs) -> Result<()> {
    let database = Database::open(args.db)?;

    match args.command {
        SchedCommand::ListDecks => {
            for deck in database.list_decks().await? {
                println!("{:>6}  {}  ({})", deck.card_count, deck.name, deck.id);
            }
        }
        SchedCommand::Snapshot { out, selection } => {
            let (snapshot, report) =
                snapshot::take_snapshot(&database, &selection.filter(), selection.uid_field)
                    .await?;
            snapshot.save(&out)?;
            info!(
                "wrote {} ({} recorded, {} skipped without uid, {} duplicates)",
                out.display(),
                report.recorded,
                report.skipped_no_uid,
                report.duplicates
            );
        }
        SchedCommand::Restore {
            from,
            selection,
            dry_run,
            no_backup,
        } => {
            let snapshot = Snapshot::load(&from)?;
            let options = RestoreOptions {
                dry_run,
                backup: !no_backup,
            };
            let report = snapshot::restore(
                &database,
                &snapshot,
                &selection.filter(),
                selection.uid_field,
                options,
            )
            .await?;
            info!(
                "matched {}, updated {}, missing {} ({} not in snapshot, {} unused), without uid {}",
                report.matched,
                report.updated,
                report.missing,
                report.not_in_snapshot,
                report.unused,
                report.skipped_no_uid
            );
            if let Some(backup) = report.backup {
                info!("backup at {}", backup.display());
            }
        }
    }

    Ok(())
}
