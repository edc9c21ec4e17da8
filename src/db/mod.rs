//! Offline maintenance of an existing Anki collection: list decks, snapshot
//! scheduling state by uid and restore it after a regenerated package has
//! been imported.

mod connection;
pub mod helpers;
pub mod models;
mod repositories;
pub mod snapshot;

pub use connection::Database;
pub use models::{CardFilter, DeckSummary, LiveCard, SchedulingState};
pub use snapshot::{RestoreOptions, RestoreReport, Snapshot, SnapshotReport};
