pub mod card;
pub mod entry;

pub use card::{Assembled, Card, CardKind, ClozeNote};
pub use entry::{ClozeEntry, Entry, GenerationMode, SourceEntries, SourceFile};
