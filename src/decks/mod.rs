//! Deck hierarchy derived from card deck paths.
//!
//! Anki stores decks flat, keyed by id, with the hierarchy encoded in the
//! `::`-separated name. Every ancestor of a used deck must exist as its own
//! deck record, so the tree is built from all path prefixes.

pub mod config;

use std::collections::{BTreeMap, BTreeSet};

pub use config::{DeckOptions, OptionGroup};

use crate::utils::text::DECK_SEPARATOR;

const ENABLE_LOGS: bool = true;

/// Id and name of the deck Anki always has.
pub const DEFAULT_DECK_ID: i64 = 1;
pub const DEFAULT_DECK_NAME: &str = "Default";

/// First id handed out to generated decks.
pub const DECK_ID_BASE: i64 = 1_500_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckNode {
    pub id: i64,
    /// Full `::`-joined name.
    pub name: String,
    /// Number of segments; the default deck has depth 1.
    pub depth: usize,
    pub options: DeckOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckTree {
    nodes: BTreeMap<String, DeckNode>,
}

/// Trim every segment and drop empty ones.
pub fn normalize_path(path: &str) -> String {
    path.split(DECK_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(DECK_SEPARATOR)
}

/// `A::B::C` -> `A`, `A::B`, `A::B::C`.
fn prefixes(path: &str) -> impl Iterator<Item = String> + '_ {
    let segments: Vec<&str> = path.split(DECK_SEPARATOR).collect();
    (1..=segments.len()).map(move |depth| segments[..depth].join(DECK_SEPARATOR))
}

fn depth_of(path: &str) -> usize {
    path.split(DECK_SEPARATOR).count()
}

impl DeckTree {
    /// Build the tree for `paths`. Ids go out in (depth, name) order starting
    /// at [`DECK_ID_BASE`], so a parent's id is always below its children's
    /// and the same set of paths always gets the same ids.
    pub fn build<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut all: BTreeSet<(usize, String)> = BTreeSet::new();
        for path in paths {
            let path = normalize_path(path);
            if path.is_empty() {
                log_warn!("ignoring empty deck path");
                continue;
            }
            for prefix in prefixes(&path) {
                if prefix != DEFAULT_DECK_NAME {
                    all.insert((depth_of(&prefix), prefix));
                }
            }
        }

        let mut nodes = BTreeMap::new();
        nodes.insert(
            DEFAULT_DECK_NAME.to_string(),
            DeckNode {
                id: DEFAULT_DECK_ID,
                name: DEFAULT_DECK_NAME.to_string(),
                depth: 1,
                options: DeckOptions::default(),
            },
        );

        let mut next_id = DECK_ID_BASE;
        for (depth, name) in all {
            nodes.insert(
                name.clone(),
                DeckNode {
                    id: next_id,
                    name,
                    depth,
                    options: DeckOptions::default(),
                },
            );
            next_id += 1;
        }

        Self { nodes }
    }

    pub fn get(&self, path: &str) -> Option<&DeckNode> {
        self.nodes.get(&normalize_path(path))
    }

    /// Deck id for `path`, or the default deck if the path is unknown.
    pub fn id_for(&self, path: &str) -> i64 {
        match self.get(path) {
            Some(node) => node.id,
            None => {
                log::warn!("deck '{path}' missing from deck tree, filing under {DEFAULT_DECK_NAME}");
                DEFAULT_DECK_ID
            }
        }
    }

    /// Nodes in ascending id order (default deck first).
    pub fn iter(&self) -> impl Iterator<Item = &DeckNode> {
        let mut nodes: Vec<&DeckNode> = self.nodes.values().collect();
        nodes.sort_by_key(|node| node.id);
        nodes.into_iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
