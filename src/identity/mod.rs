//! Content-derived identifiers for notes.
//!
//! Two one-way digests are involved and they must never be confused:
//!
//! - [`derive_uid`] builds the human-readable uid (`vocadeck:...:h=<hex>`)
//!   from the canonical seed of a row. It is stored in the note and in its
//!   tags, and keys the scheduling snapshots of the maintenance utility.
//! - [`note_guid`] hashes the uid again into the short guid Anki requires on
//!   every note. Same uid, same guid, so re-importing a regenerated package
//!   updates notes in place instead of duplicating them.
//!
//! Both are plain SHA-256 truncations. Neither needs cryptographic strength;
//! they only need to stay collision-free across a few tens of thousands of
//! rows and never change between releases.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};

use crate::utils::text::slugify;

/// First segment of every uid.
pub const UID_NAMESPACE: &str = "vocadeck";

const DIGEST_HEX_LEN: usize = 12;
const GUID_BYTES: usize = 9;
const SLUG_MAX_LEN: usize = 24;
const SEED_SEPARATOR: &str = "||";

/// Inputs for [`derive_uid`].
#[derive(Debug, Clone, Copy)]
pub struct UidSource<'a> {
    /// Deck or logical group the row belongs to.
    pub group: &'a str,
    /// Card or note kind (`recognition`, `production`, `cloze`).
    pub kind: &'a str,
    pub row_id: Option<&'a str>,
    /// Front for glossary cards, text for cloze notes.
    pub field1: &'a str,
    /// Back for glossary cards, hint for cloze notes.
    pub field2: &'a str,
    /// Text shown in the readable part of the uid.
    pub label: &'a str,
}

/// Row id with surrounding whitespace removed, or `None` when blank.
pub fn normalize_row_id(row_id: Option<&str>) -> Option<&str> {
    row_id.map(str::trim).filter(|id| !id.is_empty())
}

/// Canonical string hashed into the uid digest.
///
/// An explicit row id wins over the content, so rows with ids keep their
/// identity while their text is edited.
pub fn canonical_seed(
    group: &str,
    kind: &str,
    row_id: Option<&str>,
    field1: &str,
    field2: &str,
) -> String {
    match normalize_row_id(row_id) {
        Some(id) => [group.trim(), kind.trim(), &format!("id={id}")].join(SEED_SEPARATOR),
        None => [group.trim(), kind.trim(), field1.trim(), field2.trim()].join(SEED_SEPARATOR),
    }
}

/// Short lowercase hex SHA-256 digest of `seed`.
pub fn content_digest(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(DIGEST_HEX_LEN);
    hex
}

/// Row id as it appears inside a uid: no whitespace, no `:`.
fn uid_row_id(row_id: &str) -> String {
    row_id
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(':', "-")
}

/// Stable, tag-safe uid for one card or note.
pub fn derive_uid(source: UidSource<'_>) -> String {
    let row_id = normalize_row_id(source.row_id);
    let seed = canonical_seed(source.group, source.kind, row_id, source.field1, source.field2);

    let mut segments = vec![
        UID_NAMESPACE.to_string(),
        slugify(source.group, SLUG_MAX_LEN),
        slugify(source.label, SLUG_MAX_LEN),
    ];
    if let Some(id) = row_id {
        segments.push(format!("id={}", uid_row_id(id)));
    }
    segments.push(format!("h={}", content_digest(&seed)));

    segments.join(":")
}

/// Anki note guid derived from a uid. Deterministic, 12 URL-safe characters.
pub fn note_guid(uid: &str) -> String {
    let digest = Sha256::digest(uid.as_bytes());
    URL_SAFE_NO_PAD.encode(&digest[..GUID_BYTES])
}

/// Whether `value` looks like a uid produced by [`derive_uid`].
pub fn is_uid(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(UID_NAMESPACE).and_then(|r| r.strip_prefix(':')) else {
        return false;
    };
    !value.contains(char::is_whitespace)
        && rest
            .rsplit(':')
            .next()
            .and_then(|last| last.strip_prefix("h="))
            .is_some_and(|hex| hex.len() == DIGEST_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source<'a>(row_id: Option<&'a str>, front: &'a str, back: &'a str) -> UidSource<'a> {
        UidSource {
            group: "Animals::food",
            kind: "recognition",
            row_id,
            field1: front,
            field2: back,
            label: front,
        }
    }

    #[test]
    fn uid_is_deterministic() {
        let a = derive_uid(source(None, "hola", "hello"));
        let b = derive_uid(source(None, "hola", "hello"));
        assert_eq!(a, b);
        assert!(a.starts_with("vocadeck:animals-food:hola:h="));
        assert!(is_uid(&a));
    }

    #[test]
    fn content_change_changes_uid_without_row_id() {
        let a = derive_uid(source(None, "hola", "hello"));
        let b = derive_uid(source(None, "hola", "hi"));
        assert_ne!(a, b);
    }

    #[test]
    fn row_id_pins_identity_across_content_edits() {
        let a = derive_uid(source(Some("42"), "hola", "hello"));
        let b = derive_uid(source(Some("42"), "hola", "hi"));
        let c = derive_uid(source(Some("43"), "hola", "hello"));
        // The readable part follows the front, the digest follows the id.
        assert_eq!(a.rsplit(':').next(), b.rsplit(':').next());
        assert_ne!(a, c);
        assert!(a.contains(":id=42:"));
    }

    #[test]
    fn blank_row_id_falls_back_to_content() {
        let blank = derive_uid(source(Some("   "), "hola", "hello"));
        let none = derive_uid(source(None, "hola", "hello"));
        assert_eq!(blank, none);
    }

    #[test]
    fn kind_is_part_of_the_seed() {
        let recognition = canonical_seed("g", "recognition", None, "a", "b");
        let production = canonical_seed("g", "production", None, "a", "b");
        assert_eq!(recognition, "g||recognition||a||b");
        assert_ne!(content_digest(&recognition), content_digest(&production));
    }

    #[test]
    fn seed_components_are_trimmed() {
        assert_eq!(
            canonical_seed(" g ", "cloze", Some(" 7 "), "x", "y"),
            "g||cloze||id=7"
        );
    }

    #[test]
    fn row_ids_are_made_tag_safe() {
        let uid = derive_uid(source(Some("lesson 3:12"), "hola", "hello"));
        assert!(uid.contains(":id=lesson_3-12:"));
        assert!(!uid.contains(' '));
    }

    #[test]
    fn guid_is_derived_from_uid() {
        let uid = derive_uid(source(None, "hola", "hello"));
        let guid = note_guid(&uid);
        assert_eq!(guid, note_guid(&uid));
        assert_eq!(guid.len(), 12);
        assert_ne!(guid, note_guid("vocadeck:other:h=000000000000"));
        assert!(guid.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn is_uid_rejects_foreign_values() {
        assert!(!is_uid("hola"));
        assert!(!is_uid("vocadeck:x:h=zz"));
        assert!(!is_uid("other:x:h=0123456789ab"));
    }
}
