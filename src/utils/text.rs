use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Hierarchy separator used in deck paths.
pub const DECK_SEPARATOR: &str = "::";

/// Stand-in for [`DECK_SEPARATOR`] anywhere a flat name is required.
pub const FLAT_SEPARATOR: &str = "__";

/// Placeholder for text that slugifies to nothing (punctuation only, etc).
const EMPTY_SLUG: &str = "none";

/// Lowercase, accent-stripped, hyphenated rendering of `text`, at most
/// `max_len` characters long.
///
/// Runs of anything that is not alphanumeric collapse into a single `-`, and
/// the result never starts or ends with one.
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for ch in text.nfkd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    let mut capped: String = slug.chars().take(max_len).collect();
    while capped.ends_with('-') {
        capped.pop();
    }

    if capped.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        capped
    }
}

/// Replace whitespace with `_` so the value survives as a single Anki tag.
pub fn tag_safe(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Tag naming the deck a card was filed under.
///
/// Anki reads `::` inside a tag as tag hierarchy, so the deck separator is
/// flattened here. Deck paths themselves keep it.
pub fn deck_tag(deck_path: &str) -> String {
    format!("deck:{}", tag_safe(&deck_path.replace(DECK_SEPARATOR, FLAT_SEPARATOR)))
}

fn html_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("static HTML tag pattern is valid"))
}

/// Drop HTML tags and decode the handful of entities Anki itself inserts.
pub fn strip_html(value: &str) -> String {
    html_tag_regex()
        .replace_all(value, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}
