use std::{collections::BTreeSet, sync::OnceLock};

use regex::Regex;

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{c(\d+)::").expect("static cloze pattern is valid"))
}

/// Template ordinals for every distinct `{{cN::...}}` marker in `text`,
/// ascending. Marker `c1` is ordinal 0; `c0` and unparseable indices are
/// ignored.
pub fn cloze_ordinals(text: &str) -> Vec<u32> {
    marker_regex()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .filter(|index| *index >= 1)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|index| index - 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_each_index_once_in_order() {
        let text = "Yo {{c2::compré}} pan y {{c1::fui}}, {{c2::otra vez}}.";
        assert_eq!(cloze_ordinals(text), [0, 1]);
    }

    #[test]
    fn no_markers_means_no_cards() {
        assert!(cloze_ordinals("Sin marcadores {c1::x} {{ c1::y }}").is_empty());
        assert!(cloze_ordinals("{{c0::cero}}").is_empty());
    }

    #[test]
    fn supports_multi_digit_indices() {
        assert_eq!(cloze_ordinals("{{c10::a}} {{c3::b::hint}}"), [2, 9]);
    }
}
