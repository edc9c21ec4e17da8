//! The two note types a package can carry. Exactly one is used per run.

use serde_json::{json, Value};

/// Anki's numeric note type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteTypeKind {
    Standard = 0,
    Cloze = 1,
}

#[derive(Debug)]
pub struct CardTemplate {
    pub name: &'static str,
    pub front: &'static str,
    pub back: &'static str,
}

#[derive(Debug)]
pub struct NoteType {
    /// Fixed so re-imports map onto the note type already in the profile.
    pub id: i64,
    pub name: &'static str,
    pub kind: NoteTypeKind,
    pub fields: &'static [&'static str],
    /// Index into `fields` Anki sorts and checksums by.
    pub sort_field: usize,
    pub css: &'static str,
    pub templates: &'static [CardTemplate],
}

pub const MODEL_ID_TWO_SIDED: i64 = 1_607_392_319;
pub const MODEL_ID_CLOZE: i64 = 1_607_392_320;

/// Field order for two-sided notes: `Uid, Front, Back, Direction`.
pub static TWO_SIDED: NoteType = NoteType {
    id: MODEL_ID_TWO_SIDED,
    name: "Vocadeck Two-Sided",
    kind: NoteTypeKind::Standard,
    fields: &["Uid", "Front", "Back", "Direction"],
    sort_field: 1,
    css: include_str!("two_sided/style.css"),
    templates: &[CardTemplate {
        name: "Card 1",
        front: include_str!("two_sided/front.html"),
        back: include_str!("two_sided/back.html"),
    }],
};

/// Field order for cloze notes: `Text, Hint, Back`.
pub static CLOZE: NoteType = NoteType {
    id: MODEL_ID_CLOZE,
    name: "Vocadeck Cloze",
    kind: NoteTypeKind::Cloze,
    fields: &["Text", "Hint", "Back"],
    sort_field: 0,
    css: include_str!("cloze/style.css"),
    templates: &[CardTemplate {
        name: "Cloze",
        front: include_str!("cloze/front.html"),
        back: include_str!("cloze/back.html"),
    }],
};

const LATEX_PRE: &str = "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n";
const LATEX_POST: &str = "\\end{document}";

impl NoteType {
    /// Entry for the `col.models` JSON map.
    pub fn to_json(&self, deck_id: i64, modified_secs: i64) -> Value {
        let fields: Vec<Value> = self
            .fields
            .iter()
            .enumerate()
            .map(|(ord, name)| {
                json!({
                    "name": name,
                    "ord": ord,
                    "sticky": false,
                    "rtl": false,
                    "font": "Arial",
                    "size": 20,
                    "media": [],
                })
            })
            .collect();

        let templates: Vec<Value> = self
            .templates
            .iter()
            .enumerate()
            .map(|(ord, template)| {
                json!({
                    "name": template.name,
                    "ord": ord,
                    "qfmt": template.front,
                    "afmt": template.back,
                    "did": null,
                    "bqfmt": "",
                    "bafmt": "",
                })
            })
            .collect();

        // Standard templates need the sort field filled in to produce a card.
        let required: Value = match self.kind {
            NoteTypeKind::Standard => json!([[0, "any", [self.sort_field]]]),
            NoteTypeKind::Cloze => json!([]),
        };

        let kind = self.kind as i64;

        json!({
            "id": self.id,
            "name": self.name,
            "type": kind,
            "mod": modified_secs,
            "usn": -1,
            "sortf": self.sort_field,
            "did": deck_id,
            "tmpls": templates,
            "flds": fields,
            "css": self.css,
            "latexPre": LATEX_PRE,
            "latexPost": LATEX_POST,
            "latexsvg": false,
            "tags": [],
            "vers": [],
            "req": required,
        })
    }
}
