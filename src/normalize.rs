//! Text cleanup for header matching and for display.
//!
//! Matching keys are ASCII-folded so that `Évalué`, `evalue` and `ÉVALUÉ`
//! compare equal. Display text keeps its accents; it only loses the
//! invisible and decorative characters that spreadsheet exports tend to
//! carry along.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Characters kept in a column key besides ASCII letters and digits.
const KEY_PUNCTUATION: &[char] = &['_', '/', '(', ')', '\'', '.', '-'];

/// Decompose and drop combining marks: `"Évalué"` becomes `"Evalue"`.
pub fn strip_accents(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(fold_ligature)
        .collect()
}

fn fold_ligature(c: char) -> Vec<char> {
    match c {
        'œ' => vec!['o', 'e'],
        'Œ' => vec!['O', 'E'],
        'æ' => vec!['a', 'e'],
        'Æ' => vec!['A', 'E'],
        'ß' => vec!['s', 's'],
        other => vec![other],
    }
}

/// Normalize a column header into a matching key.
///
/// Accents are stripped, the text is lowercased, whitespace runs become a
/// single `_` and anything outside `[a-z0-9_/()'.-]` is removed.
pub fn column_key(header: &str) -> String {
    let folded = strip_accents(header).to_lowercase();

    let mut key = String::with_capacity(folded.len());
    let mut in_space = false;
    for c in folded.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                key.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c.is_ascii_lowercase() || c.is_ascii_digit() || KEY_PUNCTUATION.contains(&c) {
            key.push(c);
        }
    }
    key
}

/// Key used to decide whether two trainee names denote the same person.
pub fn group_key(name: &str) -> String {
    strip_accents(name)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Clean a cell value or header for display, keeping accented letters.
pub fn display_text(text: &str) -> String {
    let composed: String = text.nfc().collect();

    let cleaned: String = composed
        .chars()
        .filter_map(|c| {
            if is_separator_glyph(c) || c.is_whitespace() {
                Some(' ')
            } else if c.is_control() || is_invisible(c) {
                None
            } else {
                Some(c)
            }
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Human label for an item column: `"APP évalués / accueil_client"`
/// becomes `"Accueil client"`.
pub fn column_label(header: &str) -> String {
    let label = match header.rsplit_once('/') {
        Some((_, tail)) if !display_text(tail).is_empty() => tail,
        Some((head, _)) => head,
        None => header,
    };
    capitalize(&display_text(label))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn is_separator_glyph(c: char) -> bool {
    matches!(
        c,
        '_' | '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{25A0}' | '\u{25AA}' | '\u{25CF}'
    ) || ('\u{2580}'..='\u{259F}').contains(&c)
}

fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}' | '\u{200B}'..='\u{200F}' | '\u{2060}' | '\u{FEFF}' | '\u{FFFD}'
    )
}
