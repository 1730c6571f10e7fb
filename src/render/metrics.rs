//! Standard-14 Helvetica metrics and WinAnsi encoding.

use crate::normalize::strip_accents;

/// Advance widths of ASCII 0x20..=0x7E, in 1/1000 em (Adobe AFM).
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// WinAnsi code points that differ from Latin-1 (0x80..=0x9F).
const WIN_ANSI_EXTRA: &[(char, u8)] = &[
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// ASCII base letter of an accented letter: `ő` gives `o`, `ł` gives `l`.
fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'ł' => 'l',
        'Ł' => 'L',
        'đ' => 'd',
        'Đ' => 'D',
        'ı' => 'i',
        _ => strip_accents(&c.to_string()).chars().next()?,
    };
    Some(base).filter(|b| (' '..='~').contains(b))
}

/// Encode text for a WinAnsi simple font. Letters outside the encoding fall
/// back to their base letter; anything else becomes `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{A0}'..='\u{FF}' => c as u32 as u8,
            _ => WIN_ANSI_EXTRA
                .iter()
                .find(|(extra, _)| *extra == c)
                .map(|(_, code)| *code)
                .or_else(|| base_letter(c).map(|b| b as u8))
                .unwrap_or(b'?'),
        })
        .collect()
}

fn char_width(c: char, bold: bool) -> u16 {
    let table = if bold { &HELVETICA_BOLD } else { &HELVETICA };
    match c {
        ' '..='~' => table[(c as usize) - 0x20],
        '—' | '…' | '‰' => 1000,
        '–' => 556,
        '•' => 350,
        '‘' | '’' | '‚' => {
            if bold {
                278
            } else {
                222
            }
        }
        'œ' | 'Œ' | 'æ' | 'Æ' => 944,
        '\u{A0}' => 278,
        _ => base_letter(c).map_or(556, |base| table[(base as usize) - 0x20]),
    }
}

/// Width of `text` in points at the given font size.
pub fn text_width(text: &str, size: f32, bold: bool) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, bold))).sum();
    units as f32 * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("Évalué"), vec![0xC9, b'v', b'a', b'l', b'u', 0xE9]);
        assert_eq!(win_ansi("d’ancrage — ok"), b"d\x92ancrage \x97 ok".to_vec());
        assert_eq!(win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_win_ansi_falls_back_to_base_letter() {
        assert_eq!(win_ansi("Łukasz Dvořák"), b"Lukasz Dvor\xE1k".to_vec());
        assert_eq!(win_ansi("Erdős"), b"Erdos".to_vec());
        assert_eq!(text_width("ł", 10.0, false), text_width("l", 10.0, false));
    }

    #[test]
    fn test_text_width() {
        assert!((text_width("A", 10.0, false) - 6.67).abs() < 0.01);
        assert!(text_width("Fait", 10.0, true) > text_width("Fait", 10.0, false));
        assert_eq!(text_width("é", 10.0, false), text_width("e", 10.0, false));
        assert_eq!(text_width("", 12.0, false), 0.0);
    }
}
