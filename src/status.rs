//! Evaluation marks and their canonical status codes.

use crate::normalize::{display_text, strip_accents};
use std::fmt;

/// Canonical outcome of an evaluated item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatusCode {
    Done,
    Acquired,
    InProgress,
    AcquisitionInProgress,
    NotEvaluated,
    NotAcquired,
}

/// Matching keys in lookup order. Every comparison is exact equality.
const VOCABULARY: &[(&str, StatusCode)] = &[
    ("FAIT", StatusCode::Done),
    ("A", StatusCode::Acquired),
    ("ENCOURS", StatusCode::InProgress),
    ("ECA", StatusCode::AcquisitionInProgress),
    ("NE", StatusCode::NotEvaluated),
    ("NA", StatusCode::NotAcquired),
];

impl StatusCode {
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Done,
        StatusCode::Acquired,
        StatusCode::InProgress,
        StatusCode::AcquisitionInProgress,
        StatusCode::NotEvaluated,
        StatusCode::NotAcquired,
    ];

    /// The mark as written on the evaluation grid.
    pub fn mark(self) -> &'static str {
        match self {
            StatusCode::Done => "FAIT",
            StatusCode::Acquired => "A",
            StatusCode::InProgress => "EN COURS",
            StatusCode::AcquisitionInProgress => "ECA",
            StatusCode::NotEvaluated => "NE",
            StatusCode::NotAcquired => "NA",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StatusCode::Done => "fait",
            StatusCode::Acquired => "acquis",
            StatusCode::InProgress => "en cours",
            StatusCode::AcquisitionInProgress => "en cours d'acquisition",
            StatusCode::NotEvaluated => "non évalué",
            StatusCode::NotAcquired => "non acquis",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mark())
    }
}

/// A cell value after classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub status: Option<StatusCode>,
    pub text: String,
}

impl Classified {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Classify a raw evaluation cell.
///
/// Blank input yields no status and empty text. Values outside the
/// vocabulary keep their cleaned text and carry no status.
pub fn classify(raw: &str) -> Classified {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Classified {
            status: None,
            text: String::new(),
        };
    }

    let key = match_key(trimmed);
    let status = VOCABULARY
        .iter()
        .find(|(mark, _)| *mark == key)
        .map(|(_, status)| *status);

    Classified {
        status,
        text: display_text(trimmed),
    }
}

fn match_key(value: &str) -> String {
    strip_accents(value)
        .to_uppercase()
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_variants() {
        let cases = [
            ("fait", StatusCode::Done),
            ("Fait.", StatusCode::Done),
            ("FAIT ", StatusCode::Done),
            ("a", StatusCode::Acquired),
            ("A.", StatusCode::Acquired),
            ("En cours", StatusCode::InProgress),
            ("EN  COURS.", StatusCode::InProgress),
            ("encours", StatusCode::InProgress),
            ("E.C.A.", StatusCode::AcquisitionInProgress),
            ("eca", StatusCode::AcquisitionInProgress),
            ("N.E.", StatusCode::NotEvaluated),
            ("ne", StatusCode::NotEvaluated),
            ("N.A", StatusCode::NotAcquired),
            (" NA ", StatusCode::NotAcquired),
        ];
        for (raw, expected) in cases {
            assert_eq!(classify(raw).status, Some(expected), "value {raw:?}");
        }
    }

    #[test]
    fn test_unrecognized_values_stay_plain() {
        let result = classify("Non applicable");
        assert_eq!(result.status, None);
        assert_eq!(result.text, "Non applicable");

        assert_eq!(classify("3/5").status, None);
        assert_eq!(classify("3/5").text, "3/5");
        assert_eq!(classify("Fait partiellement").status, None);
        assert_eq!(classify("NAN").status, None);
    }

    #[test]
    fn test_blank_values() {
        for raw in ["", "   ", "\t\n"] {
            let result = classify(raw);
            assert_eq!(result.status, None);
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_acquired_does_not_collide_with_eca() {
        let a = classify("A");
        let eca = classify("ECA");
        assert_eq!(a.status, Some(StatusCode::Acquired));
        assert_eq!(eca.status, Some(StatusCode::AcquisitionInProgress));
        assert_ne!(a.status, eca.status);
    }

    #[test]
    fn test_text_keeps_the_written_value() {
        assert_eq!(classify("  Fait. ").text, "Fait.");
        assert_eq!(classify("en_cours").status, None);
        assert_eq!(classify("Évalué").text, "Évalué");
    }

    #[test]
    fn test_marks_round_trip_through_classify() {
        for status in StatusCode::ALL {
            assert_eq!(classify(status.mark()).status, Some(status));
        }
    }
}
