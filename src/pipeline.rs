use crate::assemble::{assemble, Block, ReportOptions};
use crate::error::Result;
use crate::reader::Table;
use crate::records::extract_records;
use crate::roles::detect_roles;

/// Detect column roles, extract records and assemble the report blocks.
///
/// Fails before producing anything when no trainee column exists.
pub fn build_blocks(table: &Table, options: &ReportOptions) -> Result<Vec<Block>> {
    let roles = detect_roles(&table.headers)?;
    let records = extract_records(table, &roles);
    Ok(assemble(&records, &roles, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::render::palette::{status_color, value_color};
    use crate::render::{PdfOptions, PdfRenderer, Renderer};
    use crate::status::StatusCode;
    use proptest::prelude::*;

    fn sample_table() -> Table {
        let headers = [
            "Stagiaire évalué",
            "Date d'évaluation",
            "Formateur",
            "APP évalués / Accueil client",
            "APP évalués / Encaissement",
            "Axes de progression",
        ];
        let rows: &[&[&str]] = &[
            &["Bob", "2024-02-01", "Paul", "Fait", "NA", ""],
            &["Alice", "2024-01-15", "Paul", "Fait", "NA", "Reformuler"],
            &["Chloé", "", "", "ECA", "", ""],
            &["alice", "2024-03-01", "Marie", "", "A", ""],
            &["Bob", "", "", "en cours", "NE", "Posture"],
        ];
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    fn trainees(blocks: &[Block]) -> Vec<String> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Field { label, value } if label == "Stagiaire" => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_missing_identity_column_aborts() {
        let table = Table {
            headers: vec!["Date".to_string(), "APP évalués / Accueil".to_string()],
            rows: vec![vec!["2024-01-15".to_string(), "Fait".to_string()]],
        };
        let err = build_blocks(&table, &ReportOptions::default()).unwrap_err();
        assert!(matches!(err, Error::MissingIdentityColumn { .. }));
    }

    #[test]
    fn test_building_twice_is_identical() {
        let table = sample_table();
        for split_by_date in [false, true] {
            let options = ReportOptions {
                split_by_date,
                ..ReportOptions::default()
            };
            let first = build_blocks(&table, &options).unwrap();
            let second = build_blocks(&table, &options).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_html_output_is_byte_identical() {
        use crate::render::HtmlRenderer;

        let blocks = build_blocks(&sample_table(), &ReportOptions::default()).unwrap();
        let render = || {
            let mut out = Vec::new();
            HtmlRenderer::new("Fiches", None)
                .render(&blocks, &mut out)
                .unwrap();
            out
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_trainee_groups_are_sorted() {
        let blocks = build_blocks(&sample_table(), &ReportOptions::default()).unwrap();
        assert_eq!(trainees(&blocks), vec!["Alice", "Bob", "Chloé"]);

        let split = ReportOptions {
            split_by_date: true,
            ..ReportOptions::default()
        };
        let blocks = build_blocks(&sample_table(), &split).unwrap();
        assert_eq!(
            trainees(&blocks),
            vec!["Alice", "Alice", "Bob", "Bob", "Chloé"]
        );
    }

    #[test]
    fn test_alice_and_bob_end_to_end() {
        let table = Table {
            headers: vec![
                "stagiaire".to_string(),
                "app_evalues/accueil".to_string(),
                "app_evalues/vente".to_string(),
            ],
            rows: vec![
                vec!["Bob".to_string(), "NA".to_string(), "Fait".to_string()],
                vec!["Alice".to_string(), "Fait".to_string(), "NA".to_string()],
            ],
        };
        let blocks = build_blocks(&table, &ReportOptions::default()).unwrap();
        assert_eq!(trainees(&blocks), vec!["Alice", "Bob"]);

        let green = status_color(StatusCode::Done);
        let red = status_color(StatusCode::NotAcquired);
        let items: Vec<(&str, &str, _)> = blocks
            .iter()
            .filter_map(|b| match b {
                Block::Item { label, value } => Some((
                    label.as_str(),
                    value.text.as_str(),
                    value_color(value.status),
                )),
                _ => None,
            })
            .collect();
        assert_eq!(
            items,
            vec![
                ("Accueil", "Fait", green),
                ("Vente", "NA", red),
                ("Accueil", "NA", red),
                ("Vente", "Fait", green),
            ]
        );

        // Every section heading is followed by content.
        for pair in blocks.windows(2) {
            if let Block::Section(_) = pair[0] {
                assert!(matches!(pair[1], Block::Item { .. } | Block::Text(_)));
            }
        }

        let mut pdf = Vec::new();
        PdfRenderer::new(PdfOptions::default())
            .render(&blocks, &mut pdf)
            .unwrap();
        let doc = lopdf::Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    proptest! {
        #[test]
        fn prop_row_order_does_not_change_groups(
            rows in Just(sample_table().rows).prop_shuffle()
        ) {
            let reference = build_blocks(&sample_table(), &ReportOptions::default()).unwrap();
            let shuffled = Table {
                headers: sample_table().headers,
                rows,
            };
            let blocks = build_blocks(&shuffled, &ReportOptions::default()).unwrap();

            prop_assert_eq!(trainees(&blocks), trainees(&reference));
        }
    }
}
