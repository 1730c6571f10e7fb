//! Column role detection.
//!
//! Headers are written by hand, so roles are recognised from keywords in
//! the normalized header rather than from exact names. Rules are tried in
//! order and the first match wins: combined item rules come before the
//! single-keyword ones, so `app_non_soumis` never lands in the broader
//! `app_evalues` bucket.

use crate::error::{Error, Result};
use crate::normalize::column_key;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    TraineeId,
    Date,
    EvaluatorFirst,
    EvaluatorLast,
    ItemNotSubmitted,
    ItemEvaluated,
    ProgressAxis,
    AnchorPoint,
    ProposedItem,
    Unclassified,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::TraineeId => "trainee",
            Role::Date => "date",
            Role::EvaluatorFirst => "evaluator first name",
            Role::EvaluatorLast => "evaluator name",
            Role::ItemNotSubmitted => "items not submitted",
            Role::ItemEvaluated => "evaluated items",
            Role::ProgressAxis => "progress axes",
            Role::AnchorPoint => "anchor points",
            Role::ProposedItem => "proposed items",
            Role::Unclassified => "unclassified",
        };
        f.write_str(name)
    }
}

/// One way for a header to mention a keyword.
#[derive(Debug, Clone, Copy)]
enum Keyword {
    /// A whole token equals the keyword.
    Token(&'static str),
    /// Some token starts with the keyword.
    Prefix(&'static str),
    /// The keyword appears anywhere in the key.
    Contains(&'static str),
    /// The keyword appears in the group part of the key, before the first
    /// `/`. The part after it is a free item label.
    InGroup(&'static str),
}

impl Keyword {
    fn matches(self, key: &str, tokens: &[&str]) -> bool {
        match self {
            Keyword::Token(word) => tokens.iter().any(|t| *t == word),
            Keyword::Prefix(word) => tokens.iter().any(|t| t.starts_with(word)),
            Keyword::Contains(word) => key.contains(word),
            Keyword::InGroup(word) => key
                .split_once('/')
                .map_or(key, |(group, _)| group)
                .contains(word),
        }
    }
}

/// A role and the keyword groups a header must satisfy: every group must
/// have at least one matching keyword.
struct Rule {
    role: Role,
    all_of: &'static [&'static [Keyword]],
}

impl Rule {
    fn matches(&self, key: &str, tokens: &[&str]) -> bool {
        self.all_of
            .iter()
            .all(|any_of| any_of.iter().any(|kw| kw.matches(key, tokens)))
    }
}

const ITEM: &[Keyword] = &[
    Keyword::Token("app"),
    Keyword::Token("apps"),
    Keyword::Prefix("item"),
];

const RULES: &[Rule] = &[
    Rule {
        role: Role::ItemNotSubmitted,
        all_of: &[
            ITEM,
            &[
                Keyword::InGroup("non_soumis"),
                Keyword::InGroup("non_evalu"),
                Keyword::InGroup("not_submitted"),
                Keyword::InGroup("not_evaluated"),
            ],
        ],
    },
    Rule {
        role: Role::ProposedItem,
        all_of: &[
            ITEM,
            &[
                Keyword::InGroup("pourrai"),
                Keyword::InGroup("propos"),
                Keyword::InGroup("suggest"),
            ],
        ],
    },
    Rule {
        role: Role::ItemEvaluated,
        all_of: &[ITEM, &[Keyword::InGroup("evalu")]],
    },
    Rule {
        role: Role::TraineeId,
        all_of: &[&[
            Keyword::Contains("stagiaire"),
            Keyword::Contains("participant"),
            Keyword::Contains("apprenant"),
            Keyword::Contains("trainee"),
            Keyword::Contains("learner"),
        ]],
    },
    Rule {
        role: Role::Date,
        all_of: &[&[Keyword::Prefix("date")]],
    },
    Rule {
        role: Role::EvaluatorFirst,
        all_of: &[&[
            Keyword::Prefix("prenom"),
            Keyword::Token("first"),
            Keyword::Token("firstname"),
        ]],
    },
    Rule {
        role: Role::EvaluatorLast,
        all_of: &[&[
            Keyword::Contains("formateur"),
            Keyword::Contains("evaluateur"),
            Keyword::Contains("tuteur"),
            Keyword::Contains("trainer"),
            Keyword::Contains("evaluator"),
            Keyword::Token("nom"),
            Keyword::Token("last"),
            Keyword::Token("lastname"),
            Keyword::Token("surname"),
        ]],
    },
    Rule {
        role: Role::ProgressAxis,
        all_of: &[&[
            Keyword::Prefix("axe"),
            Keyword::Prefix("axis"),
            Keyword::Contains("progression"),
        ]],
    },
    Rule {
        role: Role::AnchorPoint,
        all_of: &[&[Keyword::Contains("ancrage"), Keyword::Contains("anchor")]],
    },
];

fn tokens(key: &str) -> Vec<&str> {
    key.split(|c: char| matches!(c, '_' | '/' | '(' | ')' | '\'' | '.' | '-'))
        .filter(|t| !t.is_empty())
        .collect()
}

/// Role of a single header, from its raw text.
pub fn classify_column(header: &str) -> Role {
    let key = column_key(header);
    let tokens = tokens(&key);
    RULES
        .iter()
        .find(|rule| rule.matches(&key, &tokens))
        .map_or(Role::Unclassified, |rule| rule.role)
}

/// A header with its detected role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub header: String,
    pub key: String,
    pub role: Role,
}

/// Roles of every column of a sheet, in sheet order.
#[derive(Debug, Clone)]
pub struct RoleMap {
    columns: Vec<Column>,
}

impl RoleMap {
    pub fn columns(&self, role: Role) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(move |c| c.role == role)
    }

    pub fn role_of(&self, header: &str) -> Option<Role> {
        self.columns
            .iter()
            .find(|c| c.header == header)
            .map(|c| c.role)
    }

    pub fn all(&self) -> &[Column] {
        &self.columns
    }

    pub fn has(&self, role: Role) -> bool {
        self.columns(role).next().is_some()
    }
}

/// Detect the role of every header.
///
/// Fails with [`Error::MissingIdentityColumn`] when no header names the
/// trainee, since records cannot be grouped without it.
pub fn detect_roles<S: AsRef<str>>(headers: &[S]) -> Result<RoleMap> {
    let columns: Vec<Column> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let header = header.as_ref();
            Column {
                index,
                header: header.to_string(),
                key: column_key(header),
                role: classify_column(header),
            }
        })
        .collect();

    let map = RoleMap { columns };
    if !map.has(Role::TraineeId) {
        return Err(Error::MissingIdentityColumn {
            columns: headers
                .iter()
                .map(|h| h.as_ref())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }

    for column in map.all() {
        tracing::debug!(column = %column.header, role = %column.role, "detected column role");
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_columns() {
        let headers = [
            "stagiaire_evalue",
            "date_evaluation",
            "app_evalues/item1",
            "app_non_soumis/item2",
            "axes_de_progression",
        ];
        let map = detect_roles(&headers).unwrap();
        let roles: Vec<Role> = map.all().iter().map(|c| c.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::TraineeId,
                Role::Date,
                Role::ItemEvaluated,
                Role::ItemNotSubmitted,
                Role::ProgressAxis,
            ]
        );
    }

    #[test]
    fn test_missing_identity_column() {
        let headers = ["date", "app_evalues/item1", "formateur"];
        let err = detect_roles(&headers).unwrap_err();
        assert!(matches!(err, Error::MissingIdentityColumn { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_human_written_headers() {
        assert_eq!(classify_column("Stagiaire évalué"), Role::TraineeId);
        assert_eq!(classify_column("Date d'évaluation"), Role::Date);
        assert_eq!(classify_column("Formateur"), Role::EvaluatorLast);
        assert_eq!(classify_column("Prénom du formateur"), Role::EvaluatorFirst);
        assert_eq!(classify_column("Nom formateur"), Role::EvaluatorLast);
        assert_eq!(
            classify_column("APP non soumis à évaluation / Accueil"),
            Role::ItemNotSubmitted
        );
        assert_eq!(classify_column("APP évalués / Accueil client"), Role::ItemEvaluated);
        assert_eq!(classify_column("Axes de progression"), Role::ProgressAxis);
        assert_eq!(classify_column("Points d'ancrage"), Role::AnchorPoint);
        assert_eq!(
            classify_column("APP qui pourraient être proposés"),
            Role::ProposedItem
        );
        assert_eq!(classify_column("Commentaire libre"), Role::Unclassified);
    }

    #[test]
    fn test_specific_item_rules_win() {
        assert_eq!(classify_column("APP non évalués / Vente"), Role::ItemNotSubmitted);
        assert_eq!(classify_column("app_non_soumis_evalues"), Role::ItemNotSubmitted);
    }

    #[test]
    fn test_item_label_does_not_pick_the_group() {
        assert_eq!(
            classify_column("APP évalués / Proposer une solution adaptée"),
            Role::ItemEvaluated
        );
        assert_eq!(
            classify_column("APP évalués / Suggestion de vente"),
            Role::ItemEvaluated
        );
        assert_eq!(
            classify_column("APP non soumis / Évaluer un besoin"),
            Role::ItemNotSubmitted
        );
        assert_eq!(
            classify_column("APP qui pourraient être proposés / Évaluation"),
            Role::ProposedItem
        );
    }

    #[test]
    fn test_trainee_columns_are_not_evaluator_parts() {
        assert_eq!(classify_column("Prénom stagiaire"), Role::TraineeId);
        assert_eq!(classify_column("Nom du stagiaire"), Role::TraineeId);
    }

    #[test]
    fn test_learner_is_not_an_item() {
        assert_eq!(classify_column("Apprenant évalué"), Role::TraineeId);
        assert_eq!(classify_column("Taxe"), Role::Unclassified);
    }

    #[test]
    fn test_english_headers() {
        assert_eq!(classify_column("Trainee"), Role::TraineeId);
        assert_eq!(classify_column("Evaluation date"), Role::Date);
        assert_eq!(classify_column("Items not evaluated / Safety"), Role::ItemNotSubmitted);
        assert_eq!(classify_column("Items evaluated / Safety"), Role::ItemEvaluated);
        assert_eq!(classify_column("Anchor points"), Role::AnchorPoint);
    }

    #[test]
    fn test_many_columns_share_a_role() {
        let headers = [
            "Stagiaire",
            "APP évalués / Accueil",
            "APP évalués / Vente",
            "APP évalués / Caisse",
        ];
        let map = detect_roles(&headers).unwrap();
        let evaluated: Vec<usize> = map.columns(Role::ItemEvaluated).map(|c| c.index).collect();
        assert_eq!(evaluated, vec![1, 2, 3]);
        assert_eq!(map.role_of("Stagiaire"), Some(Role::TraineeId));
    }
}
