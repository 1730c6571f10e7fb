//! Report assembly: records in, ordered content blocks out.
//!
//! One unit is emitted per trainee, or per trainee and evaluation date when
//! splitting by date. Each unit is a fixed sequence of header fields and
//! sections, and ends with a page break. Empty values and empty sections
//! are left out.

use crate::dates::{format_date, parse_date};
use crate::normalize::{column_label, display_text, group_key};
use crate::records::Record;
use crate::roles::{Role, RoleMap};
use crate::status::{classify, Classified};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Shown in header fields that have no value.
pub const PLACEHOLDER: &str = "—";

const ITEM_SECTIONS: [(Role, &str); 2] = [
    (Role::ItemNotSubmitted, "APP non soumis à évaluation"),
    (Role::ItemEvaluated, "APP évalués"),
];

const PROSE_SECTIONS: [(Role, &str); 3] = [
    (Role::ProgressAxis, "Axes de progression"),
    (Role::AnchorPoint, "Points d’ancrage"),
    (Role::ProposedItem, "APP qui pourraient être proposés"),
];

/// A unit of laid-out content, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Title(String),
    /// Header line such as "Stagiaire : Alice".
    Field { label: String, value: String },
    Section(String),
    /// Evaluation item with its (possibly colored) mark.
    Item { label: String, value: Classified },
    /// Free-text paragraph.
    Text(String),
    PageBreak,
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub title: String,
    pub split_by_date: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Fiche d’évaluation".to_string(),
            split_by_date: false,
        }
    }
}

/// Dated records sort before undated ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum DateKey {
    Dated(NaiveDate),
    Undated,
}

fn date_key(record: &Record) -> DateKey {
    record
        .date
        .as_deref()
        .and_then(parse_date)
        .map_or(DateKey::Undated, DateKey::Dated)
}

/// Records that share one report page.
struct Unit<'a> {
    trainee: String,
    records: Vec<&'a Record>,
}

impl Unit<'_> {
    /// First non-blank value of a column, in date then row order.
    fn value(&self, column: usize) -> Option<&str> {
        self.records.iter().find_map(|r| r.value(column))
    }

    fn date_label(&self) -> String {
        let labels = self.records.iter().filter_map(|r| {
            let raw = r.date.as_deref()?;
            Some(parse_date(raw).map_or_else(|| display_text(raw), format_date))
        });
        distinct_or_placeholder(labels)
    }

    fn evaluator_label(&self) -> String {
        distinct_or_placeholder(self.records.iter().filter_map(|r| r.evaluator.clone()))
    }
}

fn distinct_or_placeholder(values: impl Iterator<Item = String>) -> String {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.contains(&value) {
            seen.push(value);
        }
    }
    if seen.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        seen.join(", ")
    }
}

/// The spelling of a trainee's name used on their reports: the most
/// frequent one in the group, ties going to the smallest string. Row order
/// never matters.
fn display_name(group: &[&Record]) -> String {
    let mut spellings: BTreeMap<String, usize> = BTreeMap::new();
    for record in group {
        *spellings.entry(display_text(&record.trainee)).or_default() += 1;
    }
    spellings
        .into_iter()
        .max_by(|(a, a_count), (b, b_count)| a_count.cmp(b_count).then_with(|| b.cmp(a)))
        .map(|(name, _)| name)
        .unwrap_or_default()
}

/// Group records by trainee (and date), in report order.
fn units<'a>(records: &'a [Record], split_by_date: bool) -> Vec<Unit<'a>> {
    let mut groups: BTreeMap<String, Vec<&'a Record>> = BTreeMap::new();
    for record in records {
        groups
            .entry(group_key(&record.trainee))
            .or_default()
            .push(record);
    }

    let mut units = Vec::new();
    for mut group in groups.into_values() {
        let trainee = display_name(&group);
        group.sort_by_key(|r| (date_key(r), r.row));

        if !split_by_date {
            units.push(Unit {
                trainee,
                records: group,
            });
            continue;
        }

        let mut by_date: BTreeMap<DateKey, Vec<&'a Record>> = BTreeMap::new();
        for record in group {
            by_date.entry(date_key(record)).or_default().push(record);
        }
        units.extend(by_date.into_values().map(|records| Unit {
            trainee: trainee.clone(),
            records,
        }));
    }
    units
}

/// Build the content blocks of the whole report.
pub fn assemble(records: &[Record], roles: &RoleMap, options: &ReportOptions) -> Vec<Block> {
    let units = units(records, options.split_by_date);
    tracing::info!(units = units.len(), "assembling report");

    let mut blocks = Vec::new();
    for unit in &units {
        tracing::trace!(
            trainee = %unit.trainee,
            records = unit.records.len(),
            "emitting unit"
        );

        blocks.push(Block::Title(options.title.clone()));
        blocks.push(Block::Field {
            label: "Stagiaire".to_string(),
            value: unit.trainee.clone(),
        });
        blocks.push(Block::Field {
            label: "Date".to_string(),
            value: unit.date_label(),
        });
        blocks.push(Block::Field {
            label: "Formateur".to_string(),
            value: unit.evaluator_label(),
        });

        for (role, heading) in ITEM_SECTIONS {
            let items: Vec<Block> = roles
                .columns(role)
                .filter_map(|column| {
                    let value = classify(unit.value(column.index)?);
                    Some(Block::Item {
                        label: column_label(&column.header),
                        value,
                    })
                })
                .collect();
            push_section(&mut blocks, heading, items);
        }

        for (role, heading) in PROSE_SECTIONS {
            let paragraphs: Vec<Block> = roles
                .columns(role)
                .filter_map(|column| unit.value(column.index))
                .map(display_text)
                .filter(|text| !text.is_empty())
                .map(Block::Text)
                .collect();
            push_section(&mut blocks, heading, paragraphs);
        }

        blocks.push(Block::PageBreak);
    }
    blocks
}

fn push_section(blocks: &mut Vec<Block>, heading: &str, content: Vec<Block>) {
    if content.is_empty() {
        return;
    }
    blocks.push(Block::Section(heading.to_string()));
    blocks.extend(content);
}
