//! Sheet rows seen through the detected column roles.

use crate::normalize::display_text;
use crate::reader::Table;
use crate::roles::{Role, RoleMap};

/// One evaluation row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Position among the sheet's data rows.
    pub row: usize,
    pub trainee: String,
    /// Raw text of the first non-blank date column.
    pub date: Option<String>,
    /// First name(s) then last name(s) of the evaluator.
    pub evaluator: Option<String>,
    /// Cell values, indexed like the sheet headers.
    pub values: Vec<String>,
}

impl Record {
    pub fn value(&self, column: usize) -> Option<&str> {
        self.values
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

fn joined(row: &[String], columns: &[usize]) -> Option<String> {
    let parts: Vec<String> = columns
        .iter()
        .filter_map(|&i| row.get(i))
        .map(|v| display_text(v))
        .filter(|v| !v.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Turn table rows into records. Rows without a trainee are skipped.
pub fn extract_records(table: &Table, roles: &RoleMap) -> Vec<Record> {
    let indices = |role: Role| roles.columns(role).map(|c| c.index).collect::<Vec<_>>();
    let trainee_cols = indices(Role::TraineeId);
    let date_cols = indices(Role::Date);
    let mut evaluator_cols = indices(Role::EvaluatorFirst);
    evaluator_cols.extend(indices(Role::EvaluatorLast));

    let mut records = Vec::with_capacity(table.rows.len());
    for (row, values) in table.rows.iter().enumerate() {
        let Some(trainee) = joined(values, &trainee_cols) else {
            tracing::warn!(row = row + 2, "skipping row without trainee name");
            continue;
        };

        let date = date_cols
            .iter()
            .filter_map(|&i| values.get(i))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string);

        records.push(Record {
            row,
            trainee,
            date,
            evaluator: joined(values, &evaluator_cols),
            values: values.clone(),
        });
    }

    tracing::info!(records = records.len(), "extracted records");
    records
}
