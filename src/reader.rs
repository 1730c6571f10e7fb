use crate::dates::{from_excel_serial, is_date_format};
use crate::error::{Error, Result};
use clap::ValueEnum;
use csv::ReaderBuilder;
use ssfmt::{FormatOptions, NumberFormat};
use std::path::Path;
use umya_spreadsheet::structs::Worksheet;
use umya_spreadsheet::Spreadsheet;

/// Worksheet contents as display strings: header row plus data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    /// Data rows, each padded to `headers.len()`.
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw rows, the first being the header row.
    ///
    /// Blank headers are named `colonne_N`, trailing blank header cells are
    /// dropped, and rows without any value are skipped.
    pub fn from_rows(mut raw: Vec<Vec<String>>) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let mut header_row = raw.remove(0);
        while header_row.last().is_some_and(|h| h.trim().is_empty()) {
            header_row.pop();
        }
        if header_row.is_empty() {
            return None;
        }

        let headers: Vec<String> = header_row
            .into_iter()
            .enumerate()
            .map(|(i, h)| {
                let h = h.trim();
                if h.is_empty() {
                    format!("colonne_{}", i + 1)
                } else {
                    h.to_string()
                }
            })
            .collect();

        let width = headers.len();
        let rows = raw
            .into_iter()
            .filter(|row| row.iter().take(width).any(|v| !v.trim().is_empty()))
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Some(Self { headers, rows })
    }
}

/// Field separator for CSV input.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub fn byte(&self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Semicolon => b';',
            Delimiter::Tab => b'\t',
        }
    }
}

/// Sheet selection by name or 0-based index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

pub fn parse_sheet_selector(selector: &str) -> SheetSelector {
    match selector.trim().parse::<usize>() {
        Ok(index) => SheetSelector::Index(index),
        Err(_) => SheetSelector::Name(selector.to_string()),
    }
}

pub struct ReadOptions {
    pub sheet: Option<String>,
    pub delimiter: Delimiter,
}

/// Read one worksheet (or a CSV file) into a [`Table`].
pub fn open_table(path: &Path, options: &ReadOptions) -> Result<Table> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let raw = match extension.as_str() {
        "xlsx" | "xlsm" => {
            let workbook = open_xlsx(path)?;
            sheet_rows(&workbook, options.sheet.as_deref())?
        }
        "xls" => {
            let workbook = open_xls(path)?;
            sheet_rows(&workbook, options.sheet.as_deref())?
        }
        "csv" => csv_rows(path, options.delimiter)?,
        _ => return Err(Error::UnsupportedFormat(extension)),
    };

    let table = Table::from_rows(raw).ok_or_else(|| Error::UnreadableInput {
        path: path.to_path_buf(),
        details: "no header row".to_string(),
    })?;

    tracing::info!(
        columns = table.headers.len(),
        rows = table.rows.len(),
        "loaded {}",
        path.display()
    );
    Ok(table)
}

fn open_xlsx(path: &Path) -> Result<Spreadsheet> {
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| Error::UnreadableInput {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

fn open_xls(path: &Path) -> Result<Spreadsheet> {
    xlrd::open(path).map_err(|e| Error::UnreadableInput {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

pub fn get_sheet_names(workbook: &Spreadsheet) -> Vec<String> {
    workbook
        .get_sheet_collection()
        .iter()
        .map(|sheet| sheet.get_name().to_string())
        .collect()
}

fn resolve_sheet_index(selector: &SheetSelector, sheet_names: &[String]) -> Result<usize> {
    match selector {
        SheetSelector::Index(idx) => {
            if *idx < sheet_names.len() {
                Ok(*idx)
            } else {
                Err(Error::SheetIndexOutOfRange {
                    index: *idx,
                    count: sheet_names.len(),
                })
            }
        }
        SheetSelector::Name(name) => sheet_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| Error::SheetNotFound {
                name: name.clone(),
                available: sheet_names.join(", "),
            }),
    }
}

fn sheet_rows(workbook: &Spreadsheet, selector: Option<&str>) -> Result<Vec<Vec<String>>> {
    let sheet_names = get_sheet_names(workbook);
    tracing::debug!(sheets = %sheet_names.join(", "), "workbook opened");

    let index = match selector {
        Some(selector) => resolve_sheet_index(&parse_sheet_selector(selector), &sheet_names)?,
        None => 0,
    };
    let sheet = workbook
        .get_sheet(&index)
        .ok_or(Error::SheetIndexOutOfRange {
            index,
            count: sheet_names.len(),
        })?;

    let (max_col, max_row) = sheet.get_highest_column_and_row();
    tracing::debug!(
        sheet = %sheet.get_name(),
        rows = max_row,
        columns = max_col,
        "reading sheet"
    );

    let opts = FormatOptions::default();
    let rows = (1..=max_row)
        .map(|row| {
            (1..=max_col)
                .map(|col| get_cell_formatted_value(sheet, col, row, &opts))
                .collect()
        })
        .collect();
    Ok(rows)
}

/// Get a cell's display value using its Excel number format.
///
/// Date-formatted serial numbers come out as ISO dates so that day/month
/// order never depends on the author's locale.
fn get_cell_formatted_value(sheet: &Worksheet, col: u32, row: u32, opts: &FormatOptions) -> String {
    let Some(cell) = sheet.get_cell((col, row)) else {
        return String::new();
    };

    let raw_value = cell.get_value();
    if raw_value.is_empty() {
        return String::new();
    }

    let format_code = cell
        .get_style()
        .get_number_format()
        .map(|nf| nf.get_format_code())
        .unwrap_or("General");

    let number = raw_value.parse::<f64>().ok();
    if let Some(date) = number
        .filter(|_| is_date_format(format_code))
        .and_then(from_excel_serial)
    {
        return date.format("%Y-%m-%d").to_string();
    }

    let fmt = match NumberFormat::parse(format_code) {
        Ok(f) => f,
        Err(_) => return raw_value.to_string(),
    };

    match number {
        Some(num) => fmt.format(num, opts),
        None => fmt.format_text(&raw_value, opts),
    }
}

fn csv_rows(path: &Path, delimiter: Delimiter) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter.byte())
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    if let Some(first) = rows.first_mut().and_then(|row| row.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{FEFF}') {
            *first = stripped.to_string();
        }
    }
    Ok(rows)
}
