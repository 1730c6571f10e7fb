//! A4 PDF output built directly with lopdf.
//!
//! Layout is a simple top-down flow: every block becomes one paragraph of
//! styled runs, wrapped on word boundaries and pushed onto the current
//! page until it runs out of room. `PageBreak` closes the page so that two
//! trainees never share one.

use super::metrics::{text_width, win_ansi};
use super::palette::{self, Rgb};
use super::Renderer;
use crate::assemble::Block;
use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const FOOTER_Y: f32 = 28.0;
const FOOTER_SIZE: f32 = 8.0;

const REGULAR: &[u8] = b"F1";
const BOLD: &[u8] = b"F2";

#[derive(Debug, Clone, Default)]
pub struct PdfOptions {
    /// Document title stored in the PDF metadata.
    pub title: String,
    /// Printed in the footer and stored as the creation date when set.
    pub generated_at: Option<NaiveDateTime>,
}

pub struct PdfRenderer {
    options: PdfOptions,
}

impl PdfRenderer {
    pub fn new(options: PdfOptions) -> Self {
        Self { options }
    }
}

#[derive(Debug, Clone, Copy)]
struct Style {
    size: f32,
    leading: f32,
    space_before: f32,
    space_after: f32,
    centered: bool,
}

const TITLE_STYLE: Style = Style {
    size: 16.0,
    leading: 20.0,
    space_before: 0.0,
    space_after: 14.0,
    centered: true,
};

const SECTION_STYLE: Style = Style {
    size: 12.0,
    leading: 14.0,
    space_before: 12.0,
    space_after: 4.0,
    centered: false,
};

const BODY_STYLE: Style = Style {
    size: 10.0,
    leading: 13.0,
    space_before: 2.0,
    space_after: 0.0,
    centered: false,
};

#[derive(Debug, Clone)]
struct Run {
    text: String,
    bold: bool,
    color: Rgb,
}

impl Run {
    fn new(text: impl Into<String>, bold: bool, color: Rgb) -> Self {
        Self {
            text: text.into(),
            bold,
            color,
        }
    }
}

fn paragraph(block: &Block) -> Option<(Style, Vec<Run>)> {
    let text = palette::TEXT;
    let paragraph = match block {
        Block::Title(title) => (TITLE_STYLE, vec![Run::new(title, true, palette::TITLE)]),
        Block::Section(heading) => (
            SECTION_STYLE,
            vec![Run::new(heading, true, palette::SECTION)],
        ),
        Block::Field { label, value } => (
            BODY_STYLE,
            vec![
                Run::new(format!("{label} : "), true, text),
                Run::new(value, false, text),
            ],
        ),
        Block::Item { label, value } => (
            BODY_STYLE,
            vec![
                Run::new(format!("• {label} : "), false, text),
                Run::new(&value.text, true, palette::value_color(value.status)),
            ],
        ),
        Block::Text(body) => (BODY_STYLE, vec![Run::new(body, false, text)]),
        Block::PageBreak => return None,
    };
    Some(paragraph)
}

/// A word placed on a line, with whether a space precedes it.
#[derive(Debug, Clone)]
struct Word {
    text: String,
    bold: bool,
    color: Rgb,
    spaced: bool,
}

fn words(runs: &[Run]) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending_space = false;
    for run in runs {
        let leading_space = run.text.starts_with(char::is_whitespace);
        for (i, word) in run.text.split_whitespace().enumerate() {
            words.push(Word {
                text: word.to_string(),
                bold: run.bold,
                color: run.color,
                spaced: if i == 0 {
                    pending_space || leading_space
                } else {
                    true
                },
            });
        }
        if !run.text.trim().is_empty() {
            pending_space = run.text.ends_with(char::is_whitespace);
        } else if !run.text.is_empty() {
            pending_space = true;
        }
    }
    words
}

/// Cut a word wider than `max_width` into pieces that each fit on a line.
fn split_long(word: Word, size: f32, max_width: f32) -> Vec<Word> {
    if text_width(&word.text, size, word.bold) <= max_width {
        return vec![word];
    }

    let mut pieces = Vec::new();
    let mut piece = String::new();
    for c in word.text.chars() {
        piece.push(c);
        if piece.chars().count() > 1 && text_width(&piece, size, word.bold) > max_width {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(c);
        }
    }
    pieces.push(piece);

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| Word {
            text,
            spaced: i == 0 && word.spaced,
            ..word.clone()
        })
        .collect()
}

/// Greedy word wrap into lines no wider than `max_width`.
fn wrap(words: Vec<Word>, size: f32, max_width: f32) -> Vec<Vec<Word>> {
    let space = text_width(" ", size, false);
    let mut lines: Vec<Vec<Word>> = Vec::new();
    let mut line: Vec<Word> = Vec::new();
    let mut width = 0.0;

    let words = words
        .into_iter()
        .flat_map(|word| split_long(word, size, max_width));
    for mut word in words {
        let word_width = text_width(&word.text, size, word.bold);
        let gap = if word.spaced && !line.is_empty() {
            space
        } else {
            0.0
        };
        if !line.is_empty() && width + gap + word_width > max_width {
            lines.push(std::mem::take(&mut line));
            word.spaced = false;
            width = word_width;
        } else {
            if line.is_empty() {
                word.spaced = false;
            }
            width += gap + word_width;
        }
        line.push(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn line_width(line: &[Word], size: f32) -> f32 {
    let space = text_width(" ", size, false);
    line.iter()
        .map(|w| text_width(&w.text, size, w.bold) + if w.spaced { space } else { 0.0 })
        .sum()
}

fn show_text(ops: &mut Vec<Operation>, text: &str, x: f32, y: f32, size: f32, bold: bool, color: Rgb) {
    let [r, g, b] = color.unit();
    let font = if bold { BOLD } else { REGULAR };
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.to_vec()), Object::Real(size)],
    ));
    ops.push(Operation::new(
        "rg",
        vec![Object::Real(r), Object::Real(g), Object::Real(b)],
    ));
    ops.push(Operation::new("Td", vec![Object::Real(x), Object::Real(y)]));
    ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
    ops.push(Operation::new("ET", vec![]));
}

/// Emit one wrapped line, merging neighbouring words of the same style.
fn draw_line(ops: &mut Vec<Operation>, line: &[Word], x: f32, y: f32, size: f32) {
    let space = text_width(" ", size, false);
    let mut cursor = x;
    let mut segment = String::new();
    let mut segment_x = x;
    let mut style: Option<(bool, Rgb)> = None;

    for word in line {
        if style.is_some_and(|s| s != (word.bold, word.color)) {
            if let Some((bold, color)) = style {
                show_text(ops, &segment, segment_x, y, size, bold, color);
            }
            segment.clear();
        }
        if segment.is_empty() {
            if word.spaced {
                cursor += space;
            }
            segment_x = cursor;
        } else if word.spaced {
            segment.push(' ');
            cursor += space;
        }
        segment.push_str(&word.text);
        cursor += text_width(&word.text, size, word.bold);
        style = Some((word.bold, word.color));
    }
    if let Some((bold, color)) = style {
        if !segment.is_empty() {
            show_text(ops, &segment, segment_x, y, size, bold, color);
        }
    }
}

/// Pages under construction; `y` is the baseline cursor.
struct Layout {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn at_top(&self) -> bool {
        self.current.is_empty()
    }

    fn break_page(&mut self) {
        if !self.current.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        self.y = PAGE_HEIGHT - MARGIN;
    }

    /// Lay out one paragraph. `keep_next` is the room the following
    /// paragraph's first line needs on the same page; the paragraph moves to
    /// a new page when both do not fit.
    fn paragraph(&mut self, style: Style, runs: &[Run], keep_next: f32) {
        let max_width = PAGE_WIDTH - 2.0 * MARGIN;
        let lines = wrap(words(runs), style.size, max_width);
        if lines.is_empty() {
            return;
        }

        if !self.at_top() {
            let needed = style.space_before
                + style.leading * lines.len() as f32
                + style.space_after
                + keep_next;
            if keep_next > 0.0 && self.y - needed < MARGIN {
                self.break_page();
            } else {
                self.y -= style.space_before;
            }
        }
        for line in &lines {
            if self.y - style.leading < MARGIN {
                self.break_page();
            }
            self.y -= style.leading;
            let x = if style.centered {
                MARGIN + (max_width - line_width(line, style.size)).max(0.0) / 2.0
            } else {
                MARGIN
            };
            draw_line(&mut self.current, line, x, self.y, style.size);
        }
        self.y -= style.space_after;
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.break_page();
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        self.pages
    }
}

fn render_error(err: impl std::fmt::Display) -> Error {
    Error::Render(err.to_string())
}

impl PdfRenderer {
    fn layout(&self, blocks: &[Block]) -> Vec<Vec<Operation>> {
        let mut layout = Layout::new();
        for (i, block) in blocks.iter().enumerate() {
            let Some((style, runs)) = paragraph(block) else {
                layout.break_page();
                continue;
            };
            // Headings stay with the first line of their content.
            let keep_next = match (block, blocks.get(i + 1).and_then(paragraph)) {
                (Block::Section(_), Some((next, _))) => next.space_before + next.leading,
                _ => 0.0,
            };
            layout.paragraph(style, &runs, keep_next);
        }

        let mut pages = layout.finish();
        let count = pages.len();
        let stamp = self
            .options
            .generated_at
            .map(|at| at.format("Généré le %d/%m/%Y à %H:%M").to_string());
        for (i, ops) in pages.iter_mut().enumerate() {
            let number = format!("page {} / {}", i + 1, count);
            let x = PAGE_WIDTH - MARGIN - text_width(&number, FOOTER_SIZE, false);
            show_text(ops, &number, x, FOOTER_Y, FOOTER_SIZE, false, palette::FOOTER);
            if let Some(stamp) = &stamp {
                show_text(ops, stamp, MARGIN, FOOTER_Y, FOOTER_SIZE, false, palette::FOOTER);
            }
        }
        pages
    }

    fn document(&self, pages: Vec<Vec<Operation>>) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
        for operations in pages {
            let content = Content { operations };
            let stream = Stream::new(dictionary! {}, content.encode().map_err(render_error)?);
            let content_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(PAGE_WIDTH),
                    Object::Real(PAGE_HEIGHT),
                ],
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Title" => Object::string_literal(win_ansi(&self.options.title)),
            "Producer" => Object::string_literal("xlsx2fiches"),
        };
        if let Some(at) = self.options.generated_at {
            info.set(
                "CreationDate",
                Object::string_literal(at.format("D:%Y%m%d%H%M%S").to_string()),
            );
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        doc.compress();
        Ok(doc)
    }
}

impl Renderer for PdfRenderer {
    fn render(&self, blocks: &[Block], out: &mut dyn Write) -> Result<()> {
        let pages = self.layout(blocks);
        tracing::debug!(pages = pages.len(), "laid out PDF");

        let mut doc = self.document(pages)?;
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).map_err(render_error)?;
        out.write_all(&buffer)?;
        Ok(())
    }
}
