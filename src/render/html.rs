//! Self-contained HTML preview of the report.

use super::palette;
use super::Renderer;
use crate::assemble::Block;
use crate::error::Result;
use chrono::NaiveDateTime;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::io::Write;

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;font-size:10pt;max-width:45em;margin:2em auto}\
section{page-break-after:always;break-after:page;margin-bottom:3em}\
h1{font-size:16pt;text-align:center}\
h2{font-size:12pt;margin:1em 0 .3em}\
p{margin:.2em 0}\
footer{color:#666666;font-size:8pt}";

pub struct HtmlRenderer {
    title: String,
    generated_at: Option<NaiveDateTime>,
}

impl HtmlRenderer {
    pub fn new(title: impl Into<String>, generated_at: Option<NaiveDateTime>) -> Self {
        Self {
            title: title.into(),
            generated_at,
        }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, blocks: &[Block], out: &mut dyn Write) -> Result<()> {
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html lang=\"fr\">")?;
        writeln!(
            out,
            "<head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head>",
            encode_text(&self.title),
            STYLE
        )?;
        writeln!(out, "<body>")?;

        let mut open = false;
        for block in blocks {
            if !open && *block != Block::PageBreak {
                writeln!(out, "<section>")?;
                open = true;
            }
            match block {
                Block::Title(title) => writeln!(
                    out,
                    "<h1 style=\"color:{}\">{}</h1>",
                    palette::TITLE.hex(),
                    encode_text(title)
                )?,
                Block::Field { label, value } => writeln!(
                    out,
                    "<p><b>{} :</b> {}</p>",
                    encode_text(label),
                    encode_text(value)
                )?,
                Block::Section(heading) => writeln!(
                    out,
                    "<h2 style=\"color:{}\">{}</h2>",
                    palette::SECTION.hex(),
                    encode_text(heading)
                )?,
                Block::Item { label, value } => {
                    let status_attr = value
                        .status
                        .map(|s| {
                            format!(
                                " data-status=\"{}\" title=\"{}\"",
                                encode_double_quoted_attribute(s.mark()),
                                encode_double_quoted_attribute(s.description())
                            )
                        })
                        .unwrap_or_default();
                    writeln!(
                        out,
                        "<p>• {} : <b style=\"color:{}\"{}>{}</b></p>",
                        encode_text(label),
                        palette::value_color(value.status).hex(),
                        status_attr,
                        encode_text(&value.text)
                    )?
                }
                Block::Text(body) => writeln!(out, "<p>{}</p>", encode_text(body))?,
                Block::PageBreak => {
                    if open {
                        writeln!(out, "</section>")?;
                        open = false;
                    }
                }
            }
        }
        if open {
            writeln!(out, "</section>")?;
        }

        if let Some(at) = self.generated_at {
            writeln!(
                out,
                "<footer>{}</footer>",
                at.format("Généré le %d/%m/%Y à %H:%M")
            )?;
        }
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::classify;

    fn render(blocks: &[Block]) -> String {
        let mut out = Vec::new();
        HtmlRenderer::new("Fiches", None)
            .render(blocks, &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_escapes_text() {
        let html = render(&[Block::Text("<script>\"x\" & 'y'</script>".to_string())]);
        assert!(html.contains("<p>&lt;script&gt;\"x\" &amp; 'y'&lt;/script&gt;</p>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_item_colors() {
        let html = render(&[
            Block::Item {
                label: "Accueil".to_string(),
                value: classify("Fait"),
            },
            Block::Item {
                label: "Vente".to_string(),
                value: classify("NA"),
            },
            Block::Item {
                label: "Caisse".to_string(),
                value: classify("3/5"),
            },
        ]);
        assert!(html.contains("<b style=\"color:#00B050\" data-status=\"FAIT\" title=\"fait\">Fait</b>"));
        assert!(html.contains("<b style=\"color:#C00000\" data-status=\"NA\" title=\"non acquis\">NA</b>"));
        assert!(html.contains("<b style=\"color:#000000\">3/5</b>"));
    }

    #[test]
    fn test_one_section_per_unit() {
        let unit = |name: &str| {
            vec![
                Block::Title("Fiche".to_string()),
                Block::Field {
                    label: "Stagiaire".to_string(),
                    value: name.to_string(),
                },
                Block::PageBreak,
            ]
        };
        let mut blocks = unit("Alice");
        blocks.extend(unit("Bob"));
        let html = render(&blocks);

        assert_eq!(html.matches("<section>").count(), 2);
        assert_eq!(html.matches("</section>").count(), 2);
        assert!(html.find("Alice").unwrap() < html.find("Bob").unwrap());
    }

    #[test]
    fn test_output_is_deterministic() {
        let blocks = vec![Block::Title("Fiche".to_string()), Block::PageBreak];
        assert_eq!(render(&blocks), render(&blocks));
    }
}
