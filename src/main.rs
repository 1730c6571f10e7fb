use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use xlsx2fiches::reader::Delimiter;
use xlsx2fiches::render::{HtmlRenderer, PdfOptions, PdfRenderer, Renderer};
use xlsx2fiches::{assemble, error, logging, pipeline, reader};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Pdf,
    Html,
}

impl OutputFormat {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "fiches_stagiaires.pdf",
            OutputFormat::Html => "fiches_stagiaires.html",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "xlsx2fiches")]
#[command(version, about = "Generate color-coded evaluation reports, one page per trainee")]
pub struct Args {
    /// Evaluation sheet (.xlsx, .xlsm, .xls or .csv)
    pub input: PathBuf,

    /// Output file (default: fiches_stagiaires.pdf or .html)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Sheet to read, by name or 0-based index (default: first sheet)
    #[arg(short, long)]
    pub sheet: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pdf)]
    pub format: OutputFormat,

    /// Field separator when the input is CSV
    #[arg(short, long, value_enum, default_value_t = Delimiter::Comma)]
    pub delimiter: Delimiter,

    /// One report per trainee and evaluation date
    #[arg(long)]
    pub by_date: bool,

    /// Title printed at the top of every report
    #[arg(long, default_value = "Fiche d’évaluation")]
    pub title: String,

    /// Leave the generation date out of the document
    #[arg(long)]
    pub no_timestamp: bool,

    /// Print progress to stderr (-vv for details)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> error::Result<()> {
    let read_options = reader::ReadOptions {
        sheet: args.sheet.clone(),
        delimiter: args.delimiter,
    };
    let table = reader::open_table(&args.input, &read_options)?;

    let report_options = assemble::ReportOptions {
        title: args.title.clone(),
        split_by_date: args.by_date,
    };
    let blocks = pipeline::build_blocks(&table, &report_options)?;

    let generated_at = if args.no_timestamp {
        None
    } else {
        Some(chrono::Local::now().naive_local())
    };
    let renderer: Box<dyn Renderer> = match args.format {
        OutputFormat::Pdf => Box::new(PdfRenderer::new(PdfOptions {
            title: args.title.clone(),
            generated_at,
        })),
        OutputFormat::Html => Box::new(HtmlRenderer::new(args.title.clone(), generated_at)),
    };

    // A failed render must not leave a partial file at the output path.
    let mut document = Vec::new();
    renderer.render(&blocks, &mut document)?;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(args.format.default_file_name()));
    std::fs::write(&output, &document)?;
    tracing::info!(bytes = document.len(), "wrote {}", output.display());

    Ok(())
}
