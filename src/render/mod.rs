//! Document renderers for assembled report blocks.

mod html;
mod metrics;
pub mod palette;
mod pdf;

pub use html::HtmlRenderer;
pub use pdf::{PdfOptions, PdfRenderer};

use crate::assemble::Block;
use crate::error::Result;
use std::io::Write;

/// Turns a block sequence into a finished document.
pub trait Renderer {
    fn render(&self, blocks: &[Block], out: &mut dyn Write) -> Result<()>;
}
