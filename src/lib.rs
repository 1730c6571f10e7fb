//! Evaluation sheets to per-trainee reports.
//!
//! The pipeline is a chain of pure steps: [`reader`] loads a worksheet,
//! [`roles`] works out what each column holds, [`records`] and
//! [`assemble`] turn rows into report blocks, and [`render`] writes them
//! out as PDF or HTML.

pub mod assemble;
pub mod dates;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod records;
pub mod render;
pub mod roles;
pub mod status;
