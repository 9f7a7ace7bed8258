//! Core pipeline for opsroster
//!
//! This crate turns the OCR transcript of an ambulance dispatch roster
//! photo into a deduplicated unit list, keeps that list editable in an
//! in-memory session, and renders the fixed bilingual handover report.

pub mod clean;
pub mod code;
pub mod dedup;
pub mod error;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod session;
pub mod types;

pub use clean::clean_line;
pub use code::normalize_code;
pub use dedup::dedup_units;
pub use error::RosterError;
pub use ocr::{OcrEngine, LANGUAGE_HINT};
pub use parser::parse_lines;
pub use pipeline::extract_units;
pub use report::render_report;
pub use session::{ExtractionOutcome, Session};
pub use types::*;
