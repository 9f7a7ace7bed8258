//! Transcript to unit list
//!
//! Runs the synchronous part of extraction: clean every line, parse the
//! survivors, collapse duplicates.

use crate::clean::clean_text;
use crate::dedup::dedup_units;
use crate::parser::parse_lines;
use crate::types::UnitRecord;
use tracing::info;

/// Turn raw OCR text into a deduplicated unit list
pub fn extract_units(raw_text: &str) -> Vec<UnitRecord> {
    let lines = clean_text(raw_text);
    let units = dedup_units(parse_lines(&lines));
    info!(
        lines = lines.len(),
        units = units.len(),
        "extracted units from transcript"
    );
    units
}
