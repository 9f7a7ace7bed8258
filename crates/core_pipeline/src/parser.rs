//! Roster line parsing
//!
//! Each cleaned line is classified on its own: either it yields a unit
//! record or it is skipped as noise.

use crate::clean::is_arabic;
use crate::code::normalize_code;
use crate::types::{UnitRecord, UnitStatus};
use tracing::{debug, trace};

/// Keyword marking a busy unit
const BUSY_KEYWORD: &str = "مشغول";

/// Keyword marking an out-of-service unit
const OUT_KEYWORD: &str = "خارج";

/// True when the line has an Arabic character or an ASCII letter/digit
fn has_content(line: &str) -> bool {
    line.chars().any(|c| is_arabic(c) || c.is_ascii_alphanumeric())
}

/// Infer a status from keywords anywhere in the line. Busy wins over out.
pub fn infer_status(line: &str) -> UnitStatus {
    let lower = line.to_lowercase();
    if lower.contains(BUSY_KEYWORD) {
        UnitStatus::Busy
    } else if lower.contains(OUT_KEYWORD) {
        UnitStatus::OutOfService
    } else {
        UnitStatus::InField
    }
}

/// Parse one cleaned line into a unit record, or `None` for a noise line
///
/// The first space-delimited token is taken as the code. The name is the
/// line with the first occurrence of that raw token removed; later repeats
/// of the token stay in the name.
pub fn parse_line(line: &str) -> Option<UnitRecord> {
    if !has_content(line) {
        trace!(line, "skipping noise line");
        return None;
    }

    let token = line.split(' ').next().unwrap_or_default();
    let code = normalize_code(token);
    let name = line.replacen(token, "", 1).trim().to_string();

    Some(UnitRecord {
        name,
        code,
        status: infer_status(line),
        location: String::new(),
    })
}

/// Parse cleaned lines into unit records, preserving line order
pub fn parse_lines<I, S>(lines: I) -> Vec<UnitRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let units: Vec<UnitRecord> = lines
        .into_iter()
        .filter_map(|line| parse_line(line.as_ref()))
        .collect();
    debug!(count = units.len(), "parsed roster lines");
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_line() {
        let unit = parse_line("ab101 وحدة 1").unwrap();
        assert_eq!(unit.code, "AB-101");
        assert_eq!(unit.name, "وحدة 1");
        assert_eq!(unit.status, UnitStatus::InField);
        assert_eq!(unit.location, "");
    }

    #[test]
    fn test_noise_line_rejected() {
        assert!(parse_line("--- | ---").is_none());
        assert!(parse_line("").is_none());
        assert!(parse_line("|").is_none());
    }

    #[test]
    fn test_status_busy() {
        let unit = parse_line("CD2 سارة مشغول").unwrap();
        assert_eq!(unit.status, UnitStatus::Busy);
        assert_eq!(unit.name, "سارة مشغول");
    }

    #[test]
    fn test_status_out_of_service() {
        let unit = parse_line("EF3 خالد | خارج الخدمة").unwrap();
        assert_eq!(unit.status, UnitStatus::OutOfService);
        assert_eq!(unit.code, "EF-3");
    }

    #[test]
    fn test_busy_takes_precedence_over_out() {
        assert_eq!(infer_status("خارج مشغول"), UnitStatus::Busy);
    }

    #[test]
    fn test_arabic_first_token_gives_empty_code() {
        let unit = parse_line("محمد AB-2").unwrap();
        assert_eq!(unit.code, "");
        assert_eq!(unit.name, "AB-2");
    }

    #[test]
    fn test_single_token_line() {
        let unit = parse_line("DAT").unwrap();
        assert_eq!(unit.code, "DA-1");
        assert_eq!(unit.name, "");
    }

    #[test]
    fn test_name_removes_only_first_occurrence() {
        let unit = parse_line("A1 A1 team").unwrap();
        assert_eq!(unit.code, "A-1");
        assert_eq!(unit.name, "A1 team");
    }

    #[test]
    fn test_parse_lines_keeps_order_and_drops_noise() {
        let units = parse_lines(["B2 ثاني", "--- | ---", "A1 أول"]);
        let codes: Vec<&str> = units.iter().map(|u| u.code.as_str()).collect();
        assert_eq!(codes, vec!["B-2", "A-1"]);
    }
}
