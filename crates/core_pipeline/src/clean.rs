//! Line cleaning for raw OCR output
//!
//! OCR of a mixed Arabic/Latin roster photo produces lines littered with
//! directional marks, quote and bracket noise, and several different
//! separator glyphs. Cleaning a line applies, in order:
//! - Removal of bidi control marks
//! - Symbol noise replaced with a space
//! - Separator glyphs normalized to a padded pipe
//! - Any other character outside the allowed classes replaced with a space
//! - Whitespace collapsed and trimmed

use tracing::trace;

/// Bidirectional control marks (LRM, RLM, embeddings and overrides)
const BIDI_MARKS: &[char] = &[
    '\u{200E}', // Left-to-right mark
    '\u{200F}', // Right-to-left mark
    '\u{202A}', // Left-to-right embedding
    '\u{202B}', // Right-to-left embedding
    '\u{202C}', // Pop directional formatting
    '\u{202D}', // Left-to-right override
    '\u{202E}', // Right-to-left override
];

/// Symbols that carry no content and become a space
const NOISE_SYMBOLS: &[char] = &[
    '©', '#', '@', '*', '+', '=', '~', '^', '`', '"', '\u{201C}', '\u{201D}', '\'', '\u{2019}',
    '[', ']', '(', ')', '<', '>',
];

/// Field separators, all mapped to one canonical pipe
const SEPARATORS: &[char] = &[
    '|',        // Pipe
    '\u{060C}', // Arabic comma
    ':',        // Colon
    '\u{061B}', // Arabic semicolon
    '\u{2022}', // Bullet
    '\u{00B7}', // Middle dot
];

/// Canonical separator written in place of any [`SEPARATORS`] glyph
pub const PIPE_SEPARATOR: &str = " | ";

/// True for any character in the Arabic block (U+0600 to U+06FF)
pub fn is_arabic(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

fn is_allowed(c: char) -> bool {
    is_arabic(c) || c.is_ascii_alphanumeric() || c == '-' || c == '|' || c.is_whitespace()
}

/// Clean one raw OCR line
///
/// The classes are checked in rule order, so a character matched by an
/// earlier rule never reaches a later one. Separators are mapped before the
/// generic purge, which would otherwise blank them out.
pub fn clean_line(line: &str) -> String {
    if line.is_empty() {
        return String::new();
    }

    let mut mapped = String::with_capacity(line.len() + 8);
    for c in line.chars() {
        if BIDI_MARKS.contains(&c) {
            continue;
        } else if NOISE_SYMBOLS.contains(&c) {
            mapped.push(' ');
        } else if SEPARATORS.contains(&c) {
            mapped.push_str(PIPE_SEPARATOR);
        } else if is_allowed(c) {
            mapped.push(c);
        } else {
            mapped.push(' ');
        }
    }

    let cleaned = mapped.split_whitespace().collect::<Vec<_>>().join(" ");
    trace!(original = %line, cleaned = %cleaned, "cleaned line");
    cleaned
}

/// Split raw OCR text on newlines and clean each line, dropping lines that
/// end up empty
pub fn clean_text(text: &str) -> Vec<String> {
    text.split('\n')
        .map(clean_line)
        .filter(|line| !line.is_empty())
        .collect()
}
