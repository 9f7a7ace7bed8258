//! Unit code normalization
//!
//! Canonical unit codes are `LETTERS-DIGITS` (1-3 letters, 1-4 digits).
//! OCR on the roster font regularly reads `0` as `O` and `1` as `I` or `l`,
//! and one unit is misread often enough to have its own alias table.

use tracing::trace;

/// OCR misreadings of `DA-1`, compared after cleanup
const DA1_ALIASES: &[&str] = &["DAT", "D4T", "D41", "DAI"];

const DA1_CODE: &str = "DA-1";

const MAX_LETTERS: usize = 3;
const MAX_DIGITS: usize = 4;

fn fix_confusions(c: char) -> char {
    match c {
        'O' | 'o' => '0',
        'I' | 'l' => '1',
        _ => c,
    }
}

/// Normalize a candidate code token
///
/// Tokens matching neither the alias table nor the `LETTERS-DIGITS` shape are
/// returned cleaned but otherwise unstructured.
///
/// Confusion fixes run before uppercasing, so a lowercase `i` comes out as a
/// letter `I` and only becomes `1` if the result is normalized again.
pub fn normalize_code(token: &str) -> String {
    let token = token.trim();
    if token.is_empty() {
        return String::new();
    }

    let cleaned: String = token
        .chars()
        .map(fix_confusions)
        .collect::<String>()
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '-')
        .collect();

    if DA1_ALIASES
        .iter()
        .any(|alias| alias.eq_ignore_ascii_case(&cleaned))
    {
        trace!(token, "matched DA-1 alias");
        return DA1_CODE.to_string();
    }

    match split_letters_digits(&cleaned) {
        Some((letters, digits)) => format!("{}-{}", letters, digits),
        None => cleaned,
    }
}

/// Match `^([A-Z]{1,3})-?(\d{1,4})$`, returning the letter and digit parts
fn split_letters_digits(code: &str) -> Option<(&str, &str)> {
    let letters_end = code
        .find(|c: char| !c.is_ascii_uppercase())
        .unwrap_or(code.len());
    let (letters, rest) = code.split_at(letters_end);
    let digits = rest.strip_prefix('-').unwrap_or(rest);

    let letters_ok = (1..=MAX_LETTERS).contains(&letters.len());
    let digits_ok =
        (1..=MAX_DIGITS).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit());

    (letters_ok && digits_ok).then_some((letters, digits))
}
