//! National ID normalization, live input formatting and display masking.
//!
//! # Responsibility
//! - Reduce free-form keystrokes to the canonical digits-only form.
//! - Render the partially redacted form used everywhere outside intake.
//!
//! # Invariants
//! - A canonical national ID is exactly `NATIONAL_ID_LEN` ASCII digits.
//! - `mask_id` is total: malformed input degrades to `FULLY_MASKED_ID`.
//! - `format_id_input` is idempotent on its own output.

use once_cell::sync::Lazy;
use regex::Regex;

/// Digit count of a complete national ID.
pub const NATIONAL_ID_LEN: usize = 11;

/// Placeholder rendered for anything that is not a complete national ID.
pub const FULLY_MASKED_ID: &str = "***.***.***-**";

static NON_DIGIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9]+").expect("valid non-digit regex"));

/// Removes every non-digit character.
pub fn only_digits(raw: &str) -> String {
    NON_DIGIT_RE.replace_all(raw, "").into_owned()
}

/// Canonical storage form: digits only, truncated to 11.
pub fn id_digits(raw: &str) -> String {
    let mut digits = only_digits(raw);
    digits.truncate(NATIONAL_ID_LEN);
    digits
}

/// Returns whether `digits` is a complete canonical national ID.
pub fn is_complete_id(digits: &str) -> bool {
    digits.len() == NATIONAL_ID_LEN && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Partially redacts a canonical national ID for display.
///
/// Only digits 7-9 and the two check digits stay visible:
/// `12345678909` renders as `***.***.789-09`.
pub fn mask_id(digits: &str) -> String {
    if !is_complete_id(digits) {
        return FULLY_MASKED_ID.to_string();
    }
    // Slicing is safe: all 11 bytes are ASCII digits.
    format!("***.***.{}-{}", &digits[6..9], &digits[9..11])
}

/// Formats raw keystrokes as `000.000.000-00`, inserting separators as
/// each group fills up.
pub fn format_id_input(raw: &str) -> String {
    let digits = id_digits(raw);
    let mut out = String::with_capacity(NATIONAL_ID_LEN + 3);
    for (index, ch) in digits.chars().enumerate() {
        match index {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(ch);
    }
    out
}
