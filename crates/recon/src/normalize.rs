//! Label canonicalization shared by every comparison between human-entered text.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a label for comparison.
///
/// Lowercases, strips diacritics (NFKD, combining marks dropped), turns
/// brackets, `%` and any other punctuation except `.` into spaces, and
/// collapses whitespace. Total and deterministic.
pub fn normalize(label: &str) -> String {
    let replaced: String = label
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
