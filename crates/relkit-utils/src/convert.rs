//! Lenient conversions for values read from environment variables and CLI input

/// Parse an integer, returning `fallback` on any parse failure.
///
/// Surrounding whitespace is ignored.
#[must_use]
pub fn to_int(s: &str, fallback: i64) -> i64 {
    s.trim().parse().unwrap_or(fallback)
}

/// `true` only for the string `"true"` in any letter case.
#[must_use]
pub fn to_bool(s: &str) -> bool {
    s.eq_ignore_ascii_case("true")
}
