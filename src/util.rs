//! Utilities.

/// Decodes a number with an optional decimal magnitude suffix.
///
/// `zpool iostat` prints rates like `120`, `1.5M` or `2K`. The suffixes `K`,
/// `M`, `G` and `T` scale by powers of 1000 and must be the last character.
/// Fractions are truncated toward zero after scaling.
///
/// This never fails: a malformed number decodes as `0`, and so does a
/// negative one.
// ALLOW float to int conversion saturates and maps NaN to zero
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn decode_suffix(s: &str) -> u64 {
    let s = s.trim();

    let multiplier = match s.chars().last() {
        Some('K') => 1e3,
        Some('M') => 1e6,
        Some('G') => 1e9,
        Some('T') => 1e12,
        _ => 1.0,
    };

    // suffixes are ASCII, so they are exactly one byte
    let number = if multiplier > 1.0 { &s[..s.len() - 1] } else { s };

    let number = number.parse::<f64>().unwrap_or_default();

    (number * multiplier) as u64
}
