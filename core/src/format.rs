//! Human-readable number formatting shared by scoreboards and briefs.

/// Formats a value as its whole part followed by up to two decimals, both
/// truncated toward zero.
///
/// Trailing zero decimals are omitted, so `2.0` renders as `2`, `0.5` as `0.5`,
/// `0.657` as `0.65` and `-0.5` as `-0.5`.
#[must_use]
pub fn decimal(value: f32) -> String {
    let magnitude = value.abs();
    let whole = magnitude.trunc();
    // Nudge before truncating so 0.65 does not render as 0.64.
    let hundredths = (((magnitude - whole) * 100.0 + 1e-3).floor() as u32).min(99);
    let sign = if value < 0.0 && (whole > 0.0 || hundredths > 0) {
        "-"
    } else {
        ""
    };
    if hundredths == 0 {
        return format!("{sign}{}", whole as i64);
    }
    let digits = format!("{hundredths:02}");
    format!("{sign}{}.{}", whole as i64, digits.trim_end_matches('0'))
}
