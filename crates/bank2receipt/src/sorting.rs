/// Order export lines by their text.
///
/// Once dates are normalized to ISO form this puts data lines in date order; headers
/// and comments sort wherever their text lands and are filtered out later.
pub fn sort_lines(lines: &mut [&str]) {
    lines.sort_unstable();
}
