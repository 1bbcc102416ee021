/// Thresholds used when no alert rule has been stored yet.
pub const DEFAULT_THRESHOLDS: [u32; 6] = [90, 60, 30, 14, 7, 1];

/// Parse a comma-separated threshold list into a descending, deduplicated
/// set of day counts. Tokens that are not plain non-negative integers are
/// dropped.
pub fn parse_thresholds(csv: &str) -> Vec<u32> {
    let mut values: Vec<u32> = csv
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|part| part.parse().ok())
        .collect();
    values.sort_unstable_by(|a, b| b.cmp(a));
    values.dedup();
    values
}

/// Render thresholds back to the canonical CSV form.
pub fn format_thresholds(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
