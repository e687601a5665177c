/// Case-insensitive substring test. `needle` must already be lower-cased.
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Keeps the rows matching `search`; an absent or blank search keeps everything.
pub fn filter_rows<T>(
    rows: Vec<T>,
    search: Option<&str>,
    matches: impl Fn(&T, &str) -> bool,
) -> Vec<T> {
    let needle = match search.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_lowercase(),
        _ => return rows,
    };
    rows.into_iter().filter(|row| matches(row, &needle)).collect()
}
