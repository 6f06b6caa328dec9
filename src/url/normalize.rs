/// Normalizes a URL string into its identity key
///
/// # Normalization Steps
///
/// 1. Trim leading/trailing whitespace
/// 2. Remove fragment (everything from the first `#`)
/// 3. Remove a single trailing slash (`a//` keeps both)
///
/// Nothing else is rewritten: query strings, host case and default ports are
/// left untouched, so `?a=1&b=2` and `?b=2&a=1` remain distinct entities.
///
/// The steps are repeated until the string stops changing, which keeps the
/// function idempotent for inputs such as `"https://x.com/a/ /"` where one
/// pass exposes more whitespace or another lone slash.
///
/// # Examples
///
/// ```
/// use crawl4xx::url::normalize_url;
///
/// assert_eq!(normalize_url(" https://example.com/page/#top "), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com/?q=1"), "https://example.com/?q=1");
/// ```
pub fn normalize_url(raw: &str) -> String {
    let mut current = raw;
    loop {
        let next = normalize_once(current);
        // Every step only shrinks the slice, so equal length means no change.
        if next.len() == current.len() {
            return next.to_string();
        }
        current = next;
    }
}

/// Applies the three normalization steps a single time
fn normalize_once(raw: &str) -> &str {
    let trimmed = raw.trim();

    let without_fragment = match trimmed.find('#') {
        Some(index) => &trimmed[..index],
        None => trimmed,
    };

    if without_fragment.ends_with("//") {
        return without_fragment;
    }
    without_fragment
        .strip_suffix('/')
        .unwrap_or(without_fragment)
}
