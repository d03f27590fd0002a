pub fn to_full_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else {
        url.into()
    }
}

/// Last non-empty `/`-delimited segment of a URL or path, query/fragment
/// stripped. `None` when the input holds no segment at all.
pub fn last_path_segment(url: &str) -> Option<&str> {
    let path = url
        .split_once(['?', '#'])
        .map(|(path, _)| path)
        .unwrap_or(url);

    path.rsplit('/').find(|segment| !segment.is_empty())
}

/// Digits of `text` folded into a single number. `None` when the text
/// contains no digit at all, or when the digit run does not fit a `u32`.
pub fn extract_digits(text: &str) -> Option<u32> {
    let mut acc: Option<u32> = None;

    for ch in text.chars() {
        if let Some(digit) = ch.to_digit(10) {
            acc = Some(acc.unwrap_or(0).checked_mul(10)?.checked_add(digit)?);
        }
    }

    acc
}

/// Truncates on a char boundary, for quoting response bodies in errors.
pub fn truncate(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
