//! Small text helpers shared by the inference client and HTTP handlers.

/// Truncate `text` to at most `max_len` bytes on a char boundary,
/// appending `"..."` when something was cut and there is room for it.
#[must_use]
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.len() <= max_len {
        return text.to_owned();
    }

    let (limit, suffix) = if max_len < 3 {
        (max_len, "")
    } else {
        (max_len - 3, "...")
    };
    let boundary = text
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= limit)
        .last()
        .unwrap_or(0);

    format!("{}{suffix}", &text[..boundary])
}

/// Strip a `data:<mime>;base64,` prefix, returning the payload.
///
/// Strings without a comma are returned unchanged so bare base64 is
/// accepted too.
#[must_use]
pub fn strip_data_url(value: &str) -> &str {
    match value.split_once(',') {
        Some((_, payload)) => payload,
        None => value,
    }
}
