//! Recovery of structured payloads from free-form model replies.

/// Strip markdown code fences (```json ... ```) from the response.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if text.starts_with("```") {
        // Skip the opening fence line (``` or ```json)
        let after_open = if let Some(nl) = text.find('\n') {
            &text[nl + 1..]
        } else {
            return text;
        };
        if let Some(close) = after_open.rfind("```") {
            return after_open[..close].trim();
        }
        return after_open.trim();
    }
    text
}

/// Slice from the first `open` to the last `close` delimiter, if both
/// exist in that order.
fn slice_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (end > start).then(|| &text[start..=end])
}

/// The outermost `{ ... }` span of a reply, after removing code fences.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    slice_between(strip_code_fences(reply), '{', '}')
}

/// The outermost `[ ... ]` span of a reply, after removing code fences.
pub fn extract_json_array(reply: &str) -> Option<&str> {
    slice_between(strip_code_fences(reply), '[', ']')
}

/// Truncate a string for error messages.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    }
}
