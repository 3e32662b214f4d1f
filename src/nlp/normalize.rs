//! Free-text cleanup applied before searching or extraction.

/// Lowercase `text`, trim it and collapse every whitespace run to one space.
///
/// ```
/// use clinical_keywords::nlp::normalize::normalize_text;
/// assert_eq!(normalize_text("  HELLOOO   DOCTOR  "), "hellooo doctor");
/// ```
pub fn normalize_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut out = String::with_capacity(lower.len());
    for word in lower.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
