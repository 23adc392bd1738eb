use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn whitespace_runs() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").ok()).as_ref()
}

/// Collapse each run of whitespace to a single space
fn collapse_whitespace(text: &str) -> Option<String> {
    let pattern = whitespace_runs()?;
    Some(pattern.replace_all(text, " ").into_owned())
}

/// Normalize matched OCR text for output
/// - NFKC folds full-width digits and ligatures the engine sometimes emits
/// - Trims, collapses internal whitespace runs to a single space
/// - Lowercases
pub fn normalize(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    let trimmed = composed.trim();

    collapse_whitespace(trimmed)
        .unwrap_or_else(|| trimmed.to_string())
        .to_lowercase()
}
