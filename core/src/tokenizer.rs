use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[a-z0-9_]+").expect("valid regex");
}

/// Tokenize text by lowercasing and extracting runs of ASCII letters, digits and `_`.
///
/// Everything else (whitespace, punctuation, non-ASCII letters) acts as a
/// token boundary. Indexing and querying must both go through this function.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}
