//! URL slug generation.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

fn non_alphanumeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("static slug pattern"))
}

/// Turn a display name into a URL slug.
///
/// Accents are stripped after NFD decomposition ("Café crème" becomes
/// "cafe-creme"); every run of other characters collapses to one dash.
pub fn slugify(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();
    non_alphanumeric()
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}
