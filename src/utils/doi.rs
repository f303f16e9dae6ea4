//! DOI extraction from free text.

use regex::Regex;
use std::sync::OnceLock;

static DOI_PATTERN: OnceLock<Regex> = OnceLock::new();

fn doi_pattern() -> &'static Regex {
    DOI_PATTERN.get_or_init(|| {
        Regex::new(r"10\.[0-9]{4,9}/[-._;()/:A-Za-z0-9]+").expect("DOI pattern is valid")
    })
}

/// Return the first DOI found in `text`.
///
/// # Examples
///
/// ```
/// use article_eater_client::utils::extract_doi;
///
/// assert_eq!(extract_doi("see 10.1234/abcXYZ for details"), Some("10.1234/abcXYZ"));
/// assert_eq!(extract_doi("no doi here"), None);
/// ```
pub fn extract_doi(text: &str) -> Option<&str> {
    doi_pattern().find(text).map(|m| m.as_str())
}

/// Resolver link for a DOI
pub fn doi_url(doi: &str) -> String {
    format!("https://doi.org/{}", doi)
}
