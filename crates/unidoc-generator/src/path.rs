//! Output path helpers.

/// Directory prefix of an output filename pattern.
///
/// `"web/[name].js"` yields `"web/"`; a pattern without a directory yields `""`.
#[must_use]
pub fn derive_prefix(pattern: &str) -> &str {
    match pattern.rfind('/') {
        Some(index) => &pattern[..=index],
        None => "",
    }
}

/// Artifact key of a page's HTML.
#[must_use]
pub fn page_artifact_name(prefix: &str, entry_name: &str) -> String {
    format!("{prefix}{entry_name}.html")
}
