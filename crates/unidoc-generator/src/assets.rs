//! Page asset resolution.
//!
//! Classifies an entry's output files into script and stylesheet URLs.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use unidoc_core::AssetManifest;

static SCRIPT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.js$").expect("Invalid script regex"));
static STYLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.css$").expect("Invalid style regex"));

/// Build the asset manifest for one page.
///
/// A relative public path (starting with `.`) keeps only each file's basename;
/// otherwise the file path is appended unchanged. Host order is preserved.
#[must_use]
pub fn resolve_assets<S: AsRef<str>>(files: &[S], public_path: &str) -> AssetManifest {
    let relative = public_path.starts_with('.');
    let url = |file: &str| {
        if relative {
            format!("{public_path}{}", basename(file))
        } else {
            format!("{public_path}{file}")
        }
    };

    let mut manifest = AssetManifest::default();
    for file in files.iter().map(AsRef::as_ref) {
        if SCRIPT_RE.is_match(file) {
            manifest.scripts.push(url(file));
        } else if STYLE_RE.is_match(file) {
            manifest.styles.push(url(file));
        }
    }

    debug!(
        scripts = manifest.scripts.len(),
        styles = manifest.styles.len(),
        "resolved page assets"
    );
    manifest
}

fn basename(file: &str) -> &str {
    file.rsplit('/').next().unwrap_or(file)
}
