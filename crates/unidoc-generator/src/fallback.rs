//! Dev-server history fallback.
//!
//! Requests that do not target a script, page, stylesheet or JSON resource are
//! answered with a generated page so client-side routing works on reload.

use std::sync::LazyLock;

use regex::Regex;
use unidoc_core::Compilation;

use crate::path::{derive_prefix, page_artifact_name};

static ASSET_REQUEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(js|html|css|json)").expect("Invalid asset request regex"));

/// Serves a generated page for client-routed requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryFallback {
    artifact: String,
}

impl HistoryFallback {
    /// Fall back to the given artifact key.
    pub fn new(artifact: impl Into<String>) -> Self {
        Self {
            artifact: artifact.into(),
        }
    }

    /// Fall back to the `index` page of an output filename pattern.
    #[must_use]
    pub fn for_output(filename_pattern: &str) -> Self {
        Self::new(page_artifact_name(derive_prefix(filename_pattern), "index"))
    }

    /// Artifact key served for matching requests.
    #[must_use]
    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Whether a request path should receive the fallback page.
    #[must_use]
    pub fn matches(&self, request_path: &str) -> bool {
        !ASSET_REQUEST_RE.is_match(request_path)
    }

    /// Fallback HTML for a request, if it matches and the page exists.
    #[must_use]
    pub fn resolve<'a>(&self, request_path: &str, compilation: &'a Compilation) -> Option<&'a str> {
        if self.matches(request_path) {
            compilation.asset(&self.artifact)
        } else {
            None
        }
    }
}
