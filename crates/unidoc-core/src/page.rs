//! Page-level values flowing through the document pipeline.

use serde::{Deserialize, Serialize};

/// One output page and the URL path it is served at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageDescriptor {
    /// Name of the host build entry whose outputs the page loads.
    pub entry_name: String,

    /// URL path the page is served at.
    pub path: String,
}

impl PageDescriptor {
    /// Create a page descriptor.
    pub fn new(entry_name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            entry_name: entry_name.into(),
            path: path.into(),
        }
    }
}

/// Resolved script and style URLs for one page, in host output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Script URLs.
    pub scripts: Vec<String>,

    /// Stylesheet URLs.
    pub styles: Vec<String>,
}

impl AssetManifest {
    /// Whether the manifest references no assets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty() && self.styles.is_empty()
    }
}

/// Final HTML produced for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    /// Artifact key in the host's output set.
    pub name: String,

    /// Full HTML text.
    pub content: String,
}
