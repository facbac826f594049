//! Per-page HTML rendering.

use std::sync::Arc;

use tracing::{debug, info};
use unidoc_core::{
    Compilation, ComponentRef, DocumentProps, PageDescriptor, RenderService, RenderedArtifact,
};

use crate::{
    assets::resolve_assets,
    error::{DocumentError, Result},
    path::page_artifact_name,
};

/// Renders one HTML artifact per declared page from a loaded document.
pub struct PageRenderer {
    doctype: String,
    prefix: String,
    public_path: String,
    renderer: Arc<dyn RenderService>,
}

impl PageRenderer {
    /// Create a renderer.
    ///
    /// `doctype` is prepended to every page, `prefix` is the output directory
    /// prefix of artifact keys and `public_path` prefixes asset URLs.
    pub fn new(
        doctype: impl Into<String>,
        prefix: impl Into<String>,
        public_path: impl Into<String>,
        renderer: Arc<dyn RenderService>,
    ) -> Self {
        Self {
            doctype: doctype.into(),
            prefix: prefix.into(),
            public_path: public_path.into(),
            renderer,
        }
    }

    /// Render a single page against the compilation's entrypoints.
    pub fn render_page(
        &self,
        document: &ComponentRef,
        page: &PageDescriptor,
        compilation: &Compilation,
    ) -> Result<RenderedArtifact> {
        let files = compilation.entry_files(&page.entry_name).ok_or_else(|| {
            DocumentError::configuration(format!(
                "page entry `{}` has no compiled output",
                page.entry_name
            ))
        })?;

        let manifest = resolve_assets(files, &self.public_path);
        let props = DocumentProps::new(manifest, page.path.clone());
        let element = self.renderer.create_element(Arc::clone(document), props);

        let markup =
            self.renderer
                .render_to_string(&element)
                .map_err(|source| DocumentError::Render {
                    page: page.entry_name.clone(),
                    source,
                })?;

        let name = page_artifact_name(&self.prefix, &page.entry_name);
        debug!(page = %page.entry_name, artifact = %name, "rendered page");

        Ok(RenderedArtifact {
            name,
            content: format!("{}{markup}", self.doctype),
        })
    }

    /// Render every page, then register all artifacts and drop `temp_asset`.
    ///
    /// Nothing is registered unless every page renders.
    pub fn emit_pages(
        &self,
        document: &ComponentRef,
        pages: &[PageDescriptor],
        compilation: &mut Compilation,
        temp_asset: &str,
    ) -> Result<usize> {
        info!(count = pages.len(), "rendering document pages");

        let artifacts = pages
            .iter()
            .map(|page| self.render_page(document, page, compilation))
            .collect::<Result<Vec<_>>>()?;

        let count = artifacts.len();
        for artifact in artifacts {
            compilation.emit_asset(artifact.name, artifact.content);
        }
        compilation.remove_asset(temp_asset);

        Ok(count)
    }
}

impl std::fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRenderer")
            .field("doctype", &self.doctype)
            .field("prefix", &self.prefix)
            .field("public_path", &self.public_path)
            .finish_non_exhaustive()
    }
}
