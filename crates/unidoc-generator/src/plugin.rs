//! Document plugin orchestration.
//!
//! Wires the sub-build, loader and page renderer into the host lifecycle:
//!
//! 1. `make` compiles the template in a secondary build
//! 2. `additional_assets` adds the template's files to the watched set
//! 3. `emit` loads the compiled template and renders every page

use std::{path::Path, sync::Arc};

use tracing::{debug, info};
use unidoc_core::{Compilation, Config, HostConfig, Services};

use crate::{
    error::Result,
    lifecycle::{BuildStats, Plugin, run_build},
    loader::load_document,
    path::derive_prefix,
    render::PageRenderer,
    sub_build::{CompiledTemplate, SubBuildRunner, TEMP_FILE_NAME},
};

/// Renders a document template into one HTML page per declared entry.
#[derive(Debug)]
pub struct DocumentPlugin {
    config: Config,
    services: Services,
    doctype: String,
}

/// Build-scoped state carried from `make` to the later hooks.
#[derive(Debug, Clone)]
pub struct DocumentBuild {
    template: CompiledTemplate,
}

impl DocumentBuild {
    /// The compiled template captured by the secondary build.
    #[must_use]
    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }
}

impl DocumentPlugin {
    /// Create a plugin. Fails when the options are invalid.
    pub fn new(config: Config, services: Services) -> Result<Self> {
        config.validate()?;
        let doctype = config.document.doctype_prefix();

        info!(
            template = %config.document.path.display(),
            pages = config.pages.len(),
            "document plugin configured"
        );

        Ok(Self {
            config,
            services,
            doctype,
        })
    }

    /// Create a plugin from a TOML options file.
    pub fn from_file(path: &Path, services: Services) -> Result<Self> {
        Self::new(Config::load(path)?, services)
    }

    /// Plugin options.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Doctype prefix prepended to every page.
    #[must_use]
    pub fn doctype(&self) -> &str {
        &self.doctype
    }

    /// Public path used for asset URLs: the plugin override or the host's.
    #[must_use]
    pub fn public_path<'a>(&'a self, host: &'a HostConfig) -> &'a str {
        self.config
            .document
            .public_path
            .as_deref()
            .unwrap_or(&host.output.public_path)
    }

    /// Run a complete build against `compilation`.
    pub async fn build(&self, compilation: &mut Compilation) -> Result<BuildStats> {
        run_build(self, compilation).await
    }

    fn render(&self, state: &DocumentBuild, compilation: &mut Compilation) -> Result<usize> {
        let document = load_document(
            &state.template.source,
            self.services.evaluator.as_ref(),
            self.services.resolver.as_ref(),
        )?;

        let host = compilation.config();
        let renderer = PageRenderer::new(
            self.doctype.as_str(),
            derive_prefix(&host.output.filename),
            self.public_path(host),
            Arc::clone(&self.services.renderer),
        );

        renderer.emit_pages(&document, &self.config.pages, compilation, TEMP_FILE_NAME)
    }
}

impl Plugin for DocumentPlugin {
    type State = DocumentBuild;

    fn name(&self) -> &str {
        "DocumentPlugin"
    }

    async fn make(&self, compilation: &mut Compilation) -> Result<DocumentBuild> {
        let runner = SubBuildRunner::new(
            Arc::clone(&self.services.compiler),
            compilation.config(),
            &self.config.document.path,
        );
        let template = runner.run(compilation).await?;
        Ok(DocumentBuild { template })
    }

    fn additional_assets(&self, state: &DocumentBuild, compilation: &mut Compilation) {
        debug!(
            files = state.template.file_dependencies.len(),
            "watching document template dependencies"
        );
        compilation.add_file_dependencies(state.template.file_dependencies.iter().cloned());
    }

    async fn emit(&self, state: DocumentBuild, compilation: &mut Compilation) -> Result<usize> {
        let result = self.render(&state, compilation);
        compilation.remove_asset(TEMP_FILE_NAME);
        result
    }
}
