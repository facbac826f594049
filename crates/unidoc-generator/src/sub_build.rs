//! Secondary build of the document template.
//!
//! The template is compiled by an isolated child build that shares the host's
//! context, aliases and output directory but has its own module registry and a
//! single `document` entry.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, error, info};
use unidoc_core::{
    ChildBuildConfig, ChildCompilation, ChildCompiler, Compilation, HostConfig, HostError,
    UI_LIBRARY,
};

use crate::error::{DocumentError, Result};

/// Entry name forced on the secondary build.
pub const DOCUMENT_ENTRY: &str = "document";

/// Temporary artifact holding the compiled template.
pub const TEMP_FILE_NAME: &str = "_document.module.json";

/// Compiled template text and the files the secondary build read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledTemplate {
    /// Module text handed to the loader.
    pub source: String,

    /// Every file consulted while compiling the template.
    pub file_dependencies: BTreeSet<PathBuf>,
}

/// Runs the template's secondary build for one host build.
pub struct SubBuildRunner {
    compiler: Arc<dyn ChildCompiler>,
    config: ChildBuildConfig,
}

impl SubBuildRunner {
    /// Prepare a secondary build of `template_path` using the host's settings.
    pub fn new(compiler: Arc<dyn ChildCompiler>, host: &HostConfig, template_path: &Path) -> Self {
        Self {
            compiler,
            config: child_build_config(host, template_path),
        }
    }

    /// Settings the child build runs with.
    #[must_use]
    pub fn config(&self) -> &ChildBuildConfig {
        &self.config
    }

    /// Run the child build to completion on the blocking pool.
    ///
    /// The child's assets are merged into `compilation`. On failure the error is
    /// also pushed to the host's error list, and the files read so far are
    /// watched so fixing the template re-triggers the build.
    pub async fn run(&self, compilation: &mut Compilation) -> Result<CompiledTemplate> {
        info!(entry = %self.config.entry.display(), "starting document sub-build");

        let compiler = Arc::clone(&self.compiler);
        let config = self.config.clone();
        let result = tokio::task::spawn_blocking(move || compiler.run_as_child(&config))
            .await
            .map_err(|e| HostError::Interrupted(e.to_string()))?;

        let child = match result {
            Ok(child) => child,
            Err(e) => {
                compilation.add_file_dependencies(e.file_dependencies().iter().cloned());
                return Err(report(compilation, e.to_string()));
            }
        };

        self.capture(child, compilation)
    }

    fn capture(
        &self,
        child: ChildCompilation,
        compilation: &mut Compilation,
    ) -> Result<CompiledTemplate> {
        let Some(source) = child.assets.get(&self.config.filename).cloned() else {
            compilation.add_file_dependencies(child.file_dependencies);
            return Err(report(
                compilation,
                format!("child build did not emit {}", self.config.filename),
            ));
        };

        for (name, content) in child.assets {
            debug!(asset = %name, "merging child asset");
            compilation.emit_asset(name, content);
        }

        debug!(
            files = child.file_dependencies.len(),
            "document sub-build complete"
        );

        Ok(CompiledTemplate {
            source,
            file_dependencies: child.file_dependencies,
        })
    }
}

impl std::fmt::Debug for SubBuildRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubBuildRunner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Settings for the template's child build.
#[must_use]
pub fn child_build_config(host: &HostConfig, template_path: &Path) -> ChildBuildConfig {
    let mut externals = BTreeMap::new();
    externals.insert(UI_LIBRARY.to_string(), UI_LIBRARY.to_string());

    ChildBuildConfig {
        entry_name: DOCUMENT_ENTRY.to_string(),
        entry: host.resolve(template_path),
        context: host.context.clone(),
        output_path: host.resolve(&host.output.path),
        filename: TEMP_FILE_NAME.to_string(),
        externals,
        resolve_alias: host.resolve_alias.clone(),
    }
}

fn report(compilation: &mut Compilation, message: String) -> DocumentError {
    error!(error = %message, "document sub-build failed");
    compilation.push_error(message.clone());
    DocumentError::SecondaryBuild(message)
}
