//! Host pipeline hooks and the driver that runs them.

use std::{future::Future, time::Instant};

use tracing::info;
use unidoc_core::Compilation;

use crate::error::Result;

/// A stage plugged into the host build pipeline.
///
/// Each hook runs once per build, in host order: [`make`](Plugin::make),
/// [`additional_assets`](Plugin::additional_assets), [`emit`](Plugin::emit).
/// Whatever `make` produces is carried to the later hooks as build-scoped state.
pub trait Plugin: Send + Sync {
    /// Per-build state created by `make`.
    type State: Send;

    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Prepare the build. A failure aborts the remaining hooks.
    fn make(
        &self,
        compilation: &mut Compilation,
    ) -> impl Future<Output = Result<Self::State>> + Send;

    /// Contribute to the compilation after chunk assets are known.
    fn additional_assets(&self, state: &Self::State, compilation: &mut Compilation);

    /// Produce final artifacts. Returns the number registered.
    fn emit(
        &self,
        state: Self::State,
        compilation: &mut Compilation,
    ) -> impl Future<Output = Result<usize>> + Send;
}

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Number of artifacts the plugin registered.
    pub artifacts: usize,

    /// Number of files the compilation watches.
    pub file_dependencies: usize,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

/// Run every hook of `plugin` against `compilation` in host order.
pub async fn run_build<P: Plugin>(plugin: &P, compilation: &mut Compilation) -> Result<BuildStats> {
    let start = Instant::now();
    info!(plugin = plugin.name(), "starting build");

    let state = plugin.make(compilation).await?;
    plugin.additional_assets(&state, compilation);
    let artifacts = plugin.emit(state, compilation).await?;

    let stats = BuildStats {
        artifacts,
        file_dependencies: compilation.file_dependencies().len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        plugin = plugin.name(),
        artifacts = stats.artifacts,
        file_dependencies = stats.file_dependencies,
        duration_ms = stats.duration_ms,
        "build complete"
    );

    Ok(stats)
}
