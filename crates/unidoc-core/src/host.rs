//! Host build contracts.
//!
//! The document pipeline runs inside a larger bundling pipeline. This module
//! models what it consumes from that host: the read-only build configuration,
//! the compilation (artifact map, entrypoints, watched files, error list) and
//! the ability to spawn an isolated child build.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Failures raised by the host itself.
#[derive(Debug, Error)]
pub enum HostError {
    /// Writing an artifact failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A hook's work was interrupted before completing.
    #[error("build interrupted: {0}")]
    Interrupted(String),
}

/// Failure reported by a child build.
#[derive(Debug, Error)]
pub enum ChildBuildError {
    /// The child build could not compile its entry.
    #[error("failed to compile {}: {source}", .entry.display())]
    Compile {
        entry: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
        /// Files read before the failure.
        file_dependencies: BTreeSet<PathBuf>,
    },
}

impl ChildBuildError {
    /// Wrap a toolchain error raised while compiling `entry`.
    pub fn compile(
        entry: impl Into<PathBuf>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Compile {
            entry: entry.into(),
            source: Box::new(source),
            file_dependencies: BTreeSet::new(),
        }
    }

    /// Attach the files the child build read before failing.
    #[must_use]
    pub fn with_file_dependencies<I>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        match &mut self {
            Self::Compile {
                file_dependencies, ..
            } => file_dependencies.extend(files),
        }
        self
    }

    /// Files that must stay watched so a fix re-triggers the build.
    #[must_use]
    pub fn file_dependencies(&self) -> &BTreeSet<PathBuf> {
        match self {
            Self::Compile {
                file_dependencies, ..
            } => file_dependencies,
        }
    }
}

/// Read-only host build configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// Working directory requests are resolved against.
    pub context: PathBuf,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Module-resolution aliases (request prefix to replacement path).
    #[serde(default)]
    pub resolve_alias: BTreeMap<String, String>,
}

/// Host output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Output filename pattern, e.g. `web/[name].js`.
    #[serde(default = "default_filename")]
    pub filename: String,

    /// Public path prepended to asset URLs.
    #[serde(default = "default_public_path")]
    pub public_path: String,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("build")
}

fn default_filename() -> String {
    "[name].js".to_string()
}

fn default_public_path() -> String {
    "/".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_filename(),
            public_path: default_public_path(),
        }
    }
}

impl HostConfig {
    /// Create a configuration rooted at `context` with default output settings.
    pub fn new(context: impl Into<PathBuf>) -> Self {
        Self {
            context: context.into(),
            ..Self::default()
        }
    }

    /// Resolve a path against the host context.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.context.join(path)
        }
    }
}

/// Settings for an isolated child build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildBuildConfig {
    /// Name of the single entry.
    pub entry_name: String,

    /// Absolute entry file.
    pub entry: PathBuf,

    /// Working directory shared with the host.
    pub context: PathBuf,

    /// Output directory shared with the host. Child assets are returned in
    /// memory; the host decides when to write them below this directory.
    pub output_path: PathBuf,

    /// Fixed output filename.
    pub filename: String,

    /// Requests left unbundled, mapped to their runtime global name.
    pub externals: BTreeMap<String, String>,

    /// Aliases copied from the host.
    pub resolve_alias: BTreeMap<String, String>,
}

/// Result of a completed child build.
#[derive(Debug, Clone, Default)]
pub struct ChildCompilation {
    /// Emitted assets keyed by output filename.
    pub assets: BTreeMap<String, String>,

    /// Every file the child build read.
    pub file_dependencies: BTreeSet<PathBuf>,
}

/// Toolchain able to run an isolated child build.
pub trait ChildCompiler: Send + Sync {
    /// Compile `config.entry` with its own module registry.
    fn run_as_child(
        &self,
        config: &ChildBuildConfig,
    ) -> std::result::Result<ChildCompilation, ChildBuildError>;
}

/// One host build: its artifacts, entrypoints, watched files and errors.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    config: HostConfig,
    assets: BTreeMap<String, String>,
    entrypoints: BTreeMap<String, Vec<String>>,
    file_dependencies: BTreeSet<PathBuf>,
    errors: Vec<String>,
}

impl Compilation {
    /// Start a compilation for the given host configuration.
    #[must_use]
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Host configuration this compilation runs with.
    #[must_use]
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Record an entrypoint and its output files in emission order.
    pub fn add_entrypoint(&mut self, name: impl Into<String>, files: Vec<String>) {
        self.entrypoints.insert(name.into(), files);
    }

    /// Output files of an entrypoint, if it exists.
    #[must_use]
    pub fn entry_files(&self, name: &str) -> Option<&[String]> {
        self.entrypoints.get(name).map(Vec::as_slice)
    }

    /// Add or replace an artifact. Returns the previous content, if any.
    pub fn emit_asset(
        &mut self,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Option<String> {
        self.assets.insert(name.into(), content.into())
    }

    /// Remove an artifact from the output set.
    pub fn remove_asset(&mut self, name: &str) -> Option<String> {
        self.assets.remove(name)
    }

    /// Content of an artifact.
    #[must_use]
    pub fn asset(&self, name: &str) -> Option<&str> {
        self.assets.get(name).map(String::as_str)
    }

    /// All artifacts keyed by name.
    #[must_use]
    pub fn assets(&self) -> &BTreeMap<String, String> {
        &self.assets
    }

    /// Add files to the watched set.
    pub fn add_file_dependencies<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.file_dependencies.extend(files);
    }

    /// Files whose change invalidates this build.
    #[must_use]
    pub fn file_dependencies(&self) -> &BTreeSet<PathBuf> {
        &self.file_dependencies
    }

    /// Report an error through the host's error list.
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Errors reported so far.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Write every artifact below the output directory.
    pub fn write_assets(&self) -> std::result::Result<usize, HostError> {
        let output_dir = self.config.resolve(&self.config.output.path);

        for (name, content) in &self.assets {
            let path = output_dir.join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| HostError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&path, content).map_err(|source| HostError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "wrote artifact");
        }

        Ok(self.assets.len())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_output_defaults() {
        let config = HostConfig::new("/project");
        assert_eq!(config.output.filename, "[name].js");
        assert_eq!(config.output.public_path, "/");
        assert!(config.resolve_alias.is_empty());
    }

    #[test]
    fn test_resolve_against_context() {
        let config = HostConfig::new("/project");
        assert_eq!(
            config.resolve(Path::new("src/document.html")),
            PathBuf::from("/project/src/document.html")
        );
        assert_eq!(
            config.resolve(Path::new("/abs/document.html")),
            PathBuf::from("/abs/document.html")
        );
    }

    #[test]
    fn test_entry_files_preserve_order() {
        let mut compilation = Compilation::new(HostConfig::new("/project"));
        compilation.add_entrypoint(
            "index",
            vec!["web/index.css".to_string(), "web/index.js".to_string()],
        );

        assert_eq!(
            compilation.entry_files("index"),
            Some(&["web/index.css".to_string(), "web/index.js".to_string()][..])
        );
        assert!(compilation.entry_files("missing").is_none());
    }

    #[test]
    fn test_asset_map() {
        let mut compilation = Compilation::default();
        assert!(compilation.emit_asset("a.html", "one").is_none());
        assert_eq!(compilation.emit_asset("a.html", "two").as_deref(), Some("one"));
        assert_eq!(compilation.asset("a.html"), Some("two"));
        assert_eq!(compilation.remove_asset("a.html").as_deref(), Some("two"));
        assert!(compilation.assets().is_empty());
    }

    #[test]
    fn test_dependencies_and_errors() {
        let mut compilation = Compilation::default();
        compilation.add_file_dependencies([PathBuf::from("/a"), PathBuf::from("/b")]);
        compilation.add_file_dependencies([PathBuf::from("/a")]);
        compilation.push_error("boom");

        assert_eq!(compilation.file_dependencies().len(), 2);
        assert_eq!(compilation.errors(), ["boom".to_string()]);
    }

    #[test]
    fn test_write_assets() {
        let dir = TempDir::new().unwrap();
        let mut config = HostConfig::new(dir.path());
        config.output.path = PathBuf::from("dist");

        let mut compilation = Compilation::new(config);
        compilation.emit_asset("web/index.html", "<html></html>");
        compilation.emit_asset("index.js", "console.log(1)");

        let written = compilation.write_assets().unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            fs::read_to_string(dir.path().join("dist/web/index.html")).unwrap(),
            "<html></html>"
        );
        assert!(dir.path().join("dist/index.js").exists());
    }

    #[test]
    fn test_child_build_error_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ChildBuildError::compile("/project/document.html", io);
        let message = err.to_string();
        assert!(message.contains("/project/document.html"));
        assert!(message.contains("no such file"));
        assert!(err.file_dependencies().is_empty());
    }

    #[test]
    fn test_child_build_error_keeps_files_read() {
        let io = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad include");
        let err = ChildBuildError::compile("/project/document.html", io)
            .with_file_dependencies([PathBuf::from("/project/document.html")]);

        assert_eq!(
            err.file_dependencies().iter().collect::<Vec<_>>(),
            vec![&PathBuf::from("/project/document.html")]
        );
    }
}
