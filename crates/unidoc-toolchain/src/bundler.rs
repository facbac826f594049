//! Template bundler used for isolated child builds.
//!
//! Compiles a document template entry into a single [`ModuleRecord`] asset:
//! includes (`{{> request }}`) are inlined recursively, requests whose first
//! segment is an external are left in place for the runtime, and every file
//! read is recorded so the host can watch it.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Component, Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use unidoc_core::{ChildBuildConfig, ChildBuildError, ChildCompilation, ChildCompiler};

use crate::{
    record::{ExportDecl, ModuleRecord},
    template::{TagKind, TemplateError, parse_tags},
};

/// Extension tried when a request does not name an existing file.
const DEFAULT_EXTENSION: &str = "html";

/// Bundling errors.
#[derive(Debug, Error)]
pub enum BundleError {
    /// A file could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An include request did not resolve to a file.
    #[error("cannot resolve `{request}` from {}", .issuer.display())]
    Unresolved { request: String, issuer: PathBuf },

    /// Includes form a cycle.
    #[error("include cycle: {}", format_cycle(.0))]
    Cycle(Vec<PathBuf>),

    /// Template syntax error in a file.
    #[error("syntax error in {}: {source}", .path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    /// The module record could not be serialized.
    #[error("cannot serialize module record: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn format_cycle(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result type for bundling.
pub type Result<T> = std::result::Result<T, BundleError>;

/// State of one bundling run; nothing is shared between runs.
#[derive(Debug, Default)]
struct BundleState {
    file_dependencies: BTreeSet<PathBuf>,
    stack: Vec<PathBuf>,
}

/// Compiles document templates into module records.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateBundler;

impl TemplateBundler {
    /// Create a bundler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Bundle `config.entry` into a child compilation.
    pub fn bundle(&self, config: &ChildBuildConfig) -> Result<ChildCompilation> {
        self.bundle_with(config, &mut BundleState::default())
    }

    fn bundle_with(
        &self,
        config: &ChildBuildConfig,
        state: &mut BundleState,
    ) -> Result<ChildCompilation> {
        info!(
            entry = %config.entry.display(),
            name = %config.entry_name,
            output = %config.output_path.display(),
            "bundling document template"
        );

        let source = self.inline_file(&config.entry, config, state)?;

        let mut record = ModuleRecord {
            es_module: true,
            externals: config.externals.clone(),
            exports: BTreeMap::new(),
        };
        if !source.trim().is_empty() {
            record.exports.insert(
                "default".to_string(),
                ExportDecl::Template {
                    name: config.entry_name.clone(),
                    source,
                },
            );
        }

        let mut assets = BTreeMap::new();
        assets.insert(config.filename.clone(), serde_json::to_string_pretty(&record)?);

        debug!(
            files = state.file_dependencies.len(),
            asset = %config.filename,
            "template bundled"
        );

        Ok(ChildCompilation {
            assets,
            file_dependencies: std::mem::take(&mut state.file_dependencies),
        })
    }

    /// Read a file and inline its includes.
    fn inline_file(
        &self,
        path: &Path,
        config: &ChildBuildConfig,
        state: &mut BundleState,
    ) -> Result<String> {
        let path = &normalize(path);
        if state.stack.iter().any(|p| p == path) {
            let mut cycle = state.stack.clone();
            cycle.push(path.to_path_buf());
            return Err(BundleError::Cycle(cycle));
        }

        let content = fs::read_to_string(path).map_err(|source| BundleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        state.file_dependencies.insert(path.to_path_buf());

        let tags = parse_tags(&content).map_err(|source| BundleError::Syntax {
            path: path.to_path_buf(),
            source,
        })?;

        state.stack.push(path.to_path_buf());

        let mut output = String::with_capacity(content.len());
        let mut pos = 0;
        for tag in tags.iter().filter(|t| t.kind == TagKind::Partial) {
            if is_external(&tag.name, &config.externals) {
                continue;
            }

            let included = self.resolve(&tag.name, path, config)?;
            debug!(request = %tag.name, file = %included.display(), "inlining include");
            let inlined = self.inline_file(&included, config, state)?;

            output.push_str(&content[pos..tag.span.start]);
            output.push_str(&inlined);
            pos = tag.span.end;
        }
        output.push_str(&content[pos..]);

        state.stack.pop();
        Ok(output)
    }

    /// Resolve an include request to a file.
    ///
    /// Aliased and bare requests resolve against the context; `./` and `../`
    /// requests resolve against the including file.
    fn resolve(&self, request: &str, issuer: &Path, config: &ChildBuildConfig) -> Result<PathBuf> {
        let candidate = match apply_alias(request, &config.resolve_alias) {
            Some(aliased) => config.context.join(aliased),
            None if request.starts_with("./") || request.starts_with("../") => issuer
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(request),
            None => config.context.join(request),
        };

        if candidate.is_file() {
            return Ok(candidate);
        }

        let with_extension = candidate.with_extension(DEFAULT_EXTENSION);
        if candidate.extension().is_none() && with_extension.is_file() {
            return Ok(with_extension);
        }

        Err(BundleError::Unresolved {
            request: request.to_string(),
            issuer: issuer.to_path_buf(),
        })
    }
}

impl ChildCompiler for TemplateBundler {
    fn run_as_child(
        &self,
        config: &ChildBuildConfig,
    ) -> std::result::Result<ChildCompilation, ChildBuildError> {
        let mut state = BundleState::default();
        self.bundle_with(config, &mut state).map_err(|e| {
            // The entry stays watched even when it could not be read.
            let mut files = std::mem::take(&mut state.file_dependencies);
            files.insert(normalize(&config.entry));
            ChildBuildError::compile(&config.entry, e).with_file_dependencies(files)
        })
    }
}

/// Lexically remove `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Whether a request targets an external library.
fn is_external(request: &str, externals: &BTreeMap<String, String>) -> bool {
    let library = request.split('/').next().unwrap_or(request);
    externals.contains_key(library)
}

/// Substitute the longest matching alias prefix.
fn apply_alias(request: &str, aliases: &BTreeMap<String, String>) -> Option<String> {
    aliases
        .iter()
        .filter(|(key, _)| {
            request == key.as_str()
                || request
                    .strip_prefix(key.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
        .max_by_key(|(key, _)| key.len())
        .map(|(key, target)| format!("{target}{}", &request[key.len()..]))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn config(context: &Path, entry: &str) -> ChildBuildConfig {
        let mut externals = BTreeMap::new();
        externals.insert("kit".to_string(), "kit".to_string());

        ChildBuildConfig {
            entry_name: "document".to_string(),
            entry: context.join(entry),
            context: context.to_path_buf(),
            output_path: context.join("build"),
            filename: "_document.module.json".to_string(),
            externals,
            resolve_alias: BTreeMap::new(),
        }
    }

    fn record_of(compilation: &ChildCompilation) -> ModuleRecord {
        let text = compilation
            .assets
            .get("_document.module.json")
            .expect("module asset emitted");
        serde_json::from_str(text).unwrap()
    }

    fn template_source(record: &ModuleRecord) -> &str {
        match record.exports.get("default") {
            Some(ExportDecl::Template { source, .. }) => source,
            other => panic!("expected template export, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_alias() {
        let mut aliases = BTreeMap::new();
        aliases.insert("@".to_string(), "src".to_string());
        aliases.insert("@/components".to_string(), "shared/components".to_string());

        assert_eq!(apply_alias("@/page.html", &aliases).as_deref(), Some("src/page.html"));
        assert_eq!(
            apply_alias("@/components/head.html", &aliases).as_deref(),
            Some("shared/components/head.html")
        );
        assert_eq!(apply_alias("@", &aliases).as_deref(), Some("src"));
        assert!(apply_alias("@scope/pkg", &aliases).is_none());
        assert!(apply_alias("./local.html", &aliases).is_none());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize(Path::new("/site/src/./document/../components/head.html")),
            PathBuf::from("/site/src/components/head.html")
        );
        assert_eq!(normalize(Path::new("../shared")), PathBuf::from("../shared"));
        assert_eq!(normalize(Path::new("../../shared")), PathBuf::from("../../shared"));
    }

    #[test]
    fn test_is_external() {
        let mut externals = BTreeMap::new();
        externals.insert("kit".to_string(), "kit".to_string());

        assert!(is_external("kit", &externals));
        assert!(is_external("kit/scripts", &externals));
        assert!(!is_external("kitchen/sink", &externals));
    }

    #[test]
    fn test_bundle_inlines_includes_and_tracks_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/document")).unwrap();
        fs::create_dir_all(root.join("src/components")).unwrap();
        fs::write(
            root.join("src/document/index.html"),
            "<html>{{> ./head }}<body>{{> @components/footer.html }}{{> kit/scripts }}</body></html>",
        )
        .unwrap();
        fs::write(root.join("src/document/head.html"), "<head>{{> kit/styles }}</head>").unwrap();
        fs::write(root.join("src/components/footer.html"), "<footer>{{ page_path }}</footer>").unwrap();

        let mut config = config(root, "src/document/index.html");
        config
            .resolve_alias
            .insert("@components".to_string(), "src/components".to_string());

        let compilation = TemplateBundler::new().run_as_child(&config).unwrap();
        let record = record_of(&compilation);

        assert!(record.es_module);
        assert_eq!(
            template_source(&record),
            "<html><head>{{> kit/styles }}</head><body><footer>{{ page_path }}</footer>{{> kit/scripts }}</body></html>"
        );
        assert_eq!(compilation.file_dependencies.len(), 3);
        assert!(compilation
            .file_dependencies
            .contains(&root.join("src/document/head.html")));
        assert!(compilation
            .file_dependencies
            .contains(&root.join("src/components/footer.html")));
        assert_eq!(compilation.assets.len(), 1);
    }

    #[test]
    fn test_bundle_empty_template_exports_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("document.html"), "  \n").unwrap();

        let compilation = TemplateBundler::new()
            .bundle(&config(dir.path(), "document.html"))
            .unwrap();
        let record = record_of(&compilation);

        assert!(record.exports.is_empty());
        assert_eq!(compilation.file_dependencies.len(), 1);
    }

    #[test]
    fn test_bundle_missing_include() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("document.html"), "{{> ./missing.html }}").unwrap();

        let result = TemplateBundler::new().bundle(&config(dir.path(), "document.html"));
        assert!(matches!(
            result,
            Err(BundleError::Unresolved { request, .. }) if request == "./missing.html"
        ));
    }

    #[test]
    fn test_bundle_detects_cycles() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("document.html"), "{{> ./a.html }}").unwrap();
        fs::write(dir.path().join("a.html"), "{{> ./document.html }}").unwrap();

        let result = TemplateBundler::new().bundle(&config(dir.path(), "document.html"));
        match result {
            Err(BundleError::Cycle(files)) => assert_eq!(files.len(), 3),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_entry_surfaces_as_child_build_error() {
        let dir = TempDir::new().unwrap();
        let config = config(dir.path(), "nope.html");

        let err = TemplateBundler::new().run_as_child(&config).unwrap_err();
        assert!(err.to_string().contains("nope.html"));
        assert!(err.file_dependencies().contains(&dir.path().join("nope.html")));
    }

    #[test]
    fn test_failed_build_reports_files_read() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("document.html"), "<html>{{> ./head.html }}</html>").unwrap();
        fs::write(dir.path().join("head.html"), "<head>{{ broken").unwrap();

        let err = TemplateBundler::new()
            .run_as_child(&config(dir.path(), "document.html"))
            .unwrap_err();

        assert!(err.to_string().contains("head.html"));
        assert_eq!(err.file_dependencies().len(), 2);
        assert!(err.file_dependencies().contains(&dir.path().join("head.html")));
    }

    #[test]
    fn test_syntax_error_reports_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("document.html"), "<html>{{ broken").unwrap();

        let err = TemplateBundler::new()
            .bundle(&config(dir.path(), "document.html"))
            .unwrap_err();
        assert!(matches!(err, BundleError::Syntax { .. }));
        assert!(err.to_string().contains("document.html"));
    }
}
