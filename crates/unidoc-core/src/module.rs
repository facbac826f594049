//! Typed module records.
//!
//! A compiled template is not imported statically. A [`ModuleEvaluator`] turns
//! its text into an [`ExportRecord`] through a [`ModuleScope`] that exposes only
//! a [`ModuleResolver`] and the record being filled.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::component::ComponentRef;

/// Module evaluation errors.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The module text is not a valid module record.
    #[error("malformed module: {0}")]
    Malformed(String),

    /// A required module is not available at runtime.
    #[error("cannot find module `{0}`")]
    ModuleNotFound(String),

    /// A required module has no such export.
    #[error("module `{module}` has no export `{export}`")]
    MissingExport { module: String, export: String },

    /// A value was used as a component but is not one.
    #[error("`{0}` is not a component")]
    NotAComponent(String),
}

/// Result type for module evaluation.
pub type Result<T> = std::result::Result<T, EvalError>;

/// A value exported by a module.
#[derive(Debug, Clone)]
pub enum ExportValue {
    /// A renderable component.
    Component(ComponentRef),

    /// A nested record, e.g. a whole required module.
    Record(ExportRecord),

    /// A plain string.
    Text(String),

    /// A plain boolean.
    Flag(bool),
}

impl ExportValue {
    /// The component, if this value is one.
    #[must_use]
    pub fn as_component(&self) -> Option<&ComponentRef> {
        match self {
            Self::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Short description of the value's kind for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Component(_) => "component",
            Self::Record(_) => "record",
            Self::Text(_) => "text",
            Self::Flag(_) => "flag",
        }
    }
}

/// Exports of a module.
///
/// The ES-module interop flag is a signal kept beside the own keys, so a module
/// that sets only the flag still counts as exporting nothing.
#[derive(Debug, Clone, Default)]
pub struct ExportRecord {
    entries: BTreeMap<String, ExportValue>,
    es_module: bool,
}

impl ExportRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an export.
    pub fn insert(&mut self, key: impl Into<String>, value: ExportValue) {
        self.entries.insert(key.into(), value);
    }

    /// Look up an export.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExportValue> {
        self.entries.get(key)
    }

    /// Remove and return an export.
    pub fn take(&mut self, key: &str) -> Option<ExportValue> {
        self.entries.remove(key)
    }

    /// Number of own keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record has no own keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Own keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Mark the record as produced by an ES module.
    pub fn set_es_module(&mut self, es_module: bool) {
        self.es_module = es_module;
    }

    /// Whether the record signals ES-module interop.
    #[must_use]
    pub fn is_es_module(&self) -> bool {
        self.es_module
    }
}

/// The host runtime's `require`.
pub trait ModuleResolver: Send + Sync {
    /// Resolve a request to the module's exports.
    fn require(&self, request: &str) -> Result<ExportValue>;
}

/// The only bindings visible to evaluated module text.
pub struct ModuleScope<'a> {
    resolver: &'a dyn ModuleResolver,
    exports: ExportRecord,
}

impl<'a> ModuleScope<'a> {
    /// Create a scope with an empty export record.
    pub fn new(resolver: &'a dyn ModuleResolver) -> Self {
        Self {
            resolver,
            exports: ExportRecord::new(),
        }
    }

    /// Resolve a runtime module.
    pub fn require(&self, request: &str) -> Result<ExportValue> {
        self.resolver.require(request)
    }

    /// Mutable access to the module's exports.
    pub fn exports_mut(&mut self) -> &mut ExportRecord {
        &mut self.exports
    }

    /// Finish evaluation and hand back the exports.
    #[must_use]
    pub fn into_exports(self) -> ExportRecord {
        self.exports
    }
}

/// Executes compiled module text against a scope.
pub trait ModuleEvaluator: Send + Sync {
    /// Evaluate `source`, writing its exports into `scope`.
    fn evaluate(&self, source: &str, scope: &mut ModuleScope<'_>) -> Result<()>;
}
