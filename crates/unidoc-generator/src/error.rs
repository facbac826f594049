//! Error types for the document pipeline.

use thiserror::Error;
use unidoc_core::{CoreError, HostError, component::RenderError, module::EvalError};

/// Result type alias using `DocumentError`.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Document pipeline errors. Every variant aborts the remaining document work.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Invalid plugin options or an unusable template.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration rejected while loading or validating.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The template's secondary build failed.
    #[error("secondary build failed: {0}")]
    SecondaryBuild(String),

    /// The compiled template could not be evaluated.
    #[error("failed to load document module: {0}")]
    Evaluation(#[from] EvalError),

    /// A host lifecycle failure, passed through unmodified.
    #[error(transparent)]
    Host(#[from] HostError),

    /// The UI rendering service failed for a page.
    #[error("failed to render page `{page}`: {source}")]
    Render {
        page: String,
        #[source]
        source: RenderError,
    },
}

impl DocumentError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Whether the failure stems from user configuration.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::Core(err) => err.is_configuration(),
            _ => false,
        }
    }
}
