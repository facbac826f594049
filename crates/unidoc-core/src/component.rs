//! Component contracts for the UI rendering service.
//!
//! Document data reaches components as explicit [`DocumentProps`]; a component
//! that renders children passes the same props down.

use std::{fmt, sync::Arc};

use serde::Serialize;
use thiserror::Error;

use crate::page::AssetManifest;

/// Rendering errors.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A component failed while rendering.
    #[error("component `{component}` failed to render: {message}")]
    Component { component: String, message: String },
}

impl RenderError {
    /// Create a component failure.
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Result type for rendering.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Page data available to a document while it renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentProps {
    /// Stylesheet URLs for the page.
    pub styles: Vec<String>,

    /// Script URLs for the page.
    pub scripts: Vec<String>,

    /// URL path the page is served at.
    pub page_path: String,
}

impl DocumentProps {
    /// Build props from a page's manifest and path.
    pub fn new(manifest: AssetManifest, page_path: impl Into<String>) -> Self {
        Self {
            styles: manifest.styles,
            scripts: manifest.scripts,
            page_path: page_path.into(),
        }
    }
}

/// A renderable document component.
pub trait DocumentComponent: fmt::Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Render the component to markup.
    fn render(&self, props: &DocumentProps) -> Result<String>;
}

/// Shared handle to a component.
pub type ComponentRef = Arc<dyn DocumentComponent>;

/// A component paired with the props it renders with.
#[derive(Debug, Clone)]
pub struct Element {
    /// Component type.
    pub component: ComponentRef,

    /// Props passed to it.
    pub props: DocumentProps,
}

/// The UI rendering service.
pub trait RenderService: Send + Sync {
    /// Construct an element from a component type and its props.
    fn create_element(&self, component: ComponentRef, props: DocumentProps) -> Element {
        Element { component, props }
    }

    /// Render an element synchronously to a markup string.
    fn render_to_string(&self, element: &Element) -> Result<String>;
}
