//! Static markup renderer.

use tracing::debug;
use unidoc_core::{Element, RenderService, component::Result};

/// Renders elements to markup in one synchronous pass.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticRenderer;

impl StaticRenderer {
    /// Create a renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RenderService for StaticRenderer {
    fn render_to_string(&self, element: &Element) -> Result<String> {
        debug!(
            component = element.component.name(),
            page = %element.props.page_path,
            "rendering element"
        );
        element.component.render(&element.props)
    }
}
