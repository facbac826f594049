//! unidoc Toolchain Library
//!
//! Reference implementations of the services the document pipeline calls into.
//!
//! # Modules
//!
//! - [`template`] - Template syntax with variables and partials
//! - [`bundler`] - Isolated child build that compiles a template entry
//! - [`record`] - Serialized module record emitted by the bundler
//! - [`evaluator`] - Turns module records into exports without executing code
//! - [`runtime`] - Host runtime module table (`require`)
//! - [`components`] - Template components and the `kit` UI library
//! - [`renderer`] - Static markup renderer

pub mod bundler;
pub mod components;
pub mod evaluator;
pub mod record;
pub mod renderer;
pub mod runtime;
pub mod template;

use std::sync::Arc;

pub use bundler::{BundleError, TemplateBundler};
pub use components::{Scripts, Styles, TemplateComponent};
pub use evaluator::JsonModuleEvaluator;
pub use record::{ExportDecl, ModuleRecord};
pub use renderer::StaticRenderer;
pub use runtime::RuntimeModules;
pub use template::{Template, TemplateContext, TemplateError};
use unidoc_core::Services;

/// Services backed by this toolchain, with the `kit` library available at runtime.
#[must_use]
pub fn services() -> Services {
    services_with_runtime(RuntimeModules::with_kit())
}

/// Services backed by this toolchain with a custom runtime module table.
#[must_use]
pub fn services_with_runtime(runtime: RuntimeModules) -> Services {
    Services {
        compiler: Arc::new(TemplateBundler::new()),
        evaluator: Arc::new(JsonModuleEvaluator::new()),
        resolver: Arc::new(runtime),
        renderer: Arc::new(StaticRenderer::new()),
    }
}
