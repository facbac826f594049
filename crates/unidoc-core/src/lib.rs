//! unidoc Core Library
//!
//! Core types, host contracts, configuration, and error handling for the
//! unidoc document synthesis stage.

pub mod component;
pub mod config;
pub mod error;
pub mod host;
pub mod module;
pub mod page;
pub mod services;

pub use component::{ComponentRef, DocumentComponent, DocumentProps, Element, RenderService};
pub use config::{Config, DocumentConfig, DoctypeSetting};
pub use error::{CoreError, Result};
pub use host::{
    ChildBuildConfig, ChildBuildError, ChildCompilation, ChildCompiler, Compilation, HostConfig,
    HostError, OutputConfig,
};
pub use module::{ExportRecord, ExportValue, ModuleEvaluator, ModuleResolver, ModuleScope};
pub use page::{AssetManifest, PageDescriptor, RenderedArtifact};
pub use services::Services;

/// Request name of the UI component library shared between templates and the host runtime.
pub const UI_LIBRARY: &str = "kit";
