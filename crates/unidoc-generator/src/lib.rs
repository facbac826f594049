//! unidoc Generator Library
//!
//! Renders a user-authored document template into one static HTML page per
//! declared entry, inside a host bundler build.
//!
//! # Modules
//!
//! - [`assets`] - Script/style manifest for a page
//! - [`path`] - Output path helpers
//! - [`sub_build`] - Secondary build of the document template
//! - [`loader`] - Turns the compiled template into a component
//! - [`render`] - Per-page HTML rendering
//! - [`lifecycle`] - Host pipeline hooks and driver
//! - [`plugin`] - Build orchestration
//! - [`fallback`] - Dev-server history fallback

pub mod assets;
pub mod error;
pub mod fallback;
pub mod lifecycle;
pub mod loader;
pub mod path;
pub mod plugin;
pub mod render;
pub mod sub_build;

pub use assets::resolve_assets;
pub use error::{DocumentError, Result};
pub use fallback::HistoryFallback;
pub use lifecycle::{BuildStats, Plugin, run_build};
pub use loader::{EMPTY_EXPORTS_MESSAGE, load_document};
pub use path::derive_prefix;
pub use plugin::{DocumentBuild, DocumentPlugin};
pub use render::PageRenderer;
pub use sub_build::{CompiledTemplate, SubBuildRunner, TEMP_FILE_NAME};
