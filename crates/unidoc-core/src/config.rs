//! Document plugin configuration management.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{CoreError, Result},
    page::PageDescriptor,
};

/// Doctype emitted when the configuration does not override it.
pub const DEFAULT_DOCTYPE: &str = "<!DOCTYPE html>";

/// Main configuration structure for the document plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Document template settings.
    pub document: DocumentConfig,

    /// Pages rendered from the template, in declaration order.
    #[serde(default)]
    pub pages: Vec<PageDescriptor>,
}

/// Document template settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentConfig {
    /// Template entry, relative to the host context.
    #[serde(default)]
    pub path: PathBuf,

    /// Overrides the host's public path when set.
    #[serde(default)]
    pub public_path: Option<String>,

    /// Doctype prefix: `false` disables it, `true` or absent keeps the default.
    #[serde(default)]
    pub doctype: Option<DoctypeSetting>,
}

/// Doctype setting as written by users.
///
/// The strings `"true"` and `"false"` read as switches, so environment
/// overrides behave like their TOML counterparts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DoctypeSetting {
    /// `true` keeps the default declaration, `false` emits none.
    Enabled(bool),

    /// Custom declaration emitted verbatim.
    Custom(String),
}

impl<'de> Deserialize<'de> for DoctypeSetting {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Switch(bool),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Switch(enabled) => Self::Enabled(enabled),
            Raw::Text(text) => match text.as_str() {
                "true" => Self::Enabled(true),
                "false" => Self::Enabled(false),
                _ => Self::Custom(text),
            },
        })
    }
}

impl DocumentConfig {
    /// Create settings for a template entry with default options.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            public_path: None,
            doctype: None,
        }
    }

    /// Resolve the doctype prefix prepended to every rendered page.
    #[must_use]
    pub fn doctype_prefix(&self) -> String {
        match &self.doctype {
            None | Some(DoctypeSetting::Enabled(true)) => DEFAULT_DOCTYPE.to_string(),
            Some(DoctypeSetting::Enabled(false)) => String::new(),
            Some(DoctypeSetting::Custom(custom)) => custom.clone(),
        }
    }
}

impl Config {
    /// Create a configuration from its parts and validate it.
    pub fn new(document: DocumentConfig, pages: Vec<PageDescriptor>) -> Result<Self> {
        let config = Self { document, pages };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration using the config crate, layering `UNIDOC__*` variables.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        Self::load_layered(path, None)
    }

    fn load_layered(path: &Path, env: Option<config::Map<String, String>>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix("UNIDOC")
                    .separator("__")
                    .source(env),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.document.path.as_os_str().is_empty() {
            return Err(CoreError::MissingTemplatePath);
        }

        let mut seen = HashSet::new();
        for page in &self.pages {
            if !seen.insert(page.entry_name.as_str()) {
                return Err(CoreError::DuplicateEntry(page.entry_name.clone()));
            }
        }

        if self.pages.is_empty() {
            tracing::warn!("no pages declared, the document template will not be rendered");
        }

        Ok(())
    }
}
