//! Document template language.
//!
//! A lightweight interpolation syntax rather than a full template engine:
//!
//! - `{{ name }}` inserts a required variable,
//! - `{{ name? }}` inserts an optional variable (empty when unset),
//! - `{{> request }}` inserts a partial.

use std::{collections::HashMap, ops::Range};

use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Partial referenced but not provided.
    #[error("missing partial: {0}")]
    MissingPartial(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Kind of a template tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `{{ name }}`
    Variable,
    /// `{{ name? }}`
    Optional,
    /// `{{> request }}`
    Partial,
}

/// A tag found in template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag kind.
    pub kind: TagKind,

    /// Variable name or partial request.
    pub name: String,

    /// Byte range of the whole tag, delimiters included.
    pub span: Range<usize>,
}

/// Scan `content` for tags in source order.
pub fn parse_tags(content: &str) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    let mut pos = 0;

    while let Some(start) = content[pos..].find("{{") {
        let start = pos + start;
        let end = content[start..]
            .find("}}")
            .ok_or_else(|| TemplateError::InvalidSyntax("unclosed {{ delimiter".to_string()))?;
        let end = start + end + 2;

        let inner = content[start + 2..end - 2].trim();
        let (kind, name) = if let Some(request) = inner.strip_prefix('>') {
            (TagKind::Partial, request.trim())
        } else if let Some(stripped) = inner.strip_suffix('?') {
            (TagKind::Optional, stripped.trim())
        } else {
            (TagKind::Variable, inner)
        };

        if name.is_empty() {
            return Err(TemplateError::InvalidSyntax(format!(
                "empty tag at byte {start}"
            )));
        }

        tags.push(Tag {
            kind,
            name: name.to_string(),
            span: start..end,
        });
        pos = end;
    }

    Ok(tags)
}

/// Template context with variables and pre-rendered partials.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
    partials: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable into the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Create context with initial variables.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Check if a variable exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// Provide the markup a partial expands to.
    pub fn insert_partial(&mut self, request: impl Into<String>, markup: impl Into<String>) {
        self.partials.insert(request.into(), markup.into());
    }

    /// Markup for a partial.
    #[must_use]
    pub fn partial(&self, request: &str) -> Option<&str> {
        self.partials.get(request).map(String::as_str)
    }
}

/// A parsed template.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
    tags: Vec<Tag>,
}

impl Template {
    /// Parse a template with the given name and content.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Result<Self> {
        let content = content.into();
        let tags = parse_tags(&content)?;
        Ok(Self {
            name: name.into(),
            content,
            tags,
        })
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct partial requests in first-use order.
    #[must_use]
    pub fn partials(&self) -> Vec<&str> {
        let mut requests: Vec<&str> = Vec::new();
        for tag in self.tags.iter().filter(|t| t.kind == TagKind::Partial) {
            if !requests.contains(&tag.name.as_str()) {
                requests.push(&tag.name);
            }
        }
        requests
    }

    /// Render the template with the given context.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut result = String::with_capacity(self.content.len());
        let mut pos = 0;

        for tag in &self.tags {
            result.push_str(&self.content[pos..tag.span.start]);

            let value = match tag.kind {
                TagKind::Variable => context
                    .get(&tag.name)
                    .ok_or_else(|| TemplateError::MissingVariable(tag.name.clone()))?,
                TagKind::Optional => context.get(&tag.name).unwrap_or_default(),
                TagKind::Partial => context
                    .partial(&tag.name)
                    .ok_or_else(|| TemplateError::MissingPartial(tag.name.clone()))?,
            };

            result.push_str(value);
            pos = tag.span.end;
        }

        result.push_str(&self.content[pos..]);
        Ok(result)
    }
}
