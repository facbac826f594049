//! Module evaluator for bundler output.
//!
//! Reads a serialized [`ModuleRecord`] and fills the scope's export record.
//! Nothing is executed: templates become [`TemplateComponent`]s and every
//! external is obtained through the scope's `require`.

use std::{collections::BTreeMap, sync::Arc};

use tracing::debug;
use unidoc_core::{
    ComponentRef, ExportValue, ModuleEvaluator, ModuleScope,
    module::{EvalError, Result},
};

use crate::{
    components::TemplateComponent,
    record::{ExportDecl, ModuleRecord},
    template::Template,
};

/// Evaluates JSON module records.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonModuleEvaluator;

impl JsonModuleEvaluator {
    /// Create an evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn evaluate_decl(
        &self,
        decl: ExportDecl,
        record: &ModuleRecord,
        scope: &ModuleScope<'_>,
    ) -> Result<ExportValue> {
        match decl {
            ExportDecl::Template { name, source } => {
                let template =
                    Template::new(name, source).map_err(|e| EvalError::Malformed(e.to_string()))?;

                let mut partials = BTreeMap::new();
                for request in template.partials() {
                    let component = bind_partial(request, record, scope)?;
                    partials.insert(request.to_string(), component);
                }

                Ok(ExportValue::Component(Arc::new(TemplateComponent::new(
                    template, partials,
                ))))
            }
            ExportDecl::External { request } => {
                let global = record.externals.get(&request).ok_or_else(|| {
                    EvalError::Malformed(format!("`{request}` is not declared as an external"))
                })?;
                scope.require(global)
            }
            ExportDecl::Text { value } => Ok(ExportValue::Text(value)),
            ExportDecl::Flag { value } => Ok(ExportValue::Flag(value)),
        }
    }
}

/// Resolve a partial request (`library` or `library/member`) to a component.
fn bind_partial(
    request: &str,
    record: &ModuleRecord,
    scope: &ModuleScope<'_>,
) -> Result<ComponentRef> {
    let (library, member) = match request.split_once('/') {
        Some((library, member)) => (library, Some(member)),
        None => (request, None),
    };

    let global = record.externals.get(library).ok_or_else(|| {
        EvalError::Malformed(format!("partial `{request}` was neither inlined nor external"))
    })?;

    let exports = scope.require(global)?;
    let value = match member {
        None => exports,
        Some(member) => match exports {
            ExportValue::Record(mut record) => {
                record.take(member).ok_or_else(|| EvalError::MissingExport {
                    module: library.to_string(),
                    export: member.to_string(),
                })?
            }
            _ => {
                return Err(EvalError::MissingExport {
                    module: library.to_string(),
                    export: member.to_string(),
                });
            }
        },
    };

    match value {
        ExportValue::Component(component) => Ok(component),
        _ => Err(EvalError::NotAComponent(request.to_string())),
    }
}

impl ModuleEvaluator for JsonModuleEvaluator {
    fn evaluate(&self, source: &str, scope: &mut ModuleScope<'_>) -> Result<()> {
        let record: ModuleRecord =
            serde_json::from_str(source).map_err(|e| EvalError::Malformed(e.to_string()))?;

        let mut exports = Vec::with_capacity(record.exports.len());
        for (key, decl) in record.exports.clone() {
            let value = self.evaluate_decl(decl, &record, scope)?;
            exports.push((key, value));
        }

        let target = scope.exports_mut();
        target.set_es_module(record.es_module);
        for (key, value) in exports {
            debug!(export = %key, kind = value.kind(), "bound export");
            target.insert(key, value);
        }

        Ok(())
    }
}
