//! Loading the compiled template as a component.

use tracing::debug;
use unidoc_core::{
    ComponentRef, ExportRecord, ExportValue, ModuleEvaluator, ModuleResolver, ModuleScope,
};

use crate::error::{DocumentError, Result};

/// Failure message for a template that exports nothing.
pub const EMPTY_EXPORTS_MESSAGE: &str = "Please make sure exports document component!";

/// Evaluate compiled template text and return its document component.
///
/// The evaluator sees only `resolver` and an empty export record. An ES module
/// yields its `default` export, anything else yields the record itself; either
/// way the selected value must be a component.
pub fn load_document(
    source: &str,
    evaluator: &dyn ModuleEvaluator,
    resolver: &dyn ModuleResolver,
) -> Result<ComponentRef> {
    let mut scope = ModuleScope::new(resolver);
    evaluator.evaluate(source, &mut scope)?;
    let exports = scope.into_exports();

    if exports.is_empty() {
        return Err(DocumentError::configuration(EMPTY_EXPORTS_MESSAGE));
    }

    debug!(
        exports = exports.len(),
        es_module = exports.is_es_module(),
        "document module evaluated"
    );

    match interop_default(exports)? {
        ExportValue::Component(component) => Ok(component),
        other => Err(DocumentError::configuration(format!(
            "document export must be a component, found {}",
            other.kind()
        ))),
    }
}

fn interop_default(mut exports: ExportRecord) -> Result<ExportValue> {
    if !exports.is_es_module() {
        return Ok(ExportValue::Record(exports));
    }

    exports
        .take("default")
        .ok_or_else(|| DocumentError::configuration("document module has no default export"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use unidoc_core::{DocumentComponent, DocumentProps, component, module};

    use super::*;

    #[derive(Debug)]
    struct Page;

    impl DocumentComponent for Page {
        fn name(&self) -> &str {
            "Page"
        }

        fn render(&self, props: &DocumentProps) -> component::Result<String> {
            Ok(format!("<html>{}</html>", props.page_path))
        }
    }

    struct NoModules;

    impl ModuleResolver for NoModules {
        fn require(&self, request: &str) -> module::Result<ExportValue> {
            Err(module::EvalError::ModuleNotFound(request.to_string()))
        }
    }

    /// Evaluator that writes a fixed set of exports.
    struct Fixed {
        es_module: bool,
        exports: Vec<(&'static str, ExportValue)>,
    }

    impl ModuleEvaluator for Fixed {
        fn evaluate(&self, _source: &str, scope: &mut ModuleScope<'_>) -> module::Result<()> {
            let record = scope.exports_mut();
            record.set_es_module(self.es_module);
            for (key, value) in &self.exports {
                record.insert(*key, value.clone());
            }
            Ok(())
        }
    }

    fn document_export() -> ExportValue {
        ExportValue::Component(Arc::new(Page))
    }

    #[test]
    fn test_es_module_default_export() {
        let evaluator = Fixed {
            es_module: true,
            exports: vec![("default", document_export())],
        };
        let document = load_document("", &evaluator, &NoModules).unwrap();

        let props = DocumentProps {
            page_path: "/".to_string(),
            ..DocumentProps::default()
        };
        assert_eq!(document.render(&props).unwrap(), "<html>/</html>");
    }

    #[test]
    fn test_empty_exports_rejected() {
        let evaluator = Fixed {
            es_module: false,
            exports: vec![],
        };
        let err = load_document("", &evaluator, &NoModules).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains(EMPTY_EXPORTS_MESSAGE));
    }

    #[test]
    fn test_flag_alone_counts_as_empty() {
        let evaluator = Fixed {
            es_module: true,
            exports: vec![],
        };
        let err = load_document("", &evaluator, &NoModules).unwrap_err();
        assert!(err.to_string().contains(EMPTY_EXPORTS_MESSAGE));
    }

    #[test]
    fn test_es_module_without_default() {
        let evaluator = Fixed {
            es_module: true,
            exports: vec![("Document", document_export())],
        };
        let err = load_document("", &evaluator, &NoModules).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_plain_record_is_not_a_component() {
        let evaluator = Fixed {
            es_module: false,
            exports: vec![("default", document_export())],
        };
        let err = load_document("", &evaluator, &NoModules).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("found record"));
    }

    #[test]
    fn test_default_must_be_component() {
        let evaluator = Fixed {
            es_module: true,
            exports: vec![("default", ExportValue::Text("<html></html>".to_string()))],
        };
        let err = load_document("", &evaluator, &NoModules).unwrap_err();
        assert!(err.to_string().contains("found text"));
    }

    #[test]
    fn test_evaluation_error_propagates() {
        struct Broken;

        impl ModuleEvaluator for Broken {
            fn evaluate(&self, _source: &str, _scope: &mut ModuleScope<'_>) -> module::Result<()> {
                Err(module::EvalError::Malformed("unexpected token".to_string()))
            }
        }

        let err = load_document("", &Broken, &NoModules).unwrap_err();
        assert!(matches!(err, DocumentError::Evaluation(_)));
    }
}
