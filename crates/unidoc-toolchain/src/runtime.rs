//! Host runtime module table.

use std::collections::BTreeMap;

use unidoc_core::{
    ExportValue, ModuleResolver, UI_LIBRARY,
    module::{EvalError, Result},
};

use crate::components::kit_module;

/// Modules available to `require` at render time.
#[derive(Debug, Clone, Default)]
pub struct RuntimeModules {
    modules: BTreeMap<String, ExportValue>,
}

impl RuntimeModules {
    /// Create an empty module table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a module table with the `kit` UI library registered.
    #[must_use]
    pub fn with_kit() -> Self {
        let mut modules = Self::new();
        modules.register(UI_LIBRARY, ExportValue::Record(kit_module()));
        modules
    }

    /// Register a module under a request name.
    pub fn register(&mut self, request: impl Into<String>, exports: ExportValue) {
        self.modules.insert(request.into(), exports);
    }

    /// Whether a module is registered.
    #[must_use]
    pub fn contains(&self, request: &str) -> bool {
        self.modules.contains_key(request)
    }
}

impl ModuleResolver for RuntimeModules {
    fn require(&self, request: &str) -> Result<ExportValue> {
        self.modules
            .get(request)
            .cloned()
            .ok_or_else(|| EvalError::ModuleNotFound(request.to_string()))
    }
}
