//! Collaborators the document pipeline calls into.

use std::{fmt, sync::Arc};

use crate::{
    component::RenderService,
    host::ChildCompiler,
    module::{ModuleEvaluator, ModuleResolver},
};

/// Handles to the external services used by one plugin instance.
#[derive(Clone)]
pub struct Services {
    /// Runs the isolated template build.
    pub compiler: Arc<dyn ChildCompiler>,

    /// Turns compiled template text into exports.
    pub evaluator: Arc<dyn ModuleEvaluator>,

    /// The host runtime's `require`.
    pub resolver: Arc<dyn ModuleResolver>,

    /// The UI rendering service.
    pub renderer: Arc<dyn RenderService>,
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
