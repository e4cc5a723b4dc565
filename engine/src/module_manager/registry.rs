use super::hooks::Module;
use super::types::ModuleType;
use std::collections::HashMap;

type ModuleConstructor = Box<dyn Fn() -> Box<dyn Module>>;

/// Constructors of concrete modules keyed by [`ModuleType`].
///
/// A type without a constructor fails allocation with
/// [`ModuleError::AllocationFailed`](super::ModuleError::AllocationFailed).
#[derive(Default)]
pub struct ModuleRegistry {
    constructors: HashMap<ModuleType, ModuleConstructor>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor, replacing any previous one for the type.
    pub fn register<F>(&mut self, module_type: ModuleType, constructor: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Module> + 'static,
    {
        if self
            .constructors
            .insert(module_type, Box::new(constructor))
            .is_some()
        {
            log::warn!("Replacing module constructor for type '{module_type}'");
        }
        self
    }

    pub fn with<F>(mut self, module_type: ModuleType, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn Module> + 'static,
    {
        self.register(module_type, constructor);
        self
    }

    pub fn is_registered(&self, module_type: ModuleType) -> bool {
        self.constructors.contains_key(&module_type)
    }

    pub(crate) fn allocate(&self, module_type: ModuleType) -> Option<Box<dyn Module>> {
        self.constructors
            .get(&module_type)
            .map(|constructor| constructor())
    }
}
