use std::collections::HashMap;

use crate::adapter::Adapter;
use crate::error::{LookseeError, Result};
use crate::models::{MethodHandle, ModuleLabel, SourceLocation, Visibility};

/// Adapter over hand-written tables, for exercising the engine without a
/// real object model.
#[derive(Debug, Default)]
pub struct StubAdapter {
    ancestors: HashMap<String, Vec<String>>,
    methods: HashMap<(String, Visibility), Vec<String>>,
    locations: HashMap<(String, String), SourceLocation>,
}

impl StubAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ancestors(&mut self, object: &str, modules: &[&str]) {
        self.ancestors.insert(
            object.to_string(),
            modules.iter().map(|m| m.to_string()).collect(),
        );
    }

    pub fn set_methods(
        &mut self,
        module: &str,
        public: &[&str],
        protected: &[&str],
        private: &[&str],
        undefined: &[&str],
    ) {
        let tables = [
            (Visibility::Public, public),
            (Visibility::Protected, protected),
            (Visibility::Private, private),
            (Visibility::Undefined, undefined),
        ];
        for (visibility, names) in tables {
            self.methods.insert(
                (module.to_string(), visibility),
                names.iter().map(|n| n.to_string()).collect(),
            );
        }
    }

    pub fn set_source_location(&mut self, module: &str, method: &str, location: SourceLocation) {
        self.locations
            .insert((module.to_string(), method.to_string()), location);
    }
}

impl Adapter for StubAdapter {
    type Object = String;
    type Module = String;

    fn lookup_modules(&self, object: &String) -> Result<Vec<String>> {
        self.ancestors
            .get(object)
            .cloned()
            .ok_or_else(|| LookseeError::resolution(format!("unknown object `{object}`")))
    }

    fn methods(&self, module: &String, visibility: Visibility) -> Result<Vec<String>> {
        Ok(self
            .methods
            .get(&(module.clone(), visibility))
            .cloned()
            .unwrap_or_default())
    }

    fn describe_module(&self, module: &String) -> ModuleLabel {
        ModuleLabel::named(module.as_str())
    }

    fn source_location(&self, method: &MethodHandle<String>) -> Option<SourceLocation> {
        self.locations
            .get(&(method.module.clone(), method.name.clone()))
            .cloned()
    }
}
