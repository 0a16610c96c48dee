pub mod manifest;
pub mod object_space;
pub mod python;

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;
use crate::models::{MethodHandle, ModuleLabel, SourceLocation, Visibility};

pub use object_space::{ModuleId, ObjectId, ObjectSpace, Target};
pub use python::{PyClassId, PyInstance, PythonAdapter};

/// Reflection capabilities the lookup path engine needs from a host object
/// model.
///
/// Implementations answer questions about objects and modules they own; the
/// builder, inspector, and column layout never look past this trait.
pub trait Adapter {
    type Object: Clone + Debug;
    type Module: Clone + Eq + Hash + Debug;

    /// The modules searched, in order, when a method is called on `object`.
    /// The closest ancestor comes first.
    fn lookup_modules(&self, object: &Self::Object) -> Result<Vec<Self::Module>>;

    /// Names declared directly on `module` with the given visibility.
    /// Inherited methods are not included.
    fn methods(&self, module: &Self::Module, visibility: Visibility) -> Result<Vec<String>>;

    fn describe_module(&self, module: &Self::Module) -> ModuleLabel;

    fn source_location(&self, method: &MethodHandle<Self::Module>) -> Option<SourceLocation>;
}

impl<A: Adapter + ?Sized> Adapter for &A {
    type Object = A::Object;
    type Module = A::Module;

    fn lookup_modules(&self, object: &Self::Object) -> Result<Vec<Self::Module>> {
        (**self).lookup_modules(object)
    }

    fn methods(&self, module: &Self::Module, visibility: Visibility) -> Result<Vec<String>> {
        (**self).methods(module, visibility)
    }

    fn describe_module(&self, module: &Self::Module) -> ModuleLabel {
        (**self).describe_module(module)
    }

    fn source_location(&self, method: &MethodHandle<Self::Module>) -> Option<SourceLocation> {
        (**self).source_location(method)
    }
}
