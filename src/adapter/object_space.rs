use std::collections::{BTreeMap, HashMap, HashSet};

use crate::adapter::Adapter;
use crate::error::{LookseeError, Result};
use crate::models::{MethodHandle, ModuleLabel, SourceLocation, Visibility};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

/// Anything that can receive a method call: a plain object, or a module or
/// class used as an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Object(ObjectId),
    Module(ModuleId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Class { superclass: Option<ModuleId> },
    Module,
    Singleton { attached: Target },
}

#[derive(Debug)]
struct ModuleDef {
    name: Option<String>,
    kind: Kind,
    prepends: Vec<ModuleId>,
    includes: Vec<ModuleId>,
    methods: BTreeMap<String, Visibility>,
    locations: HashMap<String, SourceLocation>,
    singleton: Option<ModuleId>,
}

impl ModuleDef {
    fn new(name: Option<&str>, kind: Kind) -> Self {
        Self {
            name: name.map(str::to_string),
            kind,
            prepends: Vec::new(),
            includes: Vec::new(),
            methods: BTreeMap::new(),
            locations: HashMap::new(),
            singleton: None,
        }
    }
}

#[derive(Debug)]
struct ObjectDef {
    class: ModuleId,
    singleton: Option<ModuleId>,
}

#[derive(Debug, Clone, Copy)]
struct Core {
    basic_object: ModuleId,
    kernel: ModuleId,
    object: ModuleId,
    module: ModuleId,
    class: ModuleId,
}

/// An in-memory object model with Ruby's method lookup rules: single
/// inheritance, mixins through `include` and `prepend`, singleton classes,
/// and `undef_method`.
///
/// Every class gets its singleton class when it is defined. Plain objects
/// and modules get one on demand.
#[derive(Debug)]
pub struct ObjectSpace {
    modules: Vec<ModuleDef>,
    objects: Vec<ObjectDef>,
    module_names: HashMap<String, ModuleId>,
    object_names: HashMap<String, ObjectId>,
    core: Core,
}

const BASIC_OBJECT_PUBLIC: &[&str] = &[
    "!", "!=", "==", "__id__", "__send__", "equal?", "instance_eval", "instance_exec",
];
const BASIC_OBJECT_PRIVATE: &[&str] = &["initialize", "method_missing", "singleton_method_added"];
const KERNEL_PUBLIC: &[&str] = &[
    "class", "clone", "dup", "freeze", "frozen?", "inspect", "instance_variables", "is_a?",
    "method", "methods", "nil?", "object_id", "respond_to?", "send", "tap", "to_s",
];
const KERNEL_PRIVATE: &[&str] = &[
    "format", "gets", "lambda", "loop", "p", "print", "proc", "puts", "raise", "require", "sleep",
];
const MODULE_PUBLIC: &[&str] = &[
    "<", "<=", "===", "ancestors", "const_get", "include", "include?", "instance_method",
    "instance_methods", "module_eval", "name", "prepend",
];
const MODULE_PRIVATE: &[&str] = &[
    "attr_accessor", "attr_reader", "attr_writer", "define_method", "extended", "included",
    "remove_method", "undef_method",
];
const CLASS_PUBLIC: &[&str] = &["allocate", "new", "superclass"];
const CLASS_PRIVATE: &[&str] = &["inherited"];

impl Default for ObjectSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectSpace {
    /// A space holding the core hierarchy: `BasicObject`, `Kernel`,
    /// `Object`, `Module`, and `Class`, with their usual methods.
    pub fn new() -> Self {
        let placeholder = ModuleId(0);
        let mut space = Self {
            modules: Vec::new(),
            objects: Vec::new(),
            module_names: HashMap::new(),
            object_names: HashMap::new(),
            core: Core {
                basic_object: placeholder,
                kernel: placeholder,
                object: placeholder,
                module: placeholder,
                class: placeholder,
            },
        };

        let basic_object = space.define_class(Some("BasicObject"), None);
        let kernel = space.define_module(Some("Kernel"));
        let object = space.define_class(Some("Object"), Some(basic_object));
        space.include(object, kernel);
        let module = space.define_class(Some("Module"), Some(object));
        let class = space.define_class(Some("Class"), Some(module));
        space.core = Core {
            basic_object,
            kernel,
            object,
            module,
            class,
        };

        let tables = [
            (basic_object, BASIC_OBJECT_PUBLIC, BASIC_OBJECT_PRIVATE),
            (kernel, KERNEL_PUBLIC, KERNEL_PRIVATE),
            (module, MODULE_PUBLIC, MODULE_PRIVATE),
            (class, CLASS_PUBLIC, CLASS_PRIVATE),
        ];
        for (id, public, private) in tables {
            for name in public {
                space.define_method(id, name, Visibility::Public);
            }
            for name in private {
                space.define_method(id, name, Visibility::Private);
            }
        }
        space
    }

    // ── Definition ──

    /// Define a class. A `None` superclass makes a root class like
    /// `BasicObject`.
    pub fn define_class(&mut self, name: Option<&str>, superclass: Option<ModuleId>) -> ModuleId {
        let id = self.push_module(ModuleDef::new(name, Kind::Class { superclass }));
        self.create_singleton(Target::Module(id));
        id
    }

    pub fn define_module(&mut self, name: Option<&str>) -> ModuleId {
        self.push_module(ModuleDef::new(name, Kind::Module))
    }

    /// Change the superclass of a class. Has no effect on modules.
    pub fn set_superclass(&mut self, class: ModuleId, superclass: Option<ModuleId>) {
        if let Some(def) = self.modules.get_mut(class.0) {
            if let Kind::Class { .. } = def.kind {
                def.kind = Kind::Class { superclass };
            }
        }
    }

    pub fn include(&mut self, into: ModuleId, module: ModuleId) {
        if let Some(def) = self.modules.get_mut(into.0) {
            def.includes.push(module);
        }
    }

    pub fn prepend(&mut self, into: ModuleId, module: ModuleId) {
        if let Some(def) = self.modules.get_mut(into.0) {
            def.prepends.push(module);
        }
    }

    /// Include `module` into the singleton class of `target`.
    pub fn extend(&mut self, target: Target, module: ModuleId) {
        let singleton = self.singleton_class(target);
        self.include(singleton, module);
    }

    pub fn define_method(&mut self, module: ModuleId, name: &str, visibility: Visibility) {
        if let Some(def) = self.modules.get_mut(module.0) {
            def.methods.insert(name.to_string(), visibility);
        }
    }

    /// Block `name` at `module`, hiding any inherited definition.
    pub fn undef_method(&mut self, module: ModuleId, name: &str) {
        self.define_method(module, name, Visibility::Undefined);
    }

    pub fn set_source_location(&mut self, module: ModuleId, name: &str, location: SourceLocation) {
        if let Some(def) = self.modules.get_mut(module.0) {
            def.locations.insert(name.to_string(), location);
        }
    }

    pub fn new_object(&mut self, class: ModuleId) -> ObjectId {
        self.objects.push(ObjectDef {
            class,
            singleton: None,
        });
        ObjectId(self.objects.len() - 1)
    }

    pub fn name_object(&mut self, name: &str, object: ObjectId) {
        self.object_names.insert(name.to_string(), object);
    }

    /// The singleton class of `target`, created if it does not exist yet.
    pub fn singleton_class(&mut self, target: Target) -> ModuleId {
        let existing = match target {
            Target::Object(o) => self.objects.get(o.0).and_then(|d| d.singleton),
            Target::Module(m) => self.modules.get(m.0).and_then(|d| d.singleton),
        };
        existing.unwrap_or_else(|| self.create_singleton(target))
    }

    fn push_module(&mut self, def: ModuleDef) -> ModuleId {
        let id = ModuleId(self.modules.len());
        if let Some(name) = &def.name {
            self.module_names.insert(name.clone(), id);
        }
        self.modules.push(def);
        id
    }

    fn create_singleton(&mut self, target: Target) -> ModuleId {
        let id = self.push_module(ModuleDef::new(None, Kind::Singleton { attached: target }));
        match target {
            Target::Object(o) => {
                if let Some(def) = self.objects.get_mut(o.0) {
                    def.singleton = Some(id);
                }
            }
            Target::Module(m) => {
                if let Some(def) = self.modules.get_mut(m.0) {
                    def.singleton = Some(id);
                }
            }
        }
        id
    }

    // ── Queries ──

    pub fn module_named(&self, name: &str) -> Option<ModuleId> {
        self.module_names.get(name).copied()
    }

    pub fn object_named(&self, name: &str) -> Option<ObjectId> {
        self.object_names.get(name).copied()
    }

    /// Find what `name` refers to: a named object first, then a module.
    /// With `instance`, `name` must be a class and a fresh instance of it is
    /// returned.
    pub fn resolve(&mut self, name: &str, instance: bool) -> Option<Target> {
        if instance {
            let class = self.module_named(name).filter(|&id| self.is_class(id))?;
            return Some(Target::Object(self.new_object(class)));
        }
        if let Some(object) = self.object_named(name) {
            return Some(Target::Object(object));
        }
        self.module_named(name).map(Target::Module)
    }

    pub fn is_class(&self, id: ModuleId) -> bool {
        self.modules
            .get(id.0)
            .is_some_and(|d| matches!(d.kind, Kind::Class { .. }))
    }

    pub fn is_module(&self, id: ModuleId) -> bool {
        self.modules
            .get(id.0)
            .is_some_and(|d| matches!(d.kind, Kind::Module))
    }

    pub fn superclass(&self, id: ModuleId) -> Option<ModuleId> {
        match self.modules.get(id.0)?.kind {
            Kind::Class { superclass } => superclass,
            _ => None,
        }
    }

    pub fn object_class(&self) -> ModuleId {
        self.core.object
    }

    pub fn kernel_module(&self) -> ModuleId {
        self.core.kernel
    }

    pub fn basic_object_class(&self) -> ModuleId {
        self.core.basic_object
    }

    fn module(&self, id: ModuleId) -> Result<&ModuleDef> {
        self.modules
            .get(id.0)
            .ok_or_else(|| LookseeError::resolution(format!("no module with id {}", id.0)))
    }

    fn object(&self, id: ObjectId) -> Result<&ObjectDef> {
        self.objects
            .get(id.0)
            .ok_or_else(|| LookseeError::resolution(format!("no object with id {}", id.0)))
    }

    // ── Ancestry ──

    fn superclass_of(&self, id: ModuleId) -> Result<Option<ModuleId>> {
        let attached = match self.module(id)?.kind {
            Kind::Class { superclass } => return Ok(superclass),
            Kind::Module => return Ok(None),
            Kind::Singleton { attached: Target::Object(o) } => {
                return Ok(Some(self.object(o)?.class));
            }
            Kind::Singleton { attached: Target::Module(m) } => m,
        };

        // The singleton class of a class inherits from the singleton class of
        // its superclass.
        let parent = match self.module(attached)?.kind {
            Kind::Module => return Ok(Some(self.core.module)),
            Kind::Class { superclass } => superclass,
            Kind::Singleton { .. } => self.superclass_of(attached)?,
        };
        let superclass = match parent {
            Some(parent) => self.module(parent)?.singleton.unwrap_or(self.core.class),
            None => self.core.class,
        };
        Ok(Some(superclass))
    }

    fn class_ancestors(&self, start: ModuleId) -> Result<Vec<ModuleId>> {
        let mut ancestors = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(start);
        while let Some(class) = current {
            if !visited.insert(class) {
                return Err(LookseeError::resolution(format!(
                    "superclass cycle through {}",
                    self.describe_module(&class)
                )));
            }
            self.push_with_mixins(class, &mut ancestors, &mut Vec::new())?;
            current = self.superclass_of(class)?;
        }

        // A module mixed in more than once stays only at its last position.
        let mut seen = HashSet::new();
        let mut deduped: Vec<ModuleId> = ancestors
            .into_iter()
            .rev()
            .filter(|id| seen.insert(*id))
            .collect();
        deduped.reverse();
        Ok(deduped)
    }

    fn push_with_mixins(
        &self,
        id: ModuleId,
        out: &mut Vec<ModuleId>,
        stack: &mut Vec<ModuleId>,
    ) -> Result<()> {
        if stack.contains(&id) {
            return Err(LookseeError::resolution(format!(
                "{} includes itself",
                self.describe_module(&id)
            )));
        }
        stack.push(id);
        let def = self.module(id)?;
        for &prepended in def.prepends.iter().rev() {
            self.push_with_mixins(prepended, out, stack)?;
        }
        out.push(id);
        for &included in def.includes.iter().rev() {
            self.push_with_mixins(included, out, stack)?;
        }
        stack.pop();
        Ok(())
    }
}

impl Adapter for ObjectSpace {
    type Object = Target;
    type Module = ModuleId;

    fn lookup_modules(&self, object: &Target) -> Result<Vec<ModuleId>> {
        let start = match *object {
            Target::Object(o) => {
                let def = self.object(o)?;
                def.singleton.unwrap_or(def.class)
            }
            Target::Module(m) => {
                let def = self.module(m)?;
                match (def.singleton, def.kind) {
                    (Some(singleton), _) => singleton,
                    (None, Kind::Module) => self.core.module,
                    (None, _) => self.core.class,
                }
            }
        };
        self.class_ancestors(start)
    }

    fn methods(&self, module: &ModuleId, visibility: Visibility) -> Result<Vec<String>> {
        Ok(self
            .module(*module)?
            .methods
            .iter()
            .filter(|&(_, &v)| v == visibility)
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn describe_module(&self, module: &ModuleId) -> ModuleLabel {
        let Some(def) = self.modules.get(module.0) else {
            return ModuleLabel::Unnamed { class: false };
        };
        match def.kind {
            Kind::Singleton { attached: Target::Module(m) } => {
                ModuleLabel::singleton(self.describe_module(&m))
            }
            Kind::Singleton { attached: Target::Object(o) } => {
                let class = match self.objects.get(o.0) {
                    Some(object) => self.describe_module(&object.class),
                    None => ModuleLabel::Unnamed { class: true },
                };
                ModuleLabel::singleton(ModuleLabel::instance(class))
            }
            Kind::Class { .. } | Kind::Module => match &def.name {
                Some(name) => ModuleLabel::named(name.as_str()),
                None => ModuleLabel::Unnamed {
                    class: matches!(def.kind, Kind::Class { .. }),
                },
            },
        }
    }

    fn source_location(&self, method: &MethodHandle<ModuleId>) -> Option<SourceLocation> {
        self.modules
            .get(method.module.0)?
            .locations
            .get(&method.name)
            .cloned()
    }
}
