//! Classes read from Python sources with tree-sitter.
//!
//! Nothing is executed. Each `class` statement becomes a module whose
//! methods are the `def`s in its body, and lookup follows Python's method
//! resolution order.

pub mod discovery;
pub mod mro;
pub mod parser;

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::adapter::Adapter;
use crate::error::{LookseeError, Result};
use crate::models::{MethodHandle, ModuleLabel, SourceLocation, Visibility};

use self::mro::MroError;
use self::parser::ParsedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PyClassId(usize);

/// An instance of a class. Lookup on it starts at the class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PyInstance(pub PyClassId);

const OBJECT: PyClassId = PyClassId(0);

const OBJECT_METHODS: &[&str] = &[
    "__class__", "__delattr__", "__dir__", "__eq__", "__format__", "__ge__",
    "__getattribute__", "__gt__", "__hash__", "__init__", "__init_subclass__", "__le__",
    "__lt__", "__ne__", "__new__", "__reduce__", "__reduce_ex__", "__repr__", "__setattr__",
    "__sizeof__", "__str__", "__subclasshook__",
];

#[derive(Debug)]
struct PyClass {
    name: String,
    file: Option<PathBuf>,
    bases: Vec<PyClassId>,
    methods: BTreeMap<String, Visibility>,
    lines: HashMap<String, u32>,
}

impl PyClass {
    fn external(name: &str) -> Self {
        Self {
            name: name.to_string(),
            file: None,
            bases: vec![OBJECT],
            methods: BTreeMap::new(),
            lines: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct PythonAdapter {
    classes: Vec<PyClass>,
    index: HashMap<String, PyClassId>,
    // Bases not defined in the sources, kept apart so a class named after
    // its own base (`class Thread(Thread)`) stays reachable by name.
    externals: HashMap<String, PyClassId>,
}

impl PythonAdapter {
    /// Parse every Python file under `root`. Files that cannot be read or
    /// parsed are skipped with a warning.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let files = discovery::discover_files(root)?;
        let query = parser::compile_class_query()?;

        let parsed: Vec<ParsedFile> = files
            .par_iter()
            .filter_map(|path| {
                let mut ts_parser = match parser::create_parser() {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "failed to create parser");
                        return None;
                    }
                };
                match parser::parse_file(&mut ts_parser, &query, path) {
                    Ok(file) => Some(file),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping file");
                        None
                    }
                }
            })
            .collect();

        debug!(root = %root.display(), files = parsed.len(), "parsed python sources");
        Ok(Self::from_files(parsed))
    }

    /// Build from already-parsed files. When two files define the same
    /// qualified name, the first one (in file order) is the one bases
    /// resolve to.
    pub fn from_files(files: Vec<ParsedFile>) -> Self {
        let mut object = PyClass::external("object");
        object.bases.clear();
        for name in OBJECT_METHODS {
            object.methods.insert(name.to_string(), Visibility::Public);
        }
        let mut adapter = Self {
            classes: vec![object],
            index: HashMap::from([("object".to_string(), OBJECT)]),
            externals: HashMap::new(),
        };

        let mut pending = Vec::new();
        for file in files {
            for class in file.classes {
                let id = PyClassId(adapter.classes.len());
                let mut methods = BTreeMap::new();
                let mut lines = HashMap::new();
                // A later statement replaces an earlier one of the same name.
                for member in class.members {
                    methods.insert(member.name.clone(), member.visibility);
                    lines.insert(member.name, member.line);
                }
                adapter.classes.push(PyClass {
                    name: class.qualified_name.clone(),
                    file: Some(file.path.clone()),
                    bases: Vec::new(),
                    methods,
                    lines,
                });
                if adapter.index.contains_key(&class.qualified_name) {
                    warn!(
                        class = %class.qualified_name,
                        path = %file.path.display(),
                        "duplicate class definition"
                    );
                } else {
                    adapter.index.insert(class.qualified_name, id);
                }
                pending.push((id, class.bases));
            }
        }

        for (id, bases) in pending {
            let resolved = if bases.is_empty() {
                vec![OBJECT]
            } else {
                bases.iter().map(|base| adapter.resolve_base(id, base)).collect()
            };
            adapter.classes[id.0].bases = resolved;
        }
        adapter
    }

    /// Classes from the sources shadow external bases of the same name.
    pub fn class_named(&self, name: &str) -> Option<PyClassId> {
        self.index.get(name).or_else(|| self.externals.get(name)).copied()
    }

    pub fn instance_of(&self, name: &str) -> Option<PyInstance> {
        self.class_named(name).map(PyInstance)
    }

    pub fn object_class(&self) -> PyClassId {
        OBJECT
    }

    /// Resolve a base expression the way the enclosing scopes would see it,
    /// innermost first. Names not defined in the sources become external
    /// classes with no methods.
    fn resolve_base(&mut self, class: PyClassId, base: &str) -> PyClassId {
        let qualified = self.classes[class.0].name.clone();
        let mut scope = qualified.as_str();
        while let Some((outer, _)) = scope.rsplit_once('.') {
            if let Some(id) = self.class_named(&format!("{outer}.{base}")).filter(|&id| id != class) {
                return id;
            }
            scope = outer;
        }
        if let Some(id) = self.class_named(base).filter(|&id| id != class) {
            return id;
        }
        if let Some((_, last)) = base.rsplit_once('.') {
            if let Some(id) = self.class_named(last).filter(|&id| id != class) {
                return id;
            }
        }

        if let Some(&id) = self.externals.get(base) {
            return id;
        }
        debug!(class = %qualified, base, "treating base as external");
        let id = PyClassId(self.classes.len());
        self.classes.push(PyClass::external(base));
        self.externals.insert(base.to_string(), id);
        id
    }

    fn class(&self, id: PyClassId) -> Result<&PyClass> {
        self.classes
            .get(id.0)
            .ok_or_else(|| LookseeError::resolution(format!("no class with id {}", id.0)))
    }
}

impl Adapter for PythonAdapter {
    type Object = PyInstance;
    type Module = PyClassId;

    fn lookup_modules(&self, object: &PyInstance) -> Result<Vec<PyClassId>> {
        let PyInstance(class) = *object;
        self.class(class)?;
        mro::linearize(class, |id| {
            self.classes
                .get(id.0)
                .map(|c| c.bases.clone())
                .unwrap_or_default()
        })
        .map_err(|e| match e {
            MroError::Cycle(id) => LookseeError::resolution(format!(
                "class `{}` inherits from itself",
                self.classes[id.0].name
            )),
            MroError::Inconsistent(id) => LookseeError::resolution(format!(
                "cannot create a consistent method resolution order for `{}`",
                self.classes[id.0].name
            )),
        })
    }

    fn methods(&self, module: &PyClassId, visibility: Visibility) -> Result<Vec<String>> {
        Ok(self
            .class(*module)?
            .methods
            .iter()
            .filter(|&(_, &v)| v == visibility)
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn describe_module(&self, module: &PyClassId) -> ModuleLabel {
        match self.classes.get(module.0) {
            Some(class) => ModuleLabel::named(class.name.as_str()),
            None => ModuleLabel::Unnamed { class: true },
        }
    }

    fn source_location(&self, method: &MethodHandle<PyClassId>) -> Option<SourceLocation> {
        let class = self.classes.get(method.module.0)?;
        let file = class.file.as_ref()?;
        let line = class.lines.get(&method.name)?;
        Some(SourceLocation::new(file.clone(), *line))
    }
}
