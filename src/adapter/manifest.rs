//! JSON description of an object space.
//!
//! ```json
//! {
//!   "modules": [
//!     { "name": "Greeting", "kind": "module", "methods": { "public": ["greet"] } },
//!     { "name": "Base", "methods": { "private": ["setup"] } },
//!     { "name": "Derived", "superclass": "Base", "include": ["Greeting"],
//!       "methods": { "public": ["run"], "undefined": ["dup"] },
//!       "locations": { "run": { "file": "derived.rb", "line": 3 } } }
//!   ],
//!   "objects": [ { "name": "derived", "class": "Derived" } ]
//! }
//! ```
//!
//! Classes without a `superclass` inherit from `Object`. Location keys of the
//! form `self.name` refer to singleton methods.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::debug;

use crate::adapter::object_space::{ModuleId, ObjectSpace, Target};
use crate::models::{SourceLocation, Visibility};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    #[default]
    Class,
    Module,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub kind: ModuleKind,
    pub superclass: Option<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub prepend: Vec<String>,
    #[serde(default)]
    pub extend: Vec<String>,
    #[serde(default)]
    pub methods: MethodTable,
    #[serde(default)]
    pub singleton_methods: MethodTable,
    #[serde(default)]
    pub locations: BTreeMap<String, LocationSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectSpec {
    pub name: String,
    pub class: String,
    #[serde(default)]
    pub extend: Vec<String>,
    #[serde(default)]
    pub singleton_methods: MethodTable,
    #[serde(default)]
    pub locations: BTreeMap<String, LocationSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodTable {
    #[serde(default)]
    pub public: Vec<String>,
    #[serde(default)]
    pub protected: Vec<String>,
    #[serde(default)]
    pub private: Vec<String>,
    #[serde(default)]
    pub undefined: Vec<String>,
}

impl MethodTable {
    fn entries(&self) -> impl Iterator<Item = (&str, Visibility)> {
        let tables = [
            (&self.public, Visibility::Public),
            (&self.protected, Visibility::Protected),
            (&self.private, Visibility::Private),
            (&self.undefined, Visibility::Undefined),
        ];
        tables
            .into_iter()
            .flat_map(|(names, visibility)| names.iter().map(move |n| (n.as_str(), visibility)))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationSpec {
    pub file: PathBuf,
    pub line: u32,
}

impl From<&LocationSpec> for SourceLocation {
    fn from(spec: &LocationSpec) -> Self {
        SourceLocation::new(spec.file.clone(), spec.line)
    }
}

pub fn load_manifest(path: &Path) -> Result<ObjectSpace> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: Manifest = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse model manifest {}", path.display()))?;
    ObjectSpace::from_manifest(&manifest)
        .with_context(|| format!("invalid model manifest {}", path.display()))
}

impl ObjectSpace {
    /// Build a space from the core hierarchy plus everything `manifest`
    /// declares. Names may be referenced before they are declared.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self> {
        let mut space = ObjectSpace::new();

        let mut ids = Vec::with_capacity(manifest.modules.len());
        let mut created = Vec::with_capacity(manifest.modules.len());
        for spec in &manifest.modules {
            let (id, is_new) = space.declare(spec)?;
            ids.push(id);
            created.push(is_new);
        }

        for ((spec, &id), &is_new) in manifest.modules.iter().zip(&ids).zip(&created) {
            space.link(spec, id, is_new)?;
        }

        for spec in &manifest.objects {
            space.add_object(spec)?;
        }

        debug!(
            modules = manifest.modules.len(),
            objects = manifest.objects.len(),
            "loaded model manifest"
        );
        Ok(space)
    }

    fn declare(&mut self, spec: &ModuleSpec) -> Result<(ModuleId, bool)> {
        let Some(existing) = self.module_named(&spec.name) else {
            let id = match spec.kind {
                ModuleKind::Class => self.define_class(Some(&spec.name), None),
                ModuleKind::Module => self.define_module(Some(&spec.name)),
            };
            return Ok((id, true));
        };
        match spec.kind {
            ModuleKind::Class if !self.is_class(existing) => {
                bail!("`{}` is already defined as a module", spec.name)
            }
            ModuleKind::Module if !self.is_module(existing) => {
                bail!("`{}` is already defined as a class", spec.name)
            }
            _ => Ok((existing, false)),
        }
    }

    fn link(&mut self, spec: &ModuleSpec, id: ModuleId, is_new: bool) -> Result<()> {
        match spec.kind {
            ModuleKind::Class => {
                let superclass = match &spec.superclass {
                    Some(name) => Some(self.class_ref(name, &spec.name)?),
                    None if is_new => Some(self.object_class()),
                    None => self.superclass(id),
                };
                if is_new {
                    self.set_superclass(id, superclass);
                } else if superclass != self.superclass(id) {
                    bail!("superclass mismatch for class `{}`", spec.name);
                }
            }
            ModuleKind::Module => {
                if spec.superclass.is_some() {
                    bail!("module `{}` cannot have a superclass", spec.name);
                }
            }
        }

        for name in &spec.include {
            let module = self.module_ref(name, &spec.name)?;
            self.include(id, module);
        }
        for name in &spec.prepend {
            let module = self.module_ref(name, &spec.name)?;
            self.prepend(id, module);
        }
        for name in &spec.extend {
            let module = self.module_ref(name, &spec.name)?;
            self.extend(Target::Module(id), module);
        }

        for (name, visibility) in spec.methods.entries() {
            self.define_method(id, name, visibility);
        }
        // Classes already have one; modules only get one when needed.
        if spec.singleton_methods.entries().next().is_some() {
            let singleton = self.singleton_class(Target::Module(id));
            for (name, visibility) in spec.singleton_methods.entries() {
                self.define_method(singleton, name, visibility);
            }
        }
        for (key, location) in &spec.locations {
            match key.strip_prefix("self.") {
                Some(name) => {
                    let singleton = self.singleton_class(Target::Module(id));
                    self.set_source_location(singleton, name, location.into());
                }
                None => self.set_source_location(id, key, location.into()),
            }
        }
        Ok(())
    }

    fn add_object(&mut self, spec: &ObjectSpec) -> Result<()> {
        let class = self.class_ref(&spec.class, &spec.name)?;
        let object = self.new_object(class);
        self.name_object(&spec.name, object);
        let target = Target::Object(object);

        for name in &spec.extend {
            let module = self.module_ref(name, &spec.name)?;
            self.extend(target, module);
        }
        let has_singleton_methods = spec.singleton_methods.entries().next().is_some();
        if has_singleton_methods || !spec.locations.is_empty() {
            let singleton = self.singleton_class(target);
            for (name, visibility) in spec.singleton_methods.entries() {
                self.define_method(singleton, name, visibility);
            }
            for (name, location) in &spec.locations {
                self.set_source_location(singleton, name, location.into());
            }
        }
        Ok(())
    }

    fn class_ref(&self, name: &str, referrer: &str) -> Result<ModuleId> {
        let id = self
            .module_named(name)
            .with_context(|| format!("`{referrer}` refers to unknown class `{name}`"))?;
        if !self.is_class(id) {
            bail!("`{referrer}` refers to `{name}`, which is not a class");
        }
        Ok(id)
    }

    fn module_ref(&self, name: &str, referrer: &str) -> Result<ModuleId> {
        let id = self
            .module_named(name)
            .with_context(|| format!("`{referrer}` refers to unknown module `{name}`"))?;
        if !self.is_module(id) {
            bail!("`{referrer}` cannot mix in `{name}`, which is not a module");
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use crate::lookup_path::LookupPath;

    fn load(json: &str) -> Result<ObjectSpace> {
        let manifest: Manifest = serde_json::from_str(json)?;
        ObjectSpace::from_manifest(&manifest)
    }

    fn labels(space: &ObjectSpace, target: Target) -> Vec<String> {
        space
            .lookup_modules(&target)
            .unwrap()
            .iter()
            .map(|m| space.describe_module(m).to_string())
            .collect()
    }

    #[test]
    fn classes_default_to_object_superclass() {
        let space = load(r#"{ "modules": [ { "name": "C" } ], "objects": [ { "name": "c", "class": "C" } ] }"#).unwrap();
        let object = space.object_named("c").unwrap();
        assert_eq!(
            labels(&space, Target::Object(object)),
            vec!["C", "Object", "Kernel", "BasicObject"]
        );
    }

    #[test]
    fn forward_references_resolve() {
        let space = load(
            r#"{
                "modules": [
                    { "name": "Derived", "superclass": "Base", "include": ["Mod1", "Mod2"] },
                    { "name": "Base" },
                    { "name": "Mod1", "kind": "module" },
                    { "name": "Mod2", "kind": "module" }
                ],
                "objects": [ { "name": "d", "class": "Derived" } ]
            }"#,
        )
        .unwrap();
        let object = space.object_named("d").unwrap();
        assert_eq!(
            labels(&space, Target::Object(object)),
            vec!["Derived", "Mod2", "Mod1", "Base", "Object", "Kernel", "BasicObject"]
        );
    }

    #[test]
    fn methods_and_locations_are_loaded() {
        let space = load(
            r#"{
                "modules": [ {
                    "name": "C",
                    "methods": { "public": ["run"], "private": ["helper"], "undefined": ["dup"] },
                    "singleton_methods": { "public": ["build"] },
                    "locations": {
                        "run": { "file": "c.rb", "line": 4 },
                        "self.build": { "file": "c.rb", "line": 9 }
                    }
                } ],
                "objects": [ { "name": "c", "class": "C" } ]
            }"#,
        )
        .unwrap();

        let c = space.module_named("C").unwrap();
        assert_eq!(space.methods(&c, Visibility::Private).unwrap(), vec!["helper"]);

        let instance = Target::Object(space.object_named("c").unwrap());
        let path = LookupPath::build(&space, &instance).unwrap();
        let run = path.find("run").unwrap();
        assert_eq!(space.source_location(&run), Some(SourceLocation::new("c.rb", 4)));
        assert!(path.find("dup").is_none());

        let path = LookupPath::build(&space, &Target::Module(c)).unwrap();
        let build = path.find("build").unwrap();
        assert_eq!(space.describe_module(&build.module).to_string(), "[C]");
        assert_eq!(space.source_location(&build), Some(SourceLocation::new("c.rb", 9)));
    }

    #[test]
    fn objects_can_be_extended() {
        let space = load(
            r#"{
                "modules": [ { "name": "Loud", "kind": "module", "methods": { "public": ["shout"] } } ],
                "objects": [ {
                    "name": "thing",
                    "class": "Object",
                    "extend": ["Loud"],
                    "singleton_methods": { "public": ["only_mine"] }
                } ]
            }"#,
        )
        .unwrap();
        let object = space.object_named("thing").unwrap();
        assert_eq!(
            labels(&space, Target::Object(object))[..3],
            ["[Object instance]", "Loud", "Object"]
        );
    }

    #[test]
    fn reopening_a_core_class_adds_methods() {
        let space = load(r#"{ "modules": [ { "name": "Object", "methods": { "public": ["try"] } } ] }"#).unwrap();
        let object = space.object_class();
        assert_eq!(space.methods(&object, Visibility::Public).unwrap(), vec!["try"]);
        assert_eq!(space.superclass(object), Some(space.basic_object_class()));
    }

    #[test]
    fn superclass_mismatch_is_an_error() {
        let err = load(
            r#"{ "modules": [ { "name": "A" }, { "name": "B", "superclass": "A" }, { "name": "B", "superclass": "Object" } ] }"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("superclass mismatch"), "{err}");
    }

    #[test]
    fn kind_mismatch_is_an_error() {
        assert!(load(r#"{ "modules": [ { "name": "Kernel" } ] }"#).is_err());
        assert!(load(r#"{ "modules": [ { "name": "Object", "kind": "module" } ] }"#).is_err());
    }

    #[test]
    fn unknown_references_are_errors() {
        assert!(load(r#"{ "modules": [ { "name": "C", "superclass": "Nope" } ] }"#).is_err());
        assert!(load(r#"{ "modules": [ { "name": "C", "include": ["Nope"] } ] }"#).is_err());
        assert!(load(r#"{ "objects": [ { "name": "x", "class": "Nope" } ] }"#).is_err());
    }

    #[test]
    fn mixing_in_a_class_is_an_error() {
        let err = load(r#"{ "modules": [ { "name": "C", "include": ["Object"] } ] }"#).unwrap_err();
        assert!(err.to_string().contains("not a module"), "{err}");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(load(r#"{ "modules": [ { "name": "C", "mixins": [] } ] }"#).is_err());
    }

    #[test]
    fn load_manifest_reports_the_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_manifest(&path).unwrap_err();
        assert!(err.to_string().contains("model.json"), "{err}");
    }
}
