use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::adapter::Adapter;
use crate::adapter::manifest::load_manifest;
use crate::adapter::python::PythonAdapter;
use crate::cli::{Command, OutputFormat, SourceArgs};
use crate::config::Config;
use crate::editor::Editor;
use crate::error::LookseeError;
use crate::format::format_output;
use crate::help::quick_reference;
use crate::inspector::InspectOptions;
use crate::lookup_path::LookupPath;
use crate::selection::Selection;
use crate::styles::Styles;

/// Something to do with a resolved object, whatever adapter it came from.
trait Job {
    type Output;

    fn run<A: Adapter>(self, adapter: &A, object: &A::Object) -> Result<Self::Output>;
}

struct Ls {
    options: InspectOptions,
    styles: Styles,
    format: OutputFormat,
}

impl Job for Ls {
    type Output = String;

    fn run<A: Adapter>(self, adapter: &A, object: &A::Object) -> Result<String> {
        let path = LookupPath::build(adapter, object)?;
        format_output(adapter, &path, &self.options, &self.styles, self.format)
    }
}

struct Which {
    method: String,
}

impl Job for Which {
    type Output = String;

    fn run<A: Adapter>(self, adapter: &A, object: &A::Object) -> Result<String> {
        let path = LookupPath::build(adapter, object)?;
        let handle = path
            .find(&self.method)
            .ok_or_else(|| LookseeError::NameNotFound(self.method.clone()))?;
        let module = adapter.describe_module(&handle.module);
        Ok(match adapter.source_location(&handle) {
            Some(location) => format!("{module}#{} ({location})\n", handle.name),
            None => format!("{module}#{}\n", handle.name),
        })
    }
}

struct Edit {
    editor: Editor,
    method: String,
}

impl Job for Edit {
    type Output = ();

    fn run<A: Adapter>(self, adapter: &A, object: &A::Object) -> Result<()> {
        self.editor.edit(adapter, object, &self.method)
    }
}

/// Load the adapter `source` names, resolve `object` in it, and run `job`.
fn dispatch<J: Job>(source: &SourceArgs, object: &str, instance: bool, job: J) -> Result<J::Output> {
    if let Some(path) = &source.model {
        let mut space = load_manifest(path)?;
        let target = space.resolve(object, instance).with_context(|| {
            if instance {
                format!("no class named `{object}` in {}", path.display())
            } else {
                format!("no object or module named `{object}` in {}", path.display())
            }
        })?;
        return job.run(&space, &target);
    }

    if let Some(dir) = &source.python {
        if !instance {
            debug!("python objects are always class instances");
        }
        let adapter = PythonAdapter::load(dir)?;
        let target = adapter
            .instance_of(object)
            .with_context(|| format!("no class named `{object}` under {}", dir.display()))?;
        return job.run(&adapter, &target);
    }

    bail!("one of --model or --python is required")
}

/// Run a parsed command and return what it prints.
pub fn run(command: Command, config: &Config) -> Result<String> {
    match command {
        Command::Ls {
            object,
            specifiers,
            source,
            instance,
            width,
            no_color,
            format,
        } => {
            let selection = Selection::parse(&config.default_specifiers, &specifiers)?;
            let options = InspectOptions::new(selection, config.width(width));
            let job = Ls {
                options,
                styles: styles_for(config, no_color),
                format,
            };
            dispatch(&source, &object, instance, job)
        }
        Command::Which {
            object,
            method,
            source,
            instance,
        } => dispatch(&source, &object, instance, Which { method }),
        Command::Edit {
            object,
            method,
            source,
            instance,
            editor,
        } => {
            let editor = Editor::new(editor.as_deref().unwrap_or(&config.editor));
            dispatch(&source, &object, instance, Edit { editor, method })?;
            Ok(String::new())
        }
        Command::Quickref { no_color } => Ok(quick_reference(&styles_for(config, no_color))),
    }
}

fn styles_for(config: &Config, no_color: bool) -> Styles {
    if no_color {
        Styles::plain()
    } else {
        config.effective_styles()
    }
}
