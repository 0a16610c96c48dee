use anyhow::Result;
use serde::Serialize;

use crate::adapter::Adapter;
use crate::cli::OutputFormat;
use crate::inspector::{InspectOptions, Inspector, visible_methods};
use crate::lookup_path::LookupPath;
use crate::models::{Category, MethodHandle, SourceLocation, Visibility};
use crate::styles::Styles;

#[derive(Debug, Serialize)]
pub struct EntryReport {
    pub module: String,
    pub methods: Vec<MethodReport>,
}

#[derive(Debug, Serialize)]
pub struct MethodReport {
    pub name: String,
    pub visibility: Visibility,
    /// How the method is shown: its visibility, or `overridden`.
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

/// The entries and methods the selection lets through, closest ancestor
/// first. Empty entries are kept so the chain stays complete.
pub fn report<A: Adapter>(adapter: &A, path: &LookupPath<A>, options: &InspectOptions) -> Vec<EntryReport> {
    path.entries()
        .iter()
        .map(|entry| {
            let methods = visible_methods(entry, &options.selection)
                .into_iter()
                .filter_map(|(name, category)| {
                    let visibility = *entry.methods().get(name)?;
                    let handle = MethodHandle {
                        module: entry.module().clone(),
                        name: name.to_string(),
                        visibility,
                    };
                    Some(MethodReport {
                        name: name.to_string(),
                        visibility,
                        category,
                        location: adapter.source_location(&handle),
                    })
                })
                .collect();
            EntryReport {
                module: adapter.describe_module(entry.module()).to_string(),
                methods,
            }
        })
        .collect()
}

/// Render a lookup path in the requested output format.
pub fn format_output<A: Adapter>(
    adapter: &A,
    path: &LookupPath<A>,
    options: &InspectOptions,
    styles: &Styles,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let mut out = Inspector::new(adapter, path, options, styles).render();
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(&report(adapter, path, options))?;
            out.push('\n');
            Ok(out)
        }
    }
}
