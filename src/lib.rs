//! Inspect the method lookup path of an object: every module searched when a
//! method is called on it, closest first, with the methods each declares.

pub mod adapter;
pub mod cli;
pub mod columnizer;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod format;
pub mod help;
pub mod inspector;
pub mod lookup_path;
pub mod models;
pub mod selection;
pub mod styles;

#[cfg(test)]
mod testing;

pub use adapter::Adapter;
pub use error::LookseeError;
pub use inspector::{InspectOptions, Inspector};
pub use lookup_path::LookupPath;
pub use selection::Selection;
pub use styles::Styles;

/// Build the lookup path of `object` and render it as text.
pub fn inspect<A: Adapter>(
    adapter: &A,
    object: &A::Object,
    options: &InspectOptions,
    styles: &Styles,
) -> Result<String, LookseeError> {
    let path = LookupPath::build(adapter, object)?;
    Ok(Inspector::new(adapter, &path, options, styles).render())
}
