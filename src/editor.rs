use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::info;

use crate::adapter::Adapter;
use crate::error::LookseeError;
use crate::lookup_path::LookupPath;
use crate::models::{MethodHandle, SourceLocation};

static LINE_FIRST_EDITORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:g?vim?|.*macs|pico|nano)$").expect("valid editor pattern"));

/// An editor command line. `%f` is replaced by the file, `%l` by the line,
/// and `%%` by a literal `%`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    command: String,
}

impl Editor {
    /// A command without `%f` or `%l` gets them appended when the program is
    /// a known editor.
    pub fn new(command: &str) -> Self {
        let command = command.trim();
        if command.contains("%f") || command.contains("%l") {
            return Self {
                command: command.to_string(),
            };
        }

        let program = command
            .split_whitespace()
            .next()
            .map(|word| Path::new(word).file_name().and_then(|n| n.to_str()).unwrap_or(word))
            .unwrap_or_default();
        let arguments = if LINE_FIRST_EDITORS.is_match(program) {
            " +%l %f"
        } else if program == "mate" {
            " -l%l %f"
        } else {
            ""
        };
        Self {
            command: format!("{command}{arguments}"),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// The argument vector for opening `file` at `line`.
    pub fn command_for(&self, file: &Path, line: u32) -> Result<Vec<String>> {
        let words = split_words(&self.command)?;
        if words.is_empty() {
            bail!("editor command is empty");
        }
        let file = file.to_string_lossy();
        let line = line.to_string();
        Ok(words
            .iter()
            .map(|word| substitute(word, &file, &line))
            .collect())
    }

    /// Open the source of `name` as resolved on `object`'s lookup path, and
    /// wait for the editor to exit.
    pub fn edit<A: Adapter>(&self, adapter: &A, object: &A::Object, name: &str) -> Result<()> {
        let (_, location) = locate(adapter, object, name)?;
        let argv = self.command_for(&location.file, location.line)?;
        info!(command = ?argv, "launching editor");

        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .status()
            .with_context(|| format!("failed to run editor `{}`", argv[0]))?;
        if !status.success() {
            bail!("editor `{}` exited with {status}", argv[0]);
        }
        Ok(())
    }
}

/// Resolve `name` on `object` and find where it is defined.
pub fn locate<A: Adapter>(
    adapter: &A,
    object: &A::Object,
    name: &str,
) -> Result<(MethodHandle<A::Module>, SourceLocation), LookseeError> {
    let path = LookupPath::build(adapter, object)?;
    let method = path
        .find(name)
        .ok_or_else(|| LookseeError::NameNotFound(name.to_string()))?;
    let location = adapter
        .source_location(&method)
        .ok_or_else(|| LookseeError::NoSourceLocation(name.to_string()))?;
    Ok((method, location))
}

fn substitute(word: &str, file: &str, line: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut chars = word.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('f') => out.push_str(file),
            Some('l') => out.push_str(line),
            Some('%') => out.push('%'),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

// Shell-style word splitting with POSIX quoting rules.
fn split_words(command: &str) -> Result<Vec<String>> {
    shlex::split(command).with_context(|| format!("unbalanced quoting in editor command `{command}`"))
}
