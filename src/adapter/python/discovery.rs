use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::WalkBuilder;

const EXTENSION: &str = "py";

/// Python source files under `root`, sorted. Honors `.gitignore` and hidden
/// file rules.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
