//! Shared directory utilities.

use std::{
    fs::{create_dir_all, read_dir, remove_dir_all},
    path::{Path, PathBuf},
};

use crate::{
    config::FONT_EXTENSIONS,
    error::{Error, Result},
};

/// List font files in `dir`, sorted by filename.
///
/// Extensions are matched case-insensitively; `read_dir` is used instead of a
/// glob pattern because globs cannot express that.
pub fn list_fonts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut fonts: Vec<PathBuf> = read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_font_extension(path))
        .collect();
    fonts.sort();
    Ok(fonts)
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FONT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Filenames in `dir`, for diagnostics when no fonts are found.
pub fn dir_contents(dir: &Path) -> Vec<String> {
    read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default()
}

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    create_dir_all(dir).map_err(|e| Error::io(dir, e))
}

/// Clear `dir` and create it fresh.
pub fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        remove_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    ensure_dir(dir)
}
