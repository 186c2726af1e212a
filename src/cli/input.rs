//! Input file expansion
//!
//! Turns the `FILES` arguments of `ingest` into a sorted list of paths.
//! Each argument is a plain file, a directory walked recursively for files
//! with the configured extension, or a glob pattern.

use crate::{Error, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

fn is_pattern(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Files of a directory tree with the given extension
pub fn discover_input_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), extension))
        .map(|entry| entry.into_path())
        .collect()
}

/// Expand file, directory and glob arguments into a sorted, de-duplicated file list.
///
/// Records are batched by date in input order, so a stable order matters:
/// files are sorted by path.
pub fn expand_inputs(args: &[String], extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = BTreeSet::new();

    for arg in args {
        if is_pattern(arg) {
            let paths = glob::glob(arg)
                .map_err(|e| Error::configuration(format!("Invalid pattern '{}': {}", arg, e)))?;
            let before = files.len();
            for entry in paths {
                match entry {
                    Ok(path) if path.is_file() => {
                        files.insert(path);
                    }
                    Ok(path) if path.is_dir() => files.extend(discover_input_files(&path, extension)),
                    Ok(_) => {}
                    Err(e) => warn!("Unreadable match for '{}': {}", arg, e),
                }
            }
            if files.len() == before {
                warn!("Pattern '{}' matched no files", arg);
            }
            continue;
        }

        let path = PathBuf::from(arg);
        if path.is_dir() {
            let found = discover_input_files(&path, extension);
            debug!("{}: {} .{} files", path.display(), found.len(), extension);
            files.extend(found);
        } else if path.is_file() {
            files.insert(path);
        } else {
            return Err(Error::configuration(format!(
                "Input path does not exist: {}",
                path.display()
            )));
        }
    }

    if files.is_empty() {
        return Err(Error::configuration("No input files found"));
    }
    Ok(files.into_iter().collect())
}
