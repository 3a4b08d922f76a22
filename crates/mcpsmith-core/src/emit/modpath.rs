//! Import-path discovery for the generated tools directory.
//!
//! Walks from the output directory towards the filesystem root looking for
//! the owning crate's `Cargo.toml`, then derives the `::`-joined module path
//! of the tools directory relative to the crate's `src/` root. The walk is
//! bounded so a stray invocation cannot scan the whole disk.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const MAX_SEARCH_DEPTH: usize = 50;
const MANIFEST_FILE: &str = "Cargo.toml";

/// Resolve the importable module path of `<output_dir>/mcptools`.
pub fn tools_import_path(output_dir: &Path) -> Result<String> {
    let absolute = if output_dir.is_absolute() {
        output_dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(output_dir)
    };
    let tools_dir = absolute.join("mcptools");

    let (package_name, crate_root) = find_package(&tools_dir)?;

    let relative = tools_dir.strip_prefix(&crate_root).map_err(|_| {
        Error::emit(format!(
            "{} is not inside crate root {}",
            tools_dir.display(),
            crate_root.display()
        ))
    })?;

    let mut segments = vec![package_name.replace('-', "_")];
    let mut components = relative.components().peekable();
    if components
        .peek()
        .is_some_and(|c| c.as_os_str() == std::ffi::OsStr::new("src"))
    {
        components.next();
    }
    for component in components {
        segments.push(component.as_os_str().to_string_lossy().replace('-', "_"));
    }
    Ok(segments.join("::"))
}

/// Walk upward from `start` to find the nearest `Cargo.toml` with a
/// `[package]` section.
fn find_package(start: &Path) -> Result<(String, PathBuf)> {
    let mut current = start.to_path_buf();
    for _ in 0..MAX_SEARCH_DEPTH {
        let manifest = current.join(MANIFEST_FILE);
        if manifest.is_file() {
            let name = parse_package_name(&manifest)?;
            return Ok((name, current));
        }
        if !current.pop() {
            break;
        }
    }
    Err(Error::emit(format!(
        "no {MANIFEST_FILE} found within {MAX_SEARCH_DEPTH} levels of {}",
        start.display()
    )))
}

fn parse_package_name(manifest_path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(manifest_path)?;
    let manifest: toml::Value = toml::from_str(&content).map_err(|e| {
        Error::emit(format!(
            "invalid manifest {}: {e}",
            manifest_path.display()
        ))
    })?;
    manifest
        .get("package")
        .and_then(|package| package.get("name"))
        .and_then(|name| name.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::emit(format!(
                "no [package].name in {}",
                manifest_path.display()
            ))
        })
}
