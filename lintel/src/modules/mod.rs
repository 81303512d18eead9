// SPDX-License-Identifier: GPL-3.0-or-later

//! Naming of the analysed modules, and resolution of their imports.
//!
//! A module is named after its file, prefixed by the names of the enclosing
//! directories which are packages (contain an `__init__.py` file). The
//! directory above the outermost package is the root of the module, and it
//! is searched first when resolving the imports of the module.

mod stdlib;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const PACKAGE_MARKER: &str = "__init__.py";
const SOURCE_EXTENSION: &str = "py";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No module named {0}")]
    NotFound(String),
    #[error("Attempted relative import beyond top-level package")]
    BeyondTopLevel,
}

/// A module selected for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescription {
    /// The dotted name of the module.
    pub name: String,
    /// The path as it was given, used in the messages.
    pub path: String,
    /// The absolute path of the source file. It might not exist.
    pub file: PathBuf,
    /// The directory which contains the top-level package of the module.
    pub root: PathBuf,
    /// The module is the `__init__.py` of a package.
    pub is_package: bool,
}

impl ModuleDescription {
    /// Describes the module at the given path, relative paths are taken from `cwd`.
    ///
    /// Only the enclosing directories are inspected, the file itself need not exist.
    pub fn from_path(path: &str, cwd: &Path) -> Self {
        let file = cwd.join(path);
        let stem = file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        let is_package = stem == "__init__";

        let mut parts = Vec::new();
        let mut directory = file.parent().map(Path::to_path_buf).unwrap_or_default();
        if is_package {
            if let Some(name) = directory.file_name() {
                parts.push(name.to_string_lossy().into_owned());
                directory = directory.parent().map(Path::to_path_buf).unwrap_or_default();
            }
        } else {
            parts.push(stem.clone());
        }
        while directory.join(PACKAGE_MARKER).is_file() {
            let Some(name) = directory.file_name() else { break };
            parts.push(name.to_string_lossy().into_owned());
            let Some(parent) = directory.parent() else { break };
            directory = parent.to_path_buf();
        }
        parts.reverse();
        if parts.is_empty() {
            parts.push(stem);
        }

        Self { name: parts.join("."), path: path.to_string(), file, root: directory, is_package }
    }

    /// The name of the package the module belongs to, split into parts.
    pub fn package(&self) -> Vec<&str> {
        let mut parts: Vec<&str> = self.name.split('.').collect();
        if !self.is_package {
            parts.pop();
        }
        parts
    }

    /// Makes the target of a relative import absolute.
    ///
    /// `level` is the number of leading dots, `target` is the module after them.
    pub fn absolute_import(&self, level: usize, target: Option<&str>) -> Result<String, ResolveError> {
        if level == 0 {
            return target.map(str::to_string).ok_or_else(|| ResolveError::NotFound(String::new()));
        }
        let package = self.package();
        if level > package.len() {
            return Err(ResolveError::BeyondTopLevel);
        }
        let mut parts: Vec<&str> = package[..package.len() + 1 - level].to_vec();
        if let Some(target) = target {
            parts.push(target);
        }
        Ok(parts.join("."))
    }
}

/// Expands the module arguments into the modules to analyse.
///
/// An argument can be a source file, a package directory, or a dotted module
/// name relative to `cwd`. Packages are walked for source files.
pub fn expand_modules(arguments: &[String], cwd: &Path) -> Vec<Result<ModuleDescription, ResolveError>> {
    arguments.iter().flat_map(|argument| expand(argument, cwd)).collect()
}

fn expand(argument: &str, cwd: &Path) -> Vec<Result<ModuleDescription, ResolveError>> {
    let path = cwd.join(argument);
    if path.is_file() {
        return vec![Ok(ModuleDescription::from_path(argument, cwd))];
    }
    if path.is_dir() && path.join(PACKAGE_MARKER).is_file() {
        return walk_package(Path::new(argument), cwd);
    }

    let is_dotted = !argument.is_empty()
        && argument.split('.').all(|part| !part.is_empty() && part.chars().all(|c| c == '_' || c.is_alphanumeric()));
    if is_dotted {
        let relative: PathBuf = argument.split('.').collect();
        let source = relative.with_extension(SOURCE_EXTENSION);
        if cwd.join(&source).is_file() {
            return vec![Ok(ModuleDescription::from_path(&source.to_string_lossy(), cwd))];
        }
        if cwd.join(&relative).join(PACKAGE_MARKER).is_file() {
            return walk_package(&relative, cwd);
        }
    }
    log::debug!("Module argument not found: {argument}");
    vec![Err(ResolveError::NotFound(argument.to_string()))]
}

/// Collects the source files of a package and its sub-packages, in path order.
fn walk_package(directory: &Path, cwd: &Path) -> Vec<Result<ModuleDescription, ResolveError>> {
    let mut files = Vec::new();
    collect_sources(directory, cwd, &mut files);
    files.sort();
    files
        .into_iter()
        .map(|file| Ok(ModuleDescription::from_path(&file.to_string_lossy(), cwd)))
        .collect()
}

fn collect_sources(directory: &Path, cwd: &Path, into: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(cwd.join(directory)) {
        Ok(entries) => entries,
        Err(error) => {
            log::warn!("Failed to read directory {}: {error}", directory.display());
            return;
        }
    };
    for entry in entries.flatten() {
        let name = entry.file_name();
        let relative = directory.join(&name);
        let absolute = entry.path();
        if absolute.is_dir() {
            if absolute.join(PACKAGE_MARKER).is_file() {
                collect_sources(&relative, cwd, into);
            }
        } else if relative.extension().is_some_and(|extension| extension == SOURCE_EXTENSION) {
            into.push(relative);
        }
    }
}

/// Where an import was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A source file.
    Source(PathBuf),
    /// A package directory.
    Package(PathBuf),
    /// A module of the standard library.
    Standard,
    /// A module declared as known in the configuration.
    Known,
}

/// Finds modules on the search roots of an analysed module.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    roots: Vec<PathBuf>,
    known_modules: Vec<String>,
}

impl ModuleResolver {
    /// The roots are the root of the module and the current directory, in this order.
    pub fn new(module: &ModuleDescription, cwd: &Path, known_modules: &[String]) -> Self {
        let mut roots = vec![module.root.clone()];
        if !roots.iter().any(|root| root == cwd) {
            roots.push(cwd.to_path_buf());
        }
        Self { roots, known_modules: known_modules.to_vec() }
    }

    /// Resolves an absolute dotted module name.
    pub fn resolve(&self, name: &str) -> Result<Resolution, ResolveError> {
        let top_level = name.split('.').next().unwrap_or(name);
        if stdlib::is_standard(top_level) {
            return Ok(Resolution::Standard);
        }
        let known = self.known_modules.iter().any(|known| {
            known == name || name.strip_prefix(known.as_str()).is_some_and(|rest| rest.starts_with('.'))
        });
        if known {
            return Ok(Resolution::Known);
        }

        let relative: PathBuf = name.split('.').collect();
        for root in &self.roots {
            let base = root.join(&relative);
            let source = base.with_extension(SOURCE_EXTENSION);
            if source.is_file() {
                return Ok(Resolution::Source(source));
            }
            if base.is_dir() {
                return Ok(Resolution::Package(base));
            }
        }
        Err(ResolveError::NotFound(name.to_string()))
    }
}
