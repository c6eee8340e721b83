//! Submission discovery and code-shape validation.
//!
//! The validator is a policy filter over the submitted source text, not a
//! sandbox: it constrains shape (one function definition, no semicolons, an
//! allow-list of top-level line forms), then binds the declared callable
//! name to a [`StrategyKind`] from the static catalog. Submissions are
//! never executed as code.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::strategy::StrategyKind;

/// A code shape the submission policy rejects.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("expected exactly 1 function definition, found {found}")]
    WrongDefinitionCount { found: usize },
    #[error("semicolons are forbidden")]
    Semicolon,
    #[error("line {line}: importing an OS facility is forbidden: `{text}`")]
    ForbiddenImport { line: usize, text: String },
    #[error("line {line}: statement not allowed at top level: `{text}`")]
    DisallowedStatement { line: usize, text: String },
    #[error("no function definition line found")]
    MissingDefinition,
}

/// Why registry construction failed. Every variant aborts the whole load;
/// no partial registry is ever produced.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{file}: {violation}")]
    Rejected {
        file: String,
        violation: PolicyViolation,
    },
    #[error("{file}: callable `{name}` is already registered")]
    DuplicateCallable { file: String, name: String },
    #[error("{file}: no registered implementation for callable `{name}`")]
    UnknownCallable { file: String, name: String },
}

/// A validated submission bound to its implementation.
#[derive(Clone, Debug)]
pub struct StrategyEntry {
    /// Submission file name without its extension.
    pub file_key: String,
    /// Function name declared in the submission.
    pub callable: String,
    /// Implementation registered under that callable name.
    pub kind: StrategyKind,
}

/// The validated strategy set for one league run. Built once, immutable
/// afterward. Callable names are unique across the registry.
#[derive(Clone, Debug, Default)]
pub struct StrategyRegistry {
    entries: Vec<StrategyEntry>,
}

impl StrategyRegistry {
    /// Scan `directory`, validate every submission and bind each callable
    /// name to its catalog implementation.
    ///
    /// The `__pycache__` cache entry is the only thing the scan skips:
    /// every other entry is read as a submission, so a stray subdirectory
    /// or hidden file fails the load like any invalid submission would.
    /// Entries are ordered by file name so the report layout of a run is
    /// deterministic.
    pub fn load(directory: &Path) -> Result<Self, RegistryError> {
        let reader = fs::read_dir(directory).map_err(|source| RegistryError::Io {
            path: directory.to_owned(),
            source,
        })?;
        let mut paths: Vec<PathBuf> = reader
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        paths.sort();

        let mut entries: Vec<StrategyEntry> = Vec::new();
        for path in paths {
            if is_cache_artifact(&path) {
                continue;
            }
            let file = display_name(&path);
            debug!(file = %file, "checking submission");

            let source = fs::read_to_string(&path).map_err(|source| RegistryError::Io {
                path: path.clone(),
                source,
            })?;
            let callable = validate_source(&source).map_err(|violation| {
                RegistryError::Rejected {
                    file: file.clone(),
                    violation,
                }
            })?;

            if entries.iter().any(|e| e.callable == callable) {
                return Err(RegistryError::DuplicateCallable { file, name: callable });
            }
            let kind = StrategyKind::for_callable(&callable).ok_or_else(|| {
                RegistryError::UnknownCallable {
                    file: file.clone(),
                    name: callable.clone(),
                }
            })?;

            let file_key = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.clone());
            debug!(file_key = %file_key, callable = %callable, "strategy registered");
            entries.push(StrategyEntry {
                file_key,
                callable,
                kind,
            });
        }

        Ok(Self { entries })
    }

    /// Assemble a registry from already-validated entries, for ad hoc
    /// sub-tournaments. The duplicate-callable invariant still holds.
    pub fn from_entries(entries: Vec<StrategyEntry>) -> Result<Self, RegistryError> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i].iter().any(|e| e.callable == entry.callable) {
                return Err(RegistryError::DuplicateCallable {
                    file: entry.file_key.clone(),
                    name: entry.callable.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// Entries in registry order.
    pub fn entries(&self) -> &[StrategyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Callable names in registry order.
    pub fn callables(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.callable.clone()).collect()
    }
}

/// Validate a submission's code shape and extract its callable name.
///
/// The allow-list: blank lines, comment lines, string-literal (docstring)
/// lines, indented body lines, `import`/`from` lines that do not name the
/// OS module, and exactly one `def name(...):` line. Anything else is a
/// violation naming the offending line.
fn validate_source(source: &str) -> Result<String, PolicyViolation> {
    let def_count = source.matches("def ").count();
    if def_count != 1 {
        return Err(PolicyViolation::WrongDefinitionCount { found: def_count });
    }
    if source.contains(';') {
        return Err(PolicyViolation::Semicolon);
    }

    let mut callable = None;
    for (idx, line) in source.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        if line.starts_with("def ")
            && line.contains('(')
            && line.contains(')')
            && line.contains(':')
        {
            callable = line
                .split('(')
                .next()
                .and_then(|head| head.split_whitespace().last())
                .map(str::to_owned);
        } else if line.starts_with(char::is_whitespace)
            || line.starts_with('#')
            || line.starts_with('\'')
            || line.starts_with('"')
        {
            continue;
        } else if line.starts_with("from") || line.starts_with("import") {
            if imports_os(line) {
                return Err(PolicyViolation::ForbiddenImport {
                    line: idx + 1,
                    text: line.to_owned(),
                });
            }
        } else {
            return Err(PolicyViolation::DisallowedStatement {
                line: idx + 1,
                text: line.to_owned(),
            });
        }
    }

    callable.ok_or(PolicyViolation::MissingDefinition)
}

/// An import line may not name the `os` module or any of its submodules.
fn imports_os(line: &str) -> bool {
    line.split_whitespace().any(|token| {
        let token = token.trim_end_matches(',');
        token == "os" || token.starts_with("os.")
    })
}

/// The cache directory is the one entry the scan does not treat as a
/// submission.
fn is_cache_artifact(path: &Path) -> bool {
    path.file_name()
        .map(|name| name == "__pycache__")
        .unwrap_or(false)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
