use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::generator::Stage;

/// Top-level error type returned by a generator run.
///
/// Every variant is terminal: the run stops at the first failure and no
/// artifact is written after it.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The target package could not be read or analyzed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The rendered text is not well-formed Rust.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A reference in the generated code could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The artifact could not be persisted.
    #[error(transparent)]
    Write(#[from] WriteError),
}

impl GenerateError {
    /// The pipeline stage the run failed in.
    pub fn stage(&self) -> Stage {
        match self {
            GenerateError::Load(_) => Stage::Loading,
            GenerateError::Format(_) => Stage::Canonicalizing,
            GenerateError::Resolve(_) => Stage::Canonicalizing,
            GenerateError::Write(_) => Stage::Writing,
        }
    }
}

/// Failure to load or statically analyze the target package.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("package path {} does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("package path {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("no module entry file (mod.rs, lib.rs or main.rs) in {}", path.display())]
    NoEntryFile { path: PathBuf },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("syntax error in {}:{line}:{column}: {message}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("file not found for module `{module}` declared in {}", declared_in.display())]
    ModuleNotFound { module: String, declared_in: PathBuf },

    #[error("unresolved import `self::{name}` in {}", path.display())]
    UnresolvedImport { name: String, path: PathBuf },

    #[error("the name `{name}` is defined multiple times in {}", path.display())]
    DuplicateDefinition { name: String, path: PathBuf },

    #[error("cycle detected when resolving type alias `{name}`")]
    CyclicAlias { name: String },

    #[error("invalid config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

/// Rendered text that failed to parse as a Rust source file.
#[derive(Debug, Error)]
#[error("generated source is malformed at {line}:{column}: {message}")]
pub struct FormatError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<syn::Error> for FormatError {
    fn from(err: syn::Error) -> Self {
        let start = err.span().start();
        Self {
            line: start.line,
            column: start.column + 1,
            message: err.to_string(),
        }
    }
}

/// A reference in the generated code with no known origin.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cannot resolve `{name}` in generated code")]
    Unresolved { name: String },

    #[error("cannot resolve macro `{name}!` in generated code")]
    UnresolvedMacro { name: String },

    #[error("`{name}` is imported from both `{first}` and `{second}`")]
    Conflict { name: String, first: String, second: String },

    #[error("invalid import path `{path}` for `{name}`")]
    InvalidPath { name: String, path: String },
}

/// Filesystem failure while persisting the artifact.
#[derive(Debug, Error)]
#[error("failed to write {}", path.display())]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}
