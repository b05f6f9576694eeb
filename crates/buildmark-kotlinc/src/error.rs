//! Error types for buildmark-kotlinc

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing or running a compilation.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Neither a module descriptor nor any source location was given
    #[error("no source locations to compile")]
    MissingSources,

    /// Source locations given without a jar or output directory
    #[error("no destination: set a jar or an output directory")]
    MissingDestination,

    #[error("classpath is empty")]
    EmptyClasspath,

    /// Runtime-library override does not name an existing file
    #[error("runtime library not found: {}", .0.display())]
    MissingRuntimeLibrary(PathBuf),

    /// `include_runtime` without a module or jar destination
    #[error("including the runtime requires a module or a jar destination")]
    RuntimeWithoutArchive,

    #[error("a module descriptor and source locations cannot be combined")]
    ModuleWithSources,

    /// A jar destination takes exactly one source location
    #[error("a jar destination takes exactly one source location, got {0}")]
    MultipleSourcesForArchive(usize),

    /// A path option given as an empty string
    #[error("empty {0} path")]
    EmptyPath(&'static str),

    /// Malformed line in a dependency descriptor
    #[error("invalid dependency coordinate: {0}")]
    InvalidCoordinate(String),

    /// Dependency missing from the local repository
    #[error("dependency {coordinate} not found at {}", .path.display())]
    UnresolvedDependency { coordinate: String, path: PathBuf },

    /// Compiler exited non-zero
    #[error("compiler failed for {target} with exit code {exit_code}: {diagnostics}")]
    CompilerFailed {
        target: String,
        exit_code: i32,
        diagnostics: String,
    },

    #[error("compiler timed out after {0} seconds")]
    Timeout(u64),

    /// A path that cannot be placed on a classpath
    #[error("invalid classpath entry: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
