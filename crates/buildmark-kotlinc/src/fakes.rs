//! In-memory fakes for the compiler and resolver traits (testing only)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::compiler::{CompileOutcome, Compiler};
use crate::error::{CompileError, Result};
use crate::invocation::Invocation;
use crate::resolve::{Coordinate, DependencyResolver};

/// Compiler that records every invocation instead of running anything.
///
/// Invocations whose input path was registered with
/// [`RecordingCompiler::fail_on`] report exit code 1.
#[derive(Debug, Default)]
pub struct RecordingCompiler {
    calls: Mutex<Vec<Invocation>>,
    failing: Mutex<Vec<PathBuf>>,
}

impl RecordingCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make compilations of `input` fail.
    pub fn fail_on(&self, input: impl Into<PathBuf>) {
        self.failing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(input.into());
    }

    /// Invocations seen so far, in order.
    pub fn calls(&self) -> Vec<Invocation> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn fails(&self, input: &Path) -> bool {
        self.failing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .any(|p| p == input)
    }
}

#[async_trait]
impl Compiler for RecordingCompiler {
    async fn compile(&self, invocation: &Invocation) -> Result<CompileOutcome> {
        // Argument rendering errors surface the same way as in a real run.
        invocation.arguments()?;
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(invocation.clone());

        let failed = self.fails(invocation.target.input());
        Ok(CompileOutcome {
            target: invocation.target.to_string(),
            exit_code: if failed { 1 } else { 0 },
            stdout: String::new(),
            stderr: if failed {
                format!("error: compilation of {} failed", invocation.target)
            } else {
                String::new()
            },
            duration_ms: 0,
            success: !failed,
        })
    }
}

/// Resolver backed by a fixed coordinate-to-path map.
#[derive(Debug, Default)]
pub struct StaticResolver {
    jars: HashMap<String, PathBuf>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` for the coordinate written as `group:artifact:version`.
    pub fn with(mut self, coordinate: &str, path: impl Into<PathBuf>) -> Self {
        self.jars.insert(coordinate.to_string(), path.into());
        self
    }

    /// Answer every coordinate with a path under `/repo`.
    pub fn resolving_all<'a>(coordinates: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        coordinates.into_iter().fold(Self::new(), |resolver, c| {
            let path = Path::new("/repo").join(c.repository_path());
            resolver.with(&c.to_string(), path)
        })
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self, coordinate: &Coordinate) -> Result<PathBuf> {
        let key = coordinate.to_string();
        self.jars
            .get(&key)
            .cloned()
            .ok_or_else(|| CompileError::UnresolvedDependency {
                path: Path::new("/repo").join(coordinate.repository_path()),
                coordinate: key,
            })
    }
}
