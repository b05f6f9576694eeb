//! Compile request and its preconditions.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};
use crate::invocation::Target;

/// Inputs of one compile request.
///
/// Either `module` or `sources` is set, never both. Relative paths are
/// resolved against the base directory passed to [`CompileSpec::plan`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileSpec {
    pub sources: Vec<PathBuf>,
    /// Module descriptor compiled as one unit.
    pub module: Option<PathBuf>,
    /// Jar destination.
    pub jar: Option<PathBuf>,
    /// Directory destination for loose class files.
    pub output: Option<PathBuf>,
    /// Runtime-library override.
    pub stdlib: Option<PathBuf>,
    /// Documentation output; enables the doc plugin.
    pub doc_output: Option<PathBuf>,
    pub include_runtime: bool,
    pub verbose: bool,
    pub classpath: BTreeSet<PathBuf>,
    /// Explicit compiler jars; skips descriptor resolution when non-empty.
    pub kotlin_jars: Vec<PathBuf>,
}

/// Validated, absolute form of a [`CompileSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilePlan {
    pub targets: Vec<Target>,
    pub classpath: Vec<PathBuf>,
    pub stdlib: Option<PathBuf>,
    pub doc_output: Option<PathBuf>,
    pub kotlin_jars: Vec<PathBuf>,
    pub include_runtime: bool,
    pub verbose: bool,
}

impl CompileSpec {
    /// Module compile.
    pub fn module(module: impl Into<PathBuf>) -> Self {
        Self {
            module: Some(module.into()),
            ..Self::default()
        }
    }

    /// Source compile into `output`.
    pub fn sources_to_dir<I, P>(sources: I, output: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            output: Some(output.into()),
            ..Self::default()
        }
    }

    pub fn with_classpath<I, P>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.classpath.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Check preconditions and expand into one target per operation.
    ///
    /// Touches the filesystem only to check the runtime-library override.
    pub fn plan(&self, base_dir: &Path) -> Result<CompilePlan> {
        self.check_paths()?;
        let abs = |path: &Path| absolute(base_dir, path);

        let targets = match &self.module {
            Some(_) if !self.sources.is_empty() => return Err(CompileError::ModuleWithSources),
            Some(module) => vec![Target::Module {
                module: abs(module),
                jar: self.jar.as_deref().map(abs),
            }],
            None => self.source_targets(base_dir)?,
        };

        if self.classpath.is_empty() {
            return Err(CompileError::EmptyClasspath);
        }

        let stdlib = match &self.stdlib {
            Some(path) => {
                let path = abs(path);
                if !path.is_file() {
                    return Err(CompileError::MissingRuntimeLibrary(path));
                }
                Some(path)
            }
            None => None,
        };

        if self.include_runtime && self.module.is_none() && self.jar.is_none() {
            return Err(CompileError::RuntimeWithoutArchive);
        }

        let classpath: BTreeSet<PathBuf> = self.classpath.iter().map(|p| abs(p)).collect();

        Ok(CompilePlan {
            targets,
            classpath: classpath.into_iter().collect(),
            stdlib,
            doc_output: self.doc_output.as_deref().map(abs),
            kotlin_jars: self.kotlin_jars.iter().map(|p| abs(p)).collect(),
            include_runtime: self.include_runtime,
            verbose: self.verbose,
        })
    }

    /// Reject options given as empty paths.
    fn check_paths(&self) -> Result<()> {
        if is_empty_path(&self.jar) || is_empty_path(&self.output) {
            return Err(CompileError::MissingDestination);
        }
        if is_empty_path(&self.module) {
            return Err(CompileError::EmptyPath("module"));
        }
        if self.sources.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(CompileError::EmptyPath("source"));
        }
        if self.classpath.iter().any(|p| p.as_os_str().is_empty()) {
            return Err(CompileError::EmptyPath("classpath"));
        }
        if is_empty_path(&self.doc_output) {
            return Err(CompileError::EmptyPath("doc output"));
        }
        Ok(())
    }

    fn source_targets(&self, base_dir: &Path) -> Result<Vec<Target>> {
        if self.sources.is_empty() {
            return Err(CompileError::MissingSources);
        }
        let abs = |path: &Path| absolute(base_dir, path);

        match (&self.jar, &self.output) {
            (Some(jar), _) => match self.sources.as_slice() {
                [source] => Ok(vec![Target::Archive {
                    source: abs(source),
                    jar: abs(jar),
                }]),
                many => Err(CompileError::MultipleSourcesForArchive(many.len())),
            },
            (None, Some(output)) => {
                let output = abs(output);
                Ok(self
                    .sources
                    .iter()
                    .map(|source| Target::Directory {
                        source: abs(source),
                        output: output.clone(),
                    })
                    .collect())
            }
            (None, None) => Err(CompileError::MissingDestination),
        }
    }
}

fn is_empty_path(path: &Option<PathBuf>) -> bool {
    path.as_ref().is_some_and(|p| p.as_os_str().is_empty())
}

fn absolute(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
