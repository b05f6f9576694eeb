//! A single compiler operation and its command-line arguments.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CompileError, Result};

/// What one compiler operation produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// Whole module descriptor, optionally into a single jar.
    Module { module: PathBuf, jar: Option<PathBuf> },
    /// One source location straight into a jar.
    Archive { source: PathBuf, jar: PathBuf },
    /// One source location into loose class files.
    Directory { source: PathBuf, output: PathBuf },
}

impl Target {
    /// Path the operation reads from.
    pub fn input(&self) -> &Path {
        match self {
            Target::Module { module, .. } => module,
            Target::Archive { source, .. } | Target::Directory { source, .. } => source,
        }
    }

    /// Jar or directory the operation writes, if it names one.
    pub fn destination(&self) -> Option<&Path> {
        match self {
            Target::Module { jar, .. } => jar.as_deref(),
            Target::Archive { jar, .. } => Some(jar),
            Target::Directory { output, .. } => Some(output),
        }
    }

    fn produces_archive(&self) -> bool {
        matches!(
            self,
            Target::Module { .. } | Target::Archive { .. }
        )
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.destination() {
            Some(dest) => write!(f, "{} -> {}", self.input().display(), dest.display()),
            None => write!(f, "{}", self.input().display()),
        }
    }
}

/// A compiler plugin jar and the `-P` options addressed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerPlugin {
    pub jars: Vec<PathBuf>,
    pub options: Vec<String>,
}

/// Everything needed to run the compiler once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub target: Target,
    /// Absolute classpath entries, in order.
    pub classpath: Vec<PathBuf>,
    /// Runtime-library override; replaces the bundled standard library.
    pub stdlib: Option<PathBuf>,
    pub include_runtime: bool,
    pub verbose: bool,
    pub plugins: Vec<CompilerPlugin>,
}

impl Invocation {
    pub fn new(target: Target, classpath: Vec<PathBuf>) -> Self {
        Self {
            target,
            classpath,
            stdlib: None,
            include_runtime: false,
            verbose: false,
            plugins: Vec::new(),
        }
    }

    /// Compiler arguments, without the JVM launcher.
    pub fn arguments(&self) -> Result<Vec<String>> {
        let mut args = Vec::new();
        match &self.target {
            Target::Module { module, jar } => {
                args.push(format!("-Xbuild-file={}", module.display()));
                if let Some(jar) = jar {
                    args.push("-d".to_string());
                    args.push(jar.display().to_string());
                }
            }
            Target::Archive { source, jar } => {
                args.push(source.display().to_string());
                args.push("-d".to_string());
                args.push(jar.display().to_string());
            }
            Target::Directory { source, output } => {
                args.push(source.display().to_string());
                args.push("-d".to_string());
                args.push(output.display().to_string());
            }
        }
        if self.include_runtime && self.target.produces_archive() {
            args.push("-include-runtime".to_string());
        }

        let mut classpath = self.classpath.clone();
        if let Some(stdlib) = &self.stdlib {
            classpath.push(stdlib.clone());
        }
        if !classpath.is_empty() {
            args.push("-classpath".to_string());
            args.push(join_classpath(&classpath)?);
        }
        if self.stdlib.is_some() {
            args.push("-no-stdlib".to_string());
        }
        if self.verbose {
            args.push("-verbose".to_string());
        }
        for plugin in &self.plugins {
            for jar in &plugin.jars {
                args.push(format!("-Xplugin={}", jar.display()));
            }
            for option in &plugin.options {
                args.push("-P".to_string());
                args.push(option.clone());
            }
        }
        Ok(args)
    }
}

/// Join paths with the platform classpath separator.
pub fn join_classpath(paths: &[PathBuf]) -> Result<String> {
    let joined = std::env::join_paths(paths)
        .map_err(|e| CompileError::InvalidPath(e.to_string()))?;
    joined
        .into_string()
        .map_err(|raw| CompileError::InvalidPath(raw.to_string_lossy().into_owned()))
}
