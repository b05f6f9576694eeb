//! Compile task: preconditions, classpath preparation, dependency
//! resolution, then one compiler run per target.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::compiler::{CompileOutcome, Compiler};
use crate::error::{CompileError, Result};
use crate::invocation::{CompilerPlugin, Invocation, Target};
use crate::resolve::{DependencyResolver, Descriptor};
use crate::spec::{CompilePlan, CompileSpec};

/// Plugin id the documentation plugin registers under.
pub const DOC_PLUGIN_ID: &str = "org.jetbrains.kotlin.kdoc";

/// A compile request bound to the directory its relative paths refer to.
#[derive(Debug, Clone)]
pub struct KotlinCompile {
    spec: CompileSpec,
    base_dir: PathBuf,
}

/// Invocations ready to run, plus the jars that make up the compiler.
#[derive(Debug, Clone)]
pub struct PreparedCompile {
    pub compiler_jars: Vec<PathBuf>,
    pub invocations: Vec<Invocation>,
}

impl KotlinCompile {
    pub fn new(spec: CompileSpec, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            spec,
            base_dir: base_dir.into(),
        }
    }

    pub fn spec(&self) -> &CompileSpec {
        &self.spec
    }

    /// Check preconditions, create missing classpath and output
    /// directories, and resolve the compiler and doc plugin.
    pub fn prepare(&self, resolver: &dyn DependencyResolver) -> Result<PreparedCompile> {
        let plan = self.spec.plan(&self.base_dir)?;

        prepare_classpath(&plan.classpath)?;
        for target in &plan.targets {
            prepare_destination(target)?;
        }

        let compiler_jars = if plan.kotlin_jars.is_empty() {
            resolver.resolve_all(&Descriptor::compiler()?)?
        } else {
            plan.kotlin_jars.clone()
        };

        let plugins: Vec<CompilerPlugin> = doc_plugin(&plan, resolver).into_iter().collect();

        let invocations = plan
            .targets
            .iter()
            .cloned()
            .map(|target| Invocation {
                target,
                classpath: plan.classpath.clone(),
                stdlib: plan.stdlib.clone(),
                include_runtime: plan.include_runtime,
                verbose: plan.verbose,
                plugins: plugins.clone(),
            })
            .collect();

        Ok(PreparedCompile {
            compiler_jars,
            invocations,
        })
    }
}

impl PreparedCompile {
    /// Run every invocation in order, stopping at the first failure.
    pub async fn execute(&self, compiler: &dyn Compiler) -> Result<Vec<CompileOutcome>> {
        let mut outcomes = Vec::with_capacity(self.invocations.len());
        for invocation in &self.invocations {
            info!(unit = %invocation.target, "Compiling");
            let outcome = compiler.compile(invocation).await?;
            if !outcome.passed() {
                return Err(CompileError::CompilerFailed {
                    target: outcome.target.clone(),
                    exit_code: outcome.exit_code,
                    diagnostics: outcome.diagnostics().to_string(),
                });
            }
            if invocation.verbose && !outcome.stdout.trim().is_empty() {
                debug!(unit = %invocation.target, output = %outcome.stdout.trim(), "Compiler output");
            }
            info!(unit = %invocation.target, duration_ms = outcome.duration_ms, "Compiled");
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Create absent classpath directories. Entries that look like archives
/// are left alone; the compiler reports them if they are really missing.
fn prepare_classpath(classpath: &[PathBuf]) -> Result<()> {
    for entry in classpath {
        if entry.exists() {
            continue;
        }
        if is_archive(entry) {
            warn!(path = %entry.display(), "Classpath archive does not exist");
            continue;
        }
        debug!(path = %entry.display(), "Creating classpath directory");
        std::fs::create_dir_all(entry)?;
    }
    Ok(())
}

fn prepare_destination(target: &Target) -> Result<()> {
    match target {
        Target::Directory { output, .. } => std::fs::create_dir_all(output)?,
        Target::Archive { jar, .. } | Target::Module { jar: Some(jar), .. } => {
            if let Some(parent) = jar.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }
        Target::Module { jar: None, .. } => {}
    }
    Ok(())
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip"))
}

/// Resolve the doc plugin when doc output is requested. A plugin that
/// cannot be resolved is skipped with a warning.
fn doc_plugin(plan: &CompilePlan, resolver: &dyn DependencyResolver) -> Option<CompilerPlugin> {
    let output = plan.doc_output.as_ref()?;
    let jars = Descriptor::doc_plugin().and_then(|descriptor| resolver.resolve_all(&descriptor));
    match jars {
        Ok(jars) => Some(CompilerPlugin {
            jars,
            options: vec![format!(
                "plugin:{DOC_PLUGIN_ID}:outputDir={}",
                output.display()
            )],
        }),
        Err(err) => {
            warn!(error = %err, "Documentation plugin unavailable, skipping documentation");
            None
        }
    }
}
