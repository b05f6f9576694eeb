//! External compiler execution.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{CompileError, Result};
use crate::invocation::{join_classpath, Invocation};

/// Entry point of the JVM compiler.
pub const MAIN_CLASS: &str = "org.jetbrains.kotlin.cli.jvm.K2JVMCompiler";

/// Result of one compiler run.
#[derive(Debug, Clone)]
pub struct CompileOutcome {
    /// Display form of the compiled target.
    pub target: String,

    /// Exit code (0 = success).
    pub exit_code: i32,

    pub stdout: String,
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    pub success: bool,
}

impl CompileOutcome {
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }

    /// Compiler output for error reports; stderr first, stdout as fallback.
    pub fn diagnostics(&self) -> &str {
        if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        }
    }
}

/// Runs one compiler operation.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn compile(&self, invocation: &Invocation) -> Result<CompileOutcome>;
}

/// Launches the compiler in a child JVM.
#[derive(Debug, Clone)]
pub struct ProcessCompiler {
    java: PathBuf,
    compiler_jars: Vec<PathBuf>,
    timeout_secs: u64,
}

impl ProcessCompiler {
    pub fn new(java: impl Into<PathBuf>, compiler_jars: Vec<PathBuf>) -> Self {
        Self {
            java: java.into(),
            compiler_jars,
            timeout_secs: 0,
        }
    }

    /// Kill the compiler after `secs` seconds; 0 waits forever.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Full command line, launcher first.
    pub fn command_line(&self, invocation: &Invocation) -> Result<Vec<String>> {
        let mut command = vec![
            self.java.display().to_string(),
            "-cp".to_string(),
            join_classpath(&self.compiler_jars)?,
            MAIN_CLASS.to_string(),
        ];
        command.extend(invocation.arguments()?);
        Ok(command)
    }
}

#[async_trait]
impl Compiler for ProcessCompiler {
    async fn compile(&self, invocation: &Invocation) -> Result<CompileOutcome> {
        let start = Instant::now();
        let command = self.command_line(invocation)?;
        debug!(unit = %invocation.target, command = ?command, "Launching compiler");

        let child = Command::new(&command[0])
            .args(&command[1..])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = if self.timeout_secs > 0 {
            tokio::time::timeout(
                Duration::from_secs(self.timeout_secs),
                child.wait_with_output(),
            )
            .await
            .map_err(|_| CompileError::Timeout(self.timeout_secs))??
        } else {
            child.wait_with_output().await?
        };

        Ok(CompileOutcome {
            target: invocation.target.to_string(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: start.elapsed().as_millis() as u64,
            success: output.status.success(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::Target;

    fn invocation() -> Invocation {
        Invocation::new(
            Target::Directory {
                source: PathBuf::from("/work/src"),
                output: PathBuf::from("/work/classes"),
            },
            vec![PathBuf::from("/work/lib")],
        )
    }

    #[test]
    fn test_outcome_diagnostics_prefers_stderr() {
        let mut outcome = CompileOutcome {
            target: "src".to_string(),
            exit_code: 1,
            stdout: "info: compiling\n".to_string(),
            stderr: "error: unresolved reference\n".to_string(),
            duration_ms: 10,
            success: false,
        };
        assert!(!outcome.passed());
        assert_eq!(outcome.diagnostics(), "error: unresolved reference");
        outcome.stderr.clear();
        assert_eq!(outcome.diagnostics(), "info: compiling");
    }

    #[test]
    fn test_command_line() {
        let compiler = ProcessCompiler::new(
            "java",
            vec![PathBuf::from("/repo/kotlin-compiler.jar")],
        );
        let command = compiler.command_line(&invocation()).unwrap();
        assert_eq!(
            &command[..5],
            &["java", "-cp", "/repo/kotlin-compiler.jar", MAIN_CLASS, "/work/src"]
        );
    }

    #[tokio::test]
    async fn test_process_output_captured() {
        // `echo` stands in for the JVM and prints the arguments it receives.
        let compiler = ProcessCompiler::new("echo", vec![PathBuf::from("/repo/c.jar")]);
        let outcome = compiler.compile(&invocation()).await.unwrap();
        assert!(outcome.passed());
        assert!(outcome.stdout.contains(MAIN_CLASS));
        assert!(outcome.stdout.contains("-classpath /work/lib"));
    }

    #[tokio::test]
    async fn test_process_failure_exit_code() {
        let compiler = ProcessCompiler::new("false", vec![PathBuf::from("/repo/c.jar")]);
        let outcome = compiler.compile(&invocation()).await.unwrap();
        assert!(!outcome.passed());
        assert_ne!(outcome.exit_code, 0);
    }

    #[tokio::test]
    async fn test_missing_launcher_is_io_error() {
        let compiler = ProcessCompiler::new(
            "/nonexistent/bin/java",
            vec![PathBuf::from("/repo/c.jar")],
        );
        assert!(matches!(
            compiler.compile(&invocation()).await,
            Err(CompileError::Io(_))
        ));
    }
}
