//! buildmark - CI job markup generator and Kotlin compiler driver
//!
//! ## Commands
//!
//! - `render`: write a `config.xml` document for each job in a job file
//! - `check`: validate job files without writing anything
//! - `compile`: run the Kotlin compiler over a module or source locations

use anyhow::{Context, Result};
use buildmark_core::{body_digest, render, Job, JobSet, XmlStyle};
use buildmark_kotlinc::{
    CompileSpec, KotlinCompile, LocalRepositoryResolver, ProcessCompiler,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, Level};

/// Separator for path lists in flags and environment variables, as in `PATH`.
const PATH_LIST_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

#[derive(Parser)]
#[command(name = "buildmark")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CI job markup generator and Kotlin compiler driver", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render job files into config.xml documents
    Render {
        /// Job file (JSON); may be repeated
        #[arg(long = "jobs", required = true)]
        jobs: Vec<PathBuf>,

        /// Directory receiving one <job-id>.xml per job
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Render only this job id
        #[arg(long)]
        job: Option<String>,

        /// Banner timestamp, RFC 3339 (default: now)
        #[arg(long)]
        timestamp: Option<DateTime<Utc>>,

        /// Spaces per indentation level
        #[arg(long, default_value = "2")]
        indent: usize,

        /// Use CRLF line endings
        #[arg(long)]
        crlf: bool,

        /// Continue with the remaining jobs when one fails
        #[arg(long)]
        keep_going: bool,
    },

    /// Validate job files without writing output
    Check {
        /// Job file (JSON); may be repeated
        #[arg(long = "jobs", required = true)]
        jobs: Vec<PathBuf>,
    },

    /// Compile Kotlin sources or a module
    Compile(CompileArgs),
}

#[derive(Args)]
struct CompileArgs {
    /// Source location; may be repeated
    #[arg(long = "src", env = "BUILDMARK_SRC", value_delimiter = PATH_LIST_SEPARATOR)]
    sources: Vec<PathBuf>,

    /// Module descriptor (exclusive with --src)
    #[arg(long, env = "BUILDMARK_MODULE", conflicts_with = "sources")]
    module: Option<PathBuf>,

    /// Jar destination
    #[arg(long, env = "BUILDMARK_JAR")]
    jar: Option<PathBuf>,

    /// Directory destination for class files
    #[arg(short, long, env = "BUILDMARK_OUTPUT")]
    output: Option<PathBuf>,

    /// Runtime library replacing the bundled standard library
    #[arg(long, env = "BUILDMARK_STDLIB")]
    stdlib: Option<PathBuf>,

    /// Documentation output directory
    #[arg(long, env = "BUILDMARK_DOC_OUTPUT")]
    doc_output: Option<PathBuf>,

    /// Bundle the runtime into the jar
    #[arg(long, env = "BUILDMARK_INCLUDE_RUNTIME")]
    include_runtime: bool,

    /// Classpath entry; may be repeated
    #[arg(long = "classpath", env = "BUILDMARK_CLASSPATH", value_delimiter = PATH_LIST_SEPARATOR)]
    classpath: Vec<PathBuf>,

    /// Compiler jar; skips dependency resolution when given
    #[arg(long = "kotlin-jar", env = "BUILDMARK_KOTLIN_JARS", value_delimiter = PATH_LIST_SEPARATOR)]
    kotlin_jars: Vec<PathBuf>,

    /// Java launcher
    #[arg(long, env = "BUILDMARK_JAVA", default_value = "java")]
    java: PathBuf,

    /// Local Maven repository (default: ~/.m2/repository)
    #[arg(long, env = "BUILDMARK_MAVEN_REPO")]
    maven_repo: Option<PathBuf>,

    /// Compiler timeout in seconds; 0 disables it
    #[arg(long, env = "BUILDMARK_TIMEOUT_SECS", default_value = "0")]
    timeout_secs: u64,

    /// Print the compiler invocations as JSON instead of running them
    #[arg(long)]
    dry_run: bool,
}

struct RenderOptions {
    jobs: Vec<PathBuf>,
    out_dir: PathBuf,
    job: Option<String>,
    timestamp: DateTime<Utc>,
    style: XmlStyle,
    keep_going: bool,
}

#[derive(Debug, Default)]
struct RenderSummary {
    written: usize,
    unchanged: usize,
    failed: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    buildmark_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Render {
            jobs,
            out_dir,
            job,
            timestamp,
            indent,
            crlf,
            keep_going,
        } => {
            let options = RenderOptions {
                jobs,
                out_dir,
                job,
                timestamp: timestamp.unwrap_or_else(Utc::now),
                style: XmlStyle::new(" ".repeat(indent), if crlf { "\r\n" } else { "\n" }),
                keep_going,
            };
            let summary = cmd_render(&options)?;
            println!(
                "Rendered {} job(s): {} written, {} unchanged",
                summary.written + summary.unchanged,
                summary.written,
                summary.unchanged
            );
            if !summary.failed.is_empty() {
                anyhow::bail!(
                    "{} job(s) failed to render: {}",
                    summary.failed.len(),
                    summary.failed.join(", ")
                );
            }
            Ok(())
        }
        Commands::Check { jobs } => {
            let count = cmd_check(&jobs)?;
            println!("✓ {} job(s) valid", count);
            Ok(())
        }
        Commands::Compile(args) => cmd_compile(args, cli.verbose).await,
    }
}

fn load_jobs(paths: &[PathBuf]) -> Result<JobSet> {
    let mut set = JobSet::default();
    for path in paths {
        let loaded = JobSet::load(path)
            .with_context(|| format!("Failed to load job file {}", path.display()))?;
        set.extend(loaded)
            .with_context(|| format!("Failed to merge job file {}", path.display()))?;
    }
    Ok(set)
}

/// Render the selected jobs into `out_dir`.
fn cmd_render(options: &RenderOptions) -> Result<RenderSummary> {
    let set = load_jobs(&options.jobs)?;
    let index = set.index();

    let selected: Vec<&Job> = match &options.job {
        Some(id) => vec![set
            .get(id)
            .with_context(|| format!("Unknown job: {}", id))?],
        None => set.jobs().iter().collect(),
    };

    std::fs::create_dir_all(&options.out_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            options.out_dir.display()
        )
    })?;

    let mut summary = RenderSummary::default();
    for job in selected {
        let path = options.out_dir.join(output_file_name(&job.id));
        let result = render(job, &index, options.timestamp, &options.style)
            .with_context(|| format!("Failed to render job {}", job.id))
            .and_then(|xml| write_if_changed(&path, &xml));

        match result {
            Ok(true) => {
                info!(job = %job.id, path = %path.display(), "Wrote job markup");
                summary.written += 1;
            }
            Ok(false) => {
                debug!(job = %job.id, "Markup unchanged");
                summary.unchanged += 1;
            }
            Err(err) if options.keep_going => {
                error!(job = %job.id, error = %format!("{:#}", err), "Render failed");
                summary.failed.push(job.id.clone());
            }
            Err(err) => return Err(err),
        }
    }
    Ok(summary)
}

/// Write `xml` unless the file already holds the same body.
fn write_if_changed(path: &Path, xml: &str) -> Result<bool> {
    if let Ok(existing) = std::fs::read_to_string(path) {
        if body_digest(&existing) == body_digest(xml) {
            return Ok(false);
        }
    }
    std::fs::write(path, xml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

fn output_file_name(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("{}.xml", safe)
}

/// Validate every job, returning how many were checked.
fn cmd_check(paths: &[PathBuf]) -> Result<usize> {
    let set = load_jobs(paths)?;
    let index = set.index();
    for job in set.jobs() {
        buildmark_core::build_document(job, &index, Utc::now())
            .with_context(|| format!("Job {} is invalid", job.id))?;
        debug!(job = %job.id, "Job valid");
    }
    Ok(set.len())
}

async fn cmd_compile(args: CompileArgs, verbose: bool) -> Result<()> {
    let spec = CompileSpec {
        sources: args.sources,
        module: args.module,
        jar: args.jar,
        output: args.output,
        stdlib: args.stdlib,
        doc_output: args.doc_output,
        include_runtime: args.include_runtime,
        verbose,
        classpath: args.classpath.into_iter().collect(),
        kotlin_jars: args.kotlin_jars,
    };

    let base_dir = std::env::current_dir().context("Failed to read current directory")?;
    let repo = args
        .maven_repo
        .or_else(LocalRepositoryResolver::default_root)
        .context("No Maven repository: set --maven-repo or HOME")?;
    let resolver = LocalRepositoryResolver::new(repo);

    let prepared = KotlinCompile::new(spec, base_dir)
        .prepare(&resolver)
        .context("Compile preconditions failed")?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&prepared.invocations)?);
        return Ok(());
    }

    let compiler = ProcessCompiler::new(args.java, prepared.compiler_jars.clone())
        .with_timeout(args.timeout_secs);
    let outcomes = prepared
        .execute(&compiler)
        .await
        .context("Compilation failed")?;

    let total_ms: u64 = outcomes.iter().map(|o| o.duration_ms).sum();
    println!("✓ Compiled {} unit(s) in {}ms", outcomes.len(), total_ms);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const JOBS: &str = r#"{"jobs": [
        {"name": "build", "builders": [{"type": "shell", "command": "make"}],
         "downstream": {"jobs": ["test"]}},
        {"name": "test"}
    ]}"#;

    fn options(dir: &Path, jobs: PathBuf) -> RenderOptions {
        RenderOptions {
            jobs: vec![jobs],
            out_dir: dir.join("out"),
            job: None,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap(),
            style: XmlStyle::default(),
            keep_going: false,
        }
    }

    #[test]
    fn test_render_writes_one_file_per_job() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = dir.path().join("jobs.json");
        std::fs::write(&jobs, JOBS).unwrap();

        let summary = cmd_render(&options(dir.path(), jobs)).unwrap();
        assert_eq!(summary.written, 2);
        let build = std::fs::read_to_string(dir.path().join("out/build.xml")).unwrap();
        assert!(build.contains("<projects>test</projects>"));
        assert!(build.contains("jobs.json"));
    }

    #[test]
    fn test_rerender_skips_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = dir.path().join("jobs.json");
        std::fs::write(&jobs, JOBS).unwrap();

        let mut opts = options(dir.path(), jobs);
        cmd_render(&opts).unwrap();
        opts.timestamp = Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap();
        let summary = cmd_render(&opts).unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(summary.unchanged, 2);
    }

    #[test]
    fn test_keep_going_collects_failures() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = dir.path().join("jobs.json");
        std::fs::write(
            &jobs,
            r#"[{"name": "bad", "triggers": [{"kind": "timer"}]}, {"name": "good"}]"#,
        )
        .unwrap();

        let mut opts = options(dir.path(), jobs);
        assert!(cmd_render(&opts).is_err());

        opts.keep_going = true;
        let summary = cmd_render(&opts).unwrap();
        assert_eq!(summary.failed, vec!["bad".to_string()]);
        assert_eq!(summary.written, 1);
    }

    #[test]
    fn test_single_job_selection() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = dir.path().join("jobs.json");
        std::fs::write(&jobs, JOBS).unwrap();

        let mut opts = options(dir.path(), jobs);
        opts.job = Some("test".to_string());
        assert_eq!(cmd_render(&opts).unwrap().written, 1);
        assert!(!dir.path().join("out/build.xml").exists());

        opts.job = Some("missing".to_string());
        assert!(cmd_render(&opts).is_err());
    }

    #[test]
    fn test_check_reports_invalid_job() {
        let dir = tempfile::tempdir().unwrap();
        let jobs = dir.path().join("jobs.json");
        std::fs::write(&jobs, JOBS).unwrap();
        assert_eq!(cmd_check(&[jobs.clone()]).unwrap(), 2);

        std::fs::write(&jobs, r#"{"name": "a", "downstream": {"jobs": ["nope"]}}"#).unwrap();
        assert!(cmd_check(&[jobs]).is_err());
    }

    #[test]
    fn test_compile_options_from_env() {
        let sources = std::env::join_paths(["src/main", "src/generated"]).unwrap();
        let classpath = std::env::join_paths(["lib", "deps/classes"]).unwrap();
        std::env::set_var("BUILDMARK_SRC", &sources);
        std::env::set_var("BUILDMARK_JAR", "dist/app.jar");
        std::env::set_var("BUILDMARK_INCLUDE_RUNTIME", "true");

        let parsed = Cli::try_parse_from([
            "buildmark".into(),
            "compile".into(),
            "--classpath".into(),
            classpath,
        ]);
        for var in ["BUILDMARK_SRC", "BUILDMARK_JAR", "BUILDMARK_INCLUDE_RUNTIME"] {
            std::env::remove_var(var);
        }

        match parsed.unwrap().command {
            Commands::Compile(args) => {
                assert_eq!(
                    args.sources,
                    vec![PathBuf::from("src/main"), PathBuf::from("src/generated")]
                );
                assert_eq!(args.jar, Some(PathBuf::from("dist/app.jar")));
                assert!(args.include_runtime);
                assert_eq!(
                    args.classpath,
                    vec![PathBuf::from("lib"), PathBuf::from("deps/classes")]
                );
            }
            _ => panic!("expected compile"),
        }
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("kotlin/master"), "kotlin_master.xml");
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::try_parse_from([
            "buildmark",
            "render",
            "--jobs",
            "jobs.json",
            "--out-dir",
            "out",
            "--timestamp",
            "2026-10-19T09:00:00Z",
            "--crlf",
        ])
        .unwrap();
        match cli.command {
            Commands::Render {
                timestamp, crlf, ..
            } => {
                assert!(crlf);
                assert!(timestamp.is_some());
            }
            _ => panic!("expected render"),
        }
    }
}
