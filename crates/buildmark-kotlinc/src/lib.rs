//! Kotlin compiler invocation for buildmark
//!
//! A [`CompileSpec`] is checked and expanded into one [`Invocation`] per
//! compiler run. [`KotlinCompile::prepare`] creates missing classpath
//! directories and resolves the compiler jars through a
//! [`DependencyResolver`]; [`PreparedCompile::execute`] hands each
//! invocation to a [`Compiler`].

pub mod compiler;
pub mod error;
pub mod fakes;
pub mod invocation;
pub mod resolve;
pub mod spec;
pub mod task;

pub use compiler::{CompileOutcome, Compiler, ProcessCompiler};
pub use error::{CompileError, Result};
pub use invocation::{CompilerPlugin, Invocation, Target};
pub use resolve::{Coordinate, DependencyResolver, Descriptor, LocalRepositoryResolver};
pub use spec::{CompilePlan, CompileSpec};
pub use task::{KotlinCompile, PreparedCompile};
