//! buildmark core library
//!
//! - `job`: the in-memory CI job model and JSON job-file loading
//! - `xml`: an owned element tree and its serializer
//! - `markup`: job model to `config.xml` rendering
//! - `telemetry`: tracing setup shared by the binaries

pub mod error;
pub mod job;
pub mod markup;
pub mod telemetry;
pub mod xml;

pub use error::{RenderError, Result};
pub use job::{Job, JobIndex, JobSet};
pub use markup::{body_digest, build_document, render};
pub use telemetry::init_tracing;
pub use xml::{Document, Element, XmlStyle};

/// buildmark version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
