//! Compiler dependency resolution.
//!
//! The compiler and its documentation plugin are described by bundled
//! descriptor files listing Maven coordinates, one per line. A
//! [`DependencyResolver`] turns each coordinate into a jar on disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::error::{CompileError, Result};

const COMPILER_DESCRIPTOR: &str = include_str!("../resources/compiler.deps");
const DOC_PLUGIN_DESCRIPTOR: &str = include_str!("../resources/doc-plugin.deps");

/// `group:artifact:version`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    /// Jar path relative to a Maven repository root.
    pub fn repository_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group.split('.').collect();
        path.push(&self.artifact);
        path.push(&self.version);
        path.push(format!("{}-{}.jar", self.artifact, self.version));
        path
    }
}

impl FromStr for Coordinate {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').map(str::trim).collect();
        match parts.as_slice() {
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Self {
                    group: group.to_string(),
                    artifact: artifact.to_string(),
                    version: version.to_string(),
                })
            }
            _ => Err(CompileError::InvalidCoordinate(s.trim().to_string())),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// Named list of coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: String,
    pub coordinates: Vec<Coordinate>,
}

impl Descriptor {
    /// Parse descriptor text. Blank lines and `#` comments are skipped.
    pub fn parse(name: &str, text: &str) -> Result<Self> {
        let coordinates = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(Coordinate::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            coordinates,
        })
    }

    /// The compiler and its runtime libraries.
    pub fn compiler() -> Result<Self> {
        Self::parse("compiler", COMPILER_DESCRIPTOR)
    }

    /// The documentation plugin.
    pub fn doc_plugin() -> Result<Self> {
        Self::parse("doc-plugin", DOC_PLUGIN_DESCRIPTOR)
    }
}

/// Maps coordinates to jar files.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self, coordinate: &Coordinate) -> Result<PathBuf>;

    /// Resolve every coordinate of `descriptor`, failing on the first miss.
    fn resolve_all(&self, descriptor: &Descriptor) -> Result<Vec<PathBuf>> {
        let jars = descriptor
            .coordinates
            .iter()
            .map(|coordinate| self.resolve(coordinate))
            .collect::<Result<Vec<_>>>()?;
        debug!(descriptor = %descriptor.name, count = jars.len(), "Resolved dependencies");
        Ok(jars)
    }
}

/// Resolver over a local Maven repository directory.
#[derive(Debug, Clone)]
pub struct LocalRepositoryResolver {
    root: PathBuf,
}

impl LocalRepositoryResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$HOME/.m2/repository`, if `HOME` is set.
    pub fn default_root() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| Path::new(&home).join(".m2").join("repository"))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DependencyResolver for LocalRepositoryResolver {
    fn resolve(&self, coordinate: &Coordinate) -> Result<PathBuf> {
        let path = self.root.join(coordinate.repository_path());
        if path.is_file() {
            Ok(path)
        } else {
            Err(CompileError::UnresolvedDependency {
                coordinate: coordinate.to_string(),
                path,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_coordinate() {
        let c: Coordinate = "org.jetbrains.kotlin:kotlin-stdlib:1.9.24".parse().unwrap();
        assert_eq!(c.group, "org.jetbrains.kotlin");
        assert_eq!(c.to_string(), "org.jetbrains.kotlin:kotlin-stdlib:1.9.24");
        assert_eq!(
            c.repository_path(),
            PathBuf::from("org/jetbrains/kotlin/kotlin-stdlib/1.9.24/kotlin-stdlib-1.9.24.jar")
        );
    }

    #[test]
    fn test_invalid_coordinate() {
        assert!("kotlin-stdlib".parse::<Coordinate>().is_err());
        assert!("a::1".parse::<Coordinate>().is_err());
    }

    #[test]
    fn test_bundled_descriptors_parse() {
        let compiler = Descriptor::compiler().unwrap();
        assert!(compiler
            .coordinates
            .iter()
            .any(|c| c.artifact == "kotlin-compiler"));
        assert!(!Descriptor::doc_plugin().unwrap().coordinates.is_empty());
    }

    #[test]
    fn test_descriptor_skips_comments() {
        let d = Descriptor::parse("x", "# header\n\n a:b:1 \n").unwrap();
        assert_eq!(d.coordinates.len(), 1);
    }

    #[test]
    fn test_local_repository_lookup() {
        let repo = TempDir::new().unwrap();
        let coordinate: Coordinate = "org.example:lib:2.0".parse().unwrap();
        let jar = repo.path().join(coordinate.repository_path());
        std::fs::create_dir_all(jar.parent().unwrap()).unwrap();
        std::fs::write(&jar, b"PK").unwrap();

        let resolver = LocalRepositoryResolver::new(repo.path());
        assert_eq!(resolver.resolve(&coordinate).unwrap(), jar);

        let missing: Coordinate = "org.example:other:2.0".parse().unwrap();
        assert!(matches!(
            resolver.resolve(&missing),
            Err(CompileError::UnresolvedDependency { .. })
        ));
    }
}
