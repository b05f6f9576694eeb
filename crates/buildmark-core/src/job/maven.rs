//! Settings that turn a job into a Maven module-set job.

use serde::{Deserialize, Serialize};

use super::step::Task;

/// Build result threshold, as the CI server encodes it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BuildResult {
    Success,
    Unstable,
    #[default]
    Failure,
}

impl BuildResult {
    pub fn name(&self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Failure => "FAILURE",
        }
    }

    pub fn ordinal(&self) -> u8 {
        match self {
            BuildResult::Success => 0,
            BuildResult::Unstable => 1,
            BuildResult::Failure => 2,
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            BuildResult::Success => "BLUE",
            BuildResult::Unstable => "YELLOW",
            BuildResult::Failure => "RED",
        }
    }
}

/// Deploy built artifacts to a Maven repository after the build.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Redeploy {
    /// Repository id matching a `settings.xml` server entry.
    pub id: String,
    pub url: String,
    pub unique_version: bool,
    pub even_if_unstable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MavenSettings {
    pub root_pom: String,
    pub goals: String,
    /// Maven installation configured on the CI server.
    pub maven_name: Option<String>,
    pub maven_opts: Option<String>,
    /// Give the job its own local repository instead of the shared one.
    pub private_repository: bool,
    pub redeploy: Option<Redeploy>,
    pub prebuilders: Vec<Task>,
    pub postbuilders: Vec<Task>,
    /// Worst result for which post-build steps still run.
    pub run_post_steps_if: BuildResult,
}

impl Default for MavenSettings {
    fn default() -> Self {
        Self {
            root_pom: "pom.xml".to_string(),
            goals: String::new(),
            maven_name: None,
            maven_opts: None,
            private_repository: false,
            redeploy: None,
            prebuilders: Vec::new(),
            postbuilders: Vec::new(),
            run_post_steps_if: BuildResult::Failure,
        }
    }
}

impl MavenSettings {
    pub fn new(goals: impl Into<String>) -> Self {
        Self {
            goals: goals.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: MavenSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.root_pom, "pom.xml");
        assert_eq!(settings.run_post_steps_if, BuildResult::Failure);
        assert!(settings.maven_opts.is_none());
    }

    #[test]
    fn test_build_result_encoding() {
        assert_eq!(BuildResult::Unstable.name(), "UNSTABLE");
        assert_eq!(BuildResult::Unstable.ordinal(), 1);
        assert_eq!(BuildResult::Success.color(), "BLUE");
    }
}
