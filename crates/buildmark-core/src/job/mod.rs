//! In-memory job model.
//!
//! A [`Job`] is the fully-populated description of one CI job. It is
//! loaded from JSON job files ([`JobSet`]) and never mutated by the
//! markup generator.

pub mod maven;
pub mod publish;
pub mod scm;
pub mod step;
pub mod trigger;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RenderError, Result};

pub use maven::{BuildResult, MavenSettings, Redeploy};
pub use publish::{
    ArchiveSettings, ArtifactorySettings, DownstreamTrigger, MailSettings, TriggerCondition,
};
pub use scm::{Repository, Scm, ScmKind};
pub use step::{BuildWrapper, Task};
pub use trigger::{
    CompareType, GerritProject, GerritThresholds, GerritTrigger, PatternMatch, Schedule, Trigger,
    TriggerConfig, TriggerKind,
};

/// Retention counter value meaning "keep forever".
pub const KEEP_FOREVER: i32 = -1;

/// Jobs keyed by id.
pub type JobIndex = BTreeMap<String, Job>;

/// Build history retention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LogRotation {
    pub days_to_keep: i32,
    pub num_to_keep: i32,
    pub artifact_days_to_keep: i32,
    pub artifact_num_to_keep: i32,
}

impl Default for LogRotation {
    fn default() -> Self {
        Self {
            days_to_keep: KEEP_FOREVER,
            num_to_keep: KEEP_FOREVER,
            artifact_days_to_keep: KEEP_FOREVER,
            artifact_num_to_keep: KEEP_FOREVER,
        }
    }
}

impl LogRotation {
    /// True when every counter is left at [`KEEP_FOREVER`].
    pub fn keeps_everything(&self) -> bool {
        *self == Self::default()
    }
}

/// A build parameter prompted for when the job is started by hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobParameter {
    String {
        name: String,
        #[serde(default)]
        default: String,
        #[serde(default)]
        description: Option<String>,
    },
    Boolean {
        name: String,
        #[serde(default)]
        default: bool,
        #[serde(default)]
        description: Option<String>,
    },
    Choice {
        name: String,
        choices: Vec<String>,
        #[serde(default)]
        description: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Job {
    /// Key used by other jobs to reference this one. Defaults to `name`.
    pub id: String,
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub disabled: bool,
    /// Node or label expression; `None` lets the job roam.
    pub node: Option<String>,
    pub jdk: Option<String>,
    /// Token for remotely triggered builds.
    pub auth_token: Option<String>,
    pub quiet_period: Option<u32>,
    pub checkout_retry_count: u32,
    pub block_when_downstream_building: bool,
    pub block_when_upstream_building: bool,
    pub log_rotation: LogRotation,
    pub parameters: Vec<JobParameter>,
    /// Project web page shown on the job page.
    pub project_url: Option<String>,
    pub scm: Scm,
    pub triggers: Vec<TriggerConfig>,
    pub builders: Vec<Task>,
    pub wrappers: Vec<BuildWrapper>,
    /// Present for Maven module-set jobs.
    pub maven: Option<MavenSettings>,
    pub mail: Option<MailSettings>,
    pub archive: Option<ArchiveSettings>,
    /// JUnit report pattern.
    pub test_results: Option<String>,
    pub artifactory: Option<ArtifactorySettings>,
    pub downstream: Option<DownstreamTrigger>,
    /// File the job was loaded from.
    pub source: Option<String>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            ..Self::default()
        }
    }

    pub fn is_maven(&self) -> bool {
        self.maven.is_some()
    }

    pub fn has_gerrit_trigger(&self) -> bool {
        self.triggers.iter().any(|t| t.kind == TriggerKind::Gerrit)
    }

    /// Validate triggers in declaration order.
    pub fn checked_triggers(&self) -> Result<Vec<Trigger>> {
        self.triggers
            .iter()
            .map(|config| config.validate(&self.id))
            .collect()
    }

    /// Check the structural rules that do not depend on other jobs.
    pub fn validate(&self) -> Result<()> {
        if self.is_maven() && !self.builders.is_empty() {
            return Err(RenderError::MavenJobWithBuilders {
                job: self.id.clone(),
            });
        }

        if self.scm.kind != ScmKind::None && self.scm.repositories.is_empty() {
            return Err(RenderError::MissingRepositories {
                job: self.id.clone(),
                kind: self.scm.kind.name().to_string(),
            });
        }

        if let Some(downstream) = &self.downstream {
            if downstream
                .predefined_parameters
                .keys()
                .any(|k| k.trim().is_empty())
            {
                return Err(RenderError::EmptyParameterKey {
                    job: self.id.clone(),
                });
            }
        }

        self.checked_triggers()?;
        Ok(())
    }

    /// Resolve downstream job ids to their definitions.
    pub fn downstream_jobs<'a>(&self, all_jobs: &'a JobIndex) -> Result<Vec<&'a Job>> {
        let Some(downstream) = &self.downstream else {
            return Ok(Vec::new());
        };
        downstream
            .jobs
            .iter()
            .map(|id| {
                all_jobs
                    .get(id)
                    .ok_or_else(|| RenderError::UnknownDownstreamJob {
                        job: self.id.clone(),
                        target: id.clone(),
                    })
            })
            .collect()
    }

    /// Jobs whose downstream trigger starts this one, ordered by id.
    pub fn upstream_jobs<'a>(&self, all_jobs: &'a JobIndex) -> Vec<&'a Job> {
        all_jobs
            .values()
            .filter(|other| {
                other
                    .downstream
                    .as_ref()
                    .is_some_and(|d| d.jobs.iter().any(|id| *id == self.id))
            })
            .collect()
    }
}

/// `{ "jobs": [...] }` job file layout.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WrappedJobs {
    jobs: Vec<Job>,
}

/// The jobs loaded from one or more job files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSet {
    jobs: Vec<Job>,
}

impl JobSet {
    pub fn new(jobs: Vec<Job>) -> Result<Self> {
        let mut set = Self::default();
        for job in jobs {
            set.push(job)?;
        }
        Ok(set)
    }

    /// Parse a job file: a single job, an array, or `{ "jobs": [...] }`.
    pub fn from_json(content: &str) -> Result<Self> {
        // Pick the layout first, then parse it directly so errors keep
        // their field name and position.
        let jobs = match serde_json::from_str::<serde_json::Value>(content)? {
            serde_json::Value::Array(_) => serde_json::from_str::<Vec<Job>>(content)?,
            serde_json::Value::Object(map) if map.contains_key("jobs") => {
                serde_json::from_str::<WrappedJobs>(content)?.jobs
            }
            _ => vec![serde_json::from_str::<Job>(content)?],
        };
        Self::new(jobs)
    }

    /// Read a job file, recording its path as each job's source.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut set = Self::from_json(&content)?;
        let source = path.display().to_string();
        for job in &mut set.jobs {
            job.source.get_or_insert_with(|| source.clone());
        }
        debug!(path = %source, jobs = set.jobs.len(), "Loaded job file");
        Ok(set)
    }

    /// Merge another set, rejecting duplicate ids.
    pub fn extend(&mut self, other: JobSet) -> Result<()> {
        for job in other.jobs {
            self.push(job)?;
        }
        Ok(())
    }

    fn push(&mut self, mut job: Job) -> Result<()> {
        if job.id.trim().is_empty() {
            if job.name.trim().is_empty() {
                return Err(RenderError::MissingJobName);
            }
            job.id = job.name.clone();
        }
        if job.name.trim().is_empty() {
            job.name = job.id.clone();
        }
        if self.jobs.iter().any(|existing| existing.id == job.id) {
            return Err(RenderError::DuplicateJob(job.id));
        }
        self.jobs.push(job);
        Ok(())
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn index(&self) -> JobIndex {
        self.jobs
            .iter()
            .map(|job| (job.id.clone(), job.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_named_in_error() {
        let err = JobSet::from_json("{\n  \"name\": \"a\",\n  \"nodee\": \"linux\"\n}")
            .unwrap_err()
            .to_string();
        assert!(err.contains("nodee"), "{err}");
        assert!(err.contains("line 3"), "{err}");

        let err = JobSet::from_json(r#"{"jobs": [{"name": "a"}, {"name": "b", "jdkk": "17"}]}"#)
            .unwrap_err()
            .to_string();
        assert!(err.contains("jdkk"), "{err}");
    }

    #[test]
    fn test_log_rotation_defaults_keep_everything() {
        let rotation = LogRotation::default();
        assert!(rotation.keeps_everything());

        let rotation = LogRotation {
            num_to_keep: 0,
            ..LogRotation::default()
        };
        assert!(!rotation.keeps_everything());
    }

    #[test]
    fn test_maven_job_with_builders_rejected() {
        let mut job = Job::new("kotlin-maven");
        job.maven = Some(MavenSettings::new("install"));
        job.builders.push(Task::shell("make"));
        assert!(matches!(
            job.validate(),
            Err(RenderError::MavenJobWithBuilders { .. })
        ));
    }

    #[test]
    fn test_git_without_repositories_rejected() {
        let mut job = Job::new("kotlin");
        job.scm = Scm::git(vec![]);
        assert!(matches!(
            job.validate(),
            Err(RenderError::MissingRepositories { .. })
        ));
    }

    #[test]
    fn test_from_json_single_object() {
        let set = JobSet::from_json(r#"{"name": "kotlin"}"#).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.jobs()[0].id, "kotlin");
    }

    #[test]
    fn test_from_json_wrapped_and_list() {
        let wrapped = JobSet::from_json(r#"{"jobs": [{"name": "a"}, {"id": "b"}]}"#).unwrap();
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped.get("b").unwrap().name, "b");

        let list = JobSet::from_json(r#"[{"name": "a"}]"#).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = JobSet::from_json(r#"[{"name": "a"}, {"id": "a"}]"#).unwrap_err();
        assert!(matches!(err, RenderError::DuplicateJob(id) if id == "a"));
    }

    #[test]
    fn test_nameless_job_rejected() {
        let err = JobSet::new(vec![Job::default()]).unwrap_err();
        assert!(matches!(err, RenderError::MissingJobName));
    }

    #[test]
    fn test_load_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.json");
        std::fs::write(&path, r#"[{"name": "kotlin"}]"#).unwrap();

        let set = JobSet::load(&path).unwrap();
        assert_eq!(
            set.jobs()[0].source.as_deref(),
            Some(path.display().to_string().as_str())
        );
    }

    #[test]
    fn test_upstream_and_downstream_resolution() {
        let mut build = Job::new("build");
        build.downstream = Some(DownstreamTrigger::to_jobs(&["test"]));
        let test = Job::new("test");
        let index = JobSet::new(vec![build.clone(), test.clone()]).unwrap().index();

        let downstream = build.downstream_jobs(&index).unwrap();
        assert_eq!(downstream[0].id, "test");

        let upstream = test.upstream_jobs(&index);
        assert_eq!(upstream.len(), 1);
        assert_eq!(upstream[0].id, "build");
    }

    #[test]
    fn test_unknown_downstream_rejected() {
        let mut build = Job::new("build");
        build.downstream = Some(DownstreamTrigger::to_jobs(&["missing"]));
        let index = JobSet::new(vec![build.clone()]).unwrap().index();
        assert!(matches!(
            build.downstream_jobs(&index),
            Err(RenderError::UnknownDownstreamJob { target, .. }) if target == "missing"
        ));
    }
}
