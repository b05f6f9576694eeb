//! Post-build publisher settings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// E-mail notification settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct MailSettings {
    pub recipients: Vec<String>,
    pub notify_every_unstable_build: bool,
    /// Also mail the committers who broke the build.
    pub send_to_individuals: bool,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            recipients: Vec::new(),
            notify_every_unstable_build: true,
            send_to_individuals: false,
        }
    }
}

impl MailSettings {
    pub fn to(recipients: &[&str]) -> Self {
        Self {
            recipients: recipients.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Space separated recipient list, or `None` when nobody is configured.
    pub fn recipient_list(&self) -> Option<String> {
        let recipients: Vec<&str> = self
            .recipients
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            None
        } else {
            Some(recipients.join(" "))
        }
    }
}

/// Archive build outputs on the CI server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveSettings {
    /// Ant-style include pattern, e.g. `dist/*.zip`.
    pub artifacts: String,
    pub excludes: Option<String>,
    pub allow_empty: bool,
}

/// Deploy artifacts and build info to an artifact repository server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactorySettings {
    /// Server name as configured on the CI server.
    pub server: String,
    pub release_repository: String,
    /// Defaults to the release repository.
    pub snapshot_repository: Option<String>,
    pub deploy_build_info: bool,
    pub even_if_unstable: bool,
}

impl Default for ArtifactorySettings {
    fn default() -> Self {
        Self {
            server: String::new(),
            release_repository: String::new(),
            snapshot_repository: None,
            deploy_build_info: true,
            even_if_unstable: false,
        }
    }
}

/// When downstream jobs are started.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TriggerCondition {
    #[default]
    Success,
    Unstable,
    UnstableOrBetter,
    Failed,
    Always,
}

impl TriggerCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerCondition::Success => "SUCCESS",
            TriggerCondition::Unstable => "UNSTABLE",
            TriggerCondition::UnstableOrBetter => "UNSTABLE_OR_BETTER",
            TriggerCondition::Failed => "FAILED",
            TriggerCondition::Always => "ALWAYS",
        }
    }
}

/// Start other jobs when this one finishes, passing parameters along.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DownstreamTrigger {
    /// Ids of the jobs to start.
    pub jobs: Vec<String>,
    pub condition: TriggerCondition,
    /// Pass this build's parameters on.
    pub current_build_parameters: bool,
    /// Pass the checked-out subversion revision on.
    pub scm_revision_parameter: bool,
    /// Pass the checked-out git commit on.
    pub git_commit_parameter: bool,
    /// Literal `key=value` parameters.
    pub predefined_parameters: BTreeMap<String, String>,
    /// Read parameters from a properties file in the workspace.
    pub properties_file: Option<String>,
    pub trigger_with_no_parameters: bool,
}

impl DownstreamTrigger {
    pub fn to_jobs(jobs: &[&str]) -> Self {
        Self {
            jobs: jobs.iter().map(|j| j.to_string()).collect(),
            ..Self::default()
        }
    }

    /// True when no parameter source is configured.
    pub fn has_no_parameters(&self) -> bool {
        !self.current_build_parameters
            && !self.scm_revision_parameter
            && !self.git_commit_parameter
            && self.predefined_parameters.is_empty()
            && self
                .properties_file
                .as_deref()
                .map_or(true, |f| f.trim().is_empty())
    }
}
