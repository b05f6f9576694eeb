//! Source control configuration.

use serde::{Deserialize, Serialize};

/// Source control system a job checks out from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScmKind {
    #[default]
    None,
    Git,
    Subversion,
}

impl ScmKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScmKind::None => "none",
            ScmKind::Git => "git",
            ScmKind::Subversion => "subversion",
        }
    }
}

/// One remote repository (git) or module location (subversion).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Repository {
    pub url: String,
    /// Branch to build; git defaults to `master`.
    pub branch: Option<String>,
    /// Remote name; git defaults to `origin`.
    pub name: Option<String>,
    pub refspec: Option<String>,
    /// Checkout directory relative to the workspace.
    pub local_dir: Option<String>,
}

impl Repository {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Scm {
    pub kind: ScmKind,
    pub repositories: Vec<Repository>,
    /// Wipe the workspace before each checkout.
    pub wipe_out_workspace: bool,
    /// Extra markup appended after the `scm` element.
    pub extension_markup: Option<String>,
}

impl Scm {
    pub fn git(repositories: Vec<Repository>) -> Self {
        Self {
            kind: ScmKind::Git,
            repositories,
            ..Self::default()
        }
    }

    pub fn subversion(repositories: Vec<Repository>) -> Self {
        Self {
            kind: ScmKind::Subversion,
            repositories,
            ..Self::default()
        }
    }

    /// Short form used in the job description report.
    pub fn summary(&self) -> String {
        match self.kind {
            ScmKind::None => "none".to_string(),
            kind => {
                let urls: Vec<&str> = self.repositories.iter().map(|r| r.url.as_str()).collect();
                format!("{} {}", kind.name(), urls.join(", "))
            }
        }
    }
}
