//! Build triggers: cron-style schedules and Gerrit review events.
//!
//! Job files carry triggers as a flat [`TriggerConfig`] so that a
//! misconfigured entry (a Gerrit trigger with a cron expression, a timer
//! with Gerrit projects) can be reported instead of silently dropped.
//! [`TriggerConfig::validate`] turns it into the typed [`Trigger`].

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Which trigger implementation a configuration entry selects.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    /// Periodic build on a cron schedule.
    #[default]
    Timer,
    /// Periodic SCM polling on a cron schedule.
    ScmPoll,
    /// Gerrit patchset and change events.
    Gerrit,
}

impl TriggerKind {
    pub fn name(&self) -> &'static str {
        match self {
            TriggerKind::Timer => "timer",
            TriggerKind::ScmPoll => "scm_poll",
            TriggerKind::Gerrit => "gerrit",
        }
    }
}

/// How a Gerrit pattern is compared against project, branch or path names.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CompareType {
    #[default]
    Plain,
    Ant,
    RegExp,
}

impl CompareType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareType::Plain => "PLAIN",
            CompareType::Ant => "ANT",
            CompareType::RegExp => "REG_EXP",
        }
    }
}

/// A compare-type/pattern pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PatternMatch {
    pub compare_type: CompareType,
    pub pattern: String,
}

impl PatternMatch {
    pub fn new(compare_type: CompareType, pattern: impl Into<String>) -> Self {
        Self {
            compare_type,
            pattern: pattern.into(),
        }
    }
}

/// A Gerrit project with its branch and file-path filters.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GerritProject {
    pub compare_type: CompareType,
    pub pattern: String,
    pub branches: Vec<PatternMatch>,
    pub file_paths: Vec<PatternMatch>,
}

/// Votes reported back to Gerrit. Unset values fall back to the server
/// defaults and are not written.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GerritThresholds {
    pub started_verified: Option<i32>,
    pub started_code_review: Option<i32>,
    pub successful_verified: Option<i32>,
    pub successful_code_review: Option<i32>,
    pub failed_verified: Option<i32>,
    pub failed_code_review: Option<i32>,
    pub unstable_verified: Option<i32>,
    pub unstable_code_review: Option<i32>,
}

impl GerritThresholds {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Trigger entry as written in a job file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerConfig {
    pub kind: TriggerKind,
    pub expression: Option<String>,
    pub description: Option<String>,
    pub projects: Vec<GerritProject>,
    pub thresholds: GerritThresholds,
    pub silent_mode: bool,
}

impl TriggerConfig {
    pub fn timer(expression: impl Into<String>) -> Self {
        Self {
            kind: TriggerKind::Timer,
            expression: Some(expression.into()),
            ..Self::default()
        }
    }

    pub fn scm_poll(expression: impl Into<String>) -> Self {
        Self {
            kind: TriggerKind::ScmPoll,
            expression: Some(expression.into()),
            ..Self::default()
        }
    }

    pub fn gerrit(projects: Vec<GerritProject>) -> Self {
        Self {
            kind: TriggerKind::Gerrit,
            projects,
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the entry and convert it to a typed [`Trigger`].
    pub fn validate(&self, job: &str) -> Result<Trigger> {
        match self.kind {
            TriggerKind::Gerrit => {
                if has_text(&self.description) || has_text(&self.expression) {
                    return Err(RenderError::GerritTriggerWithExpression {
                        job: job.to_string(),
                    });
                }
                let projects: Vec<GerritProject> = self
                    .projects
                    .iter()
                    .filter(|p| !p.pattern.trim().is_empty())
                    .cloned()
                    .collect();
                if projects.is_empty() {
                    return Err(RenderError::GerritTriggerWithoutProjects {
                        job: job.to_string(),
                    });
                }
                Ok(Trigger::Gerrit(GerritTrigger {
                    projects,
                    thresholds: self.thresholds,
                    silent_mode: self.silent_mode,
                }))
            }
            kind @ (TriggerKind::Timer | TriggerKind::ScmPoll) => {
                if !self.projects.is_empty() || !self.thresholds.is_empty() || self.silent_mode {
                    return Err(RenderError::GenericTriggerWithGerritFields {
                        job: job.to_string(),
                        kind: kind.name().to_string(),
                    });
                }
                let expression = self
                    .expression
                    .as_deref()
                    .map(str::trim)
                    .filter(|e| !e.is_empty())
                    .ok_or_else(|| RenderError::MissingTriggerExpression {
                        job: job.to_string(),
                        kind: kind.name().to_string(),
                    })?;
                let schedule = Schedule {
                    expression: expression.to_string(),
                    description: self
                        .description
                        .as_deref()
                        .map(str::trim)
                        .filter(|d| !d.is_empty())
                        .map(str::to_string),
                };
                Ok(match kind {
                    TriggerKind::ScmPoll => Trigger::ScmPoll(schedule),
                    _ => Trigger::Timer(schedule),
                })
            }
        }
    }
}

/// Any non-empty value counts, whitespace included.
fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// A cron-style schedule with an optional human-readable note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub expression: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GerritTrigger {
    pub projects: Vec<GerritProject>,
    pub thresholds: GerritThresholds,
    pub silent_mode: bool,
}

/// A validated trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Timer(Schedule),
    ScmPoll(Schedule),
    Gerrit(GerritTrigger),
}

impl Trigger {
    /// Implementation class, used as the element name in job markup.
    pub fn class(&self) -> &'static str {
        match self {
            Trigger::Timer(_) => "hudson.triggers.TimerTrigger",
            Trigger::ScmPoll(_) => "hudson.triggers.SCMTrigger",
            Trigger::Gerrit(_) => {
                "com.sonyericsson.hudson.plugins.gerrit.trigger.hudsontrigger.GerritTrigger"
            }
        }
    }

    /// Short form used in the job description report.
    pub fn summary(&self) -> String {
        match self {
            Trigger::Timer(s) => format!("timer {}", s.expression),
            Trigger::ScmPoll(s) => format!("scm poll {}", s.expression),
            Trigger::Gerrit(g) => {
                let projects: Vec<&str> = g.projects.iter().map(|p| p.pattern.as_str()).collect();
                format!("gerrit {}", projects.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(pattern: &str) -> GerritProject {
        GerritProject {
            pattern: pattern.to_string(),
            ..GerritProject::default()
        }
    }

    #[test]
    fn test_timer_validates() {
        let trigger = TriggerConfig::timer("H 2 * * *")
            .with_description("nightly")
            .validate("job")
            .unwrap();
        assert_eq!(
            trigger,
            Trigger::Timer(Schedule {
                expression: "H 2 * * *".to_string(),
                description: Some("nightly".to_string()),
            })
        );
        assert_eq!(trigger.class(), "hudson.triggers.TimerTrigger");
    }

    #[test]
    fn test_scm_poll_without_expression_fails() {
        let config = TriggerConfig {
            kind: TriggerKind::ScmPoll,
            ..TriggerConfig::default()
        };
        let err = config.validate("job").unwrap_err();
        assert!(matches!(err, RenderError::MissingTriggerExpression { .. }));
    }

    #[test]
    fn test_gerrit_with_description_fails() {
        let config = TriggerConfig::gerrit(vec![project("kotlin")]).with_description("nope");
        let err = config.validate("job").unwrap_err();
        assert!(matches!(err, RenderError::GerritTriggerWithExpression { .. }));
    }

    #[test]
    fn test_gerrit_with_expression_fails() {
        let mut config = TriggerConfig::gerrit(vec![project("kotlin")]);
        config.expression = Some("* * * * *".to_string());
        let err = config.validate("job").unwrap_err();
        assert!(matches!(err, RenderError::GerritTriggerWithExpression { .. }));
    }

    #[test]
    fn test_gerrit_whitespace_description_fails() {
        let mut config = TriggerConfig::gerrit(vec![project("kotlin")]);
        config.description = Some("   ".to_string());
        let err = config.validate("job").unwrap_err();
        assert!(matches!(err, RenderError::GerritTriggerWithExpression { .. }));
    }

    #[test]
    fn test_gerrit_empty_description_allowed() {
        let mut config = TriggerConfig::gerrit(vec![project("kotlin")]);
        config.description = Some(String::new());
        assert!(config.validate("job").is_ok());
    }

    #[test]
    fn test_gerrit_blank_patterns_fail() {
        let err = TriggerConfig::gerrit(vec![GerritProject::default(), project("  ")])
            .validate("job")
            .unwrap_err();
        assert!(matches!(err, RenderError::GerritTriggerWithoutProjects { .. }));
    }

    #[test]
    fn test_gerrit_blank_pattern_dropped() {
        let trigger = TriggerConfig::gerrit(vec![GerritProject::default(), project("kotlin")])
            .validate("job")
            .unwrap();
        match trigger {
            Trigger::Gerrit(gerrit) => {
                assert_eq!(gerrit.projects.len(), 1);
                assert_eq!(gerrit.projects[0].pattern, "kotlin");
            }
            other => panic!("expected gerrit trigger, got {other:?}"),
        }
    }

    #[test]
    fn test_gerrit_without_projects_fails() {
        let err = TriggerConfig::gerrit(vec![]).validate("job").unwrap_err();
        assert!(matches!(err, RenderError::GerritTriggerWithoutProjects { .. }));
    }

    #[test]
    fn test_timer_with_gerrit_projects_fails() {
        let mut config = TriggerConfig::timer("@daily");
        config.projects.push(project("kotlin"));
        let err = config.validate("job").unwrap_err();
        assert!(matches!(err, RenderError::GenericTriggerWithGerritFields { .. }));
    }

    #[test]
    fn test_deserialize_snake_case_kinds() {
        let config: TriggerConfig = serde_json::from_str(
            r#"{"kind": "gerrit", "projects": [{"compare_type": "reg_exp", "pattern": "k.*"}]}"#,
        )
        .unwrap();
        assert_eq!(config.kind, TriggerKind::Gerrit);
        assert_eq!(config.projects[0].compare_type, CompareType::RegExp);
        assert_eq!(CompareType::RegExp.as_str(), "REG_EXP");
    }

    #[test]
    fn test_summary() {
        let trigger = TriggerConfig::gerrit(vec![project("a"), project("b")])
            .validate("job")
            .unwrap();
        assert_eq!(trigger.summary(), "gerrit a, b");
    }
}
