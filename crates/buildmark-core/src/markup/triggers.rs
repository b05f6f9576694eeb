//! `triggers` section.

use crate::job::{GerritProject, GerritThresholds, GerritTrigger, PatternMatch, Schedule, Trigger};
use crate::xml::Element;

const GERRIT_DATA: &str = "com.sonyericsson.hudson.plugins.gerrit.trigger.hudsontrigger.data";

pub(crate) fn triggers(triggers: &[Trigger]) -> Element {
    Element::class("triggers", "vector").children(triggers.iter().map(trigger))
}

fn trigger(trigger: &Trigger) -> Element {
    let element = Element::new(trigger.class());
    match trigger {
        Trigger::Timer(schedule) | Trigger::ScmPoll(schedule) => {
            element.child(Element::leaf("spec", spec_text(schedule)))
        }
        Trigger::Gerrit(gerrit) => gerrit_body(element, gerrit),
    }
}

fn spec_text(schedule: &Schedule) -> String {
    match &schedule.description {
        Some(description) => format!("# {}\n{}", description, schedule.expression),
        None => schedule.expression.clone(),
    }
}

fn gerrit_body(element: Element, gerrit: &GerritTrigger) -> Element {
    element
        .child(Element::new("spec"))
        .child(
            Element::new("gerritProjects")
                .children(gerrit.projects.iter().map(gerrit_project)),
        )
        .children(thresholds(&gerrit.thresholds))
        .child(Element::flag("silentMode", gerrit.silent_mode))
        .child(Element::flag("escapeQuotes", true))
}

fn gerrit_project(project: &GerritProject) -> Element {
    Element::new(format!("{GERRIT_DATA}.GerritProject"))
        .child(Element::leaf("compareType", project.compare_type.as_str()))
        .child(Element::leaf("pattern", &project.pattern))
        .child(
            Element::new("branches").children(
                project
                    .branches
                    .iter()
                    .map(|b| pattern(format!("{GERRIT_DATA}.Branch"), b)),
            ),
        )
        .child(
            Element::new("filePaths").children(
                project
                    .file_paths
                    .iter()
                    .map(|f| pattern(format!("{GERRIT_DATA}.FilePath"), f)),
            ),
        )
}

fn pattern(name: String, pattern: &PatternMatch) -> Element {
    Element::new(name)
        .child(Element::leaf("compareType", pattern.compare_type.as_str()))
        .child(Element::leaf("pattern", &pattern.pattern))
}

fn thresholds(t: &GerritThresholds) -> Vec<Element> {
    [
        ("gerritBuildStartedVerifiedValue", t.started_verified),
        ("gerritBuildStartedCodeReviewValue", t.started_code_review),
        ("gerritBuildSuccessfulVerifiedValue", t.successful_verified),
        ("gerritBuildSuccessfulCodeReviewValue", t.successful_code_review),
        ("gerritBuildFailedVerifiedValue", t.failed_verified),
        ("gerritBuildFailedCodeReviewValue", t.failed_code_review),
        ("gerritBuildUnstableVerifiedValue", t.unstable_verified),
        ("gerritBuildUnstableCodeReviewValue", t.unstable_code_review),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|v| Element::leaf(name, v)))
    .collect()
}
