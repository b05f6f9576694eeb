//! Job configuration markup.
//!
//! [`render`] turns one [`Job`] into the `config.xml` document the CI
//! server stores for it. Rendering validates the job first, then builds
//! the element tree section by section; the same inputs always yield the
//! same bytes.
//!
//! Freestyle jobs render as a `project` root, Maven jobs as
//! `maven2-moduleset`. Both share the section order below; only the build
//! section in the middle and the Maven-only tail differ.

mod maven;
mod properties;
mod publishers;
mod scm;
mod steps;
mod triggers;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::partial_escape;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;
use crate::job::{Job, JobIndex, LogRotation, Trigger};
use crate::xml::{Document, Element, XmlStyle};

pub use publishers::EMPTY_LIST_CLASS;

/// Root element for freestyle jobs.
pub const FREESTYLE_ROOT: &str = "project";
/// Root element for Maven module-set jobs.
pub const MAVEN_ROOT: &str = "maven2-moduleset";

const GENERATOR: &str = concat!("buildmark ", env!("CARGO_PKG_VERSION"));

/// Render `job` as a complete XML document.
///
/// `all_jobs` resolves downstream job ids and finds upstream jobs for the
/// description report. `timestamp` is only written to the banner.
pub fn render(
    job: &Job,
    all_jobs: &JobIndex,
    timestamp: DateTime<Utc>,
    style: &XmlStyle,
) -> Result<String> {
    let document = build_document(job, all_jobs, timestamp)?;
    Ok(document.to_xml(style))
}

/// Validate `job` and build its document tree.
pub fn build_document(
    job: &Job,
    all_jobs: &JobIndex,
    timestamp: DateTime<Utc>,
) -> Result<Document> {
    job.validate()?;
    let triggers = job.checked_triggers()?;
    let downstream = job.downstream_jobs(all_jobs)?;
    let upstream = job.upstream_jobs(all_jobs);
    let downstream_names: Vec<&str> = downstream.iter().map(|j| j.name.as_str()).collect();
    let upstream_names: Vec<&str> = upstream.iter().map(|j| j.name.as_str()).collect();

    debug!(job = %job.id, maven = job.is_maven(), "Rendering job markup");

    let root_name = if job.is_maven() { MAVEN_ROOT } else { FREESTYLE_ROOT };
    let report = Report {
        job,
        triggers: &triggers,
        upstream: &upstream_names,
        downstream: &downstream_names,
    };

    let mut root = Element::new(root_name)
        .child(Element::new("actions"))
        .child(Element::new("description").cdata(description(&report)))
        .child_opt(
            job.display_name
                .as_deref()
                .map(|name| Element::leaf("displayName", name)),
        )
        .child_opt(log_rotator(&job.log_rotation))
        .child(Element::flag("keepDependencies", false))
        .child(properties::properties(job))
        .child(scm::scm(job));

    if let Some(markup) = &job.scm.extension_markup {
        root = root.raw(markup.as_str())?;
    }

    root = root
        .child_opt(job.quiet_period.map(|q| Element::leaf("quietPeriod", q)))
        .child(Element::leaf(
            "scmCheckoutRetryCount",
            job.checkout_retry_count,
        ))
        .children(node_assignment(assigned_node(job)))
        .child(Element::flag("disabled", job.disabled))
        .child(Element::flag(
            "blockBuildWhenDownstreamBuilding",
            job.block_when_downstream_building,
        ))
        .child(Element::flag(
            "blockBuildWhenUpstreamBuilding",
            job.block_when_upstream_building,
        ))
        .child_opt(job.jdk.as_deref().map(|jdk| Element::leaf("jdk", jdk)))
        .child_opt(
            job.auth_token
                .as_deref()
                .map(|token| Element::leaf("authToken", token)),
        )
        .child(triggers::triggers(&triggers))
        .child(Element::flag("concurrentBuild", false));

    root = match &job.maven {
        Some(settings) => root.children(maven::root_section(settings, job.mail.as_ref())),
        None => root.child(steps::step_list("builders", &job.builders)),
    };

    root = root
        .child(publishers::publishers(job, &downstream_names))
        .child(steps::build_wrappers(&job.wrappers));

    if let Some(settings) = &job.maven {
        root = root.children(maven::trailing_section(settings));
    }

    Ok(Document::new(root).with_banner(vec![banner(job, timestamp)]))
}

fn banner(job: &Job, timestamp: DateTime<Utc>) -> String {
    let at = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
    match &job.source {
        Some(source) => format!("Generated by {GENERATOR} from {source} at {at}. Do not edit."),
        None => format!("Generated by {GENERATOR} at {at}. Do not edit."),
    }
}

/// `logRotator`, omitted when every counter keeps builds forever.
fn log_rotator(rotation: &LogRotation) -> Option<Element> {
    if rotation.keeps_everything() {
        return None;
    }
    Some(
        Element::class("logRotator", "hudson.tasks.LogRotator")
            .child(Element::leaf("daysToKeep", rotation.days_to_keep))
            .child(Element::leaf("numToKeep", rotation.num_to_keep))
            .child(Element::leaf(
                "artifactDaysToKeep",
                rotation.artifact_days_to_keep,
            ))
            .child(Element::leaf(
                "artifactNumToKeep",
                rotation.artifact_num_to_keep,
            )),
    )
}

/// Configured node label; blank labels mean the job may roam.
fn assigned_node(job: &Job) -> Option<&str> {
    job.node.as_deref().map(str::trim).filter(|n| !n.is_empty())
}

fn node_assignment(node: Option<&str>) -> Vec<Element> {
    match node {
        Some(node) => vec![
            Element::leaf("assignedNode", node),
            Element::flag("canRoam", false),
        ],
        None => vec![Element::flag("canRoam", true)],
    }
}

struct Report<'a> {
    job: &'a Job,
    triggers: &'a [Trigger],
    upstream: &'a [&'a str],
    downstream: &'a [&'a str],
}

/// User description followed by the generated banner and report table.
fn description(report: &Report<'_>) -> String {
    let job = report.job;
    let mut out = String::new();
    if let Some(text) = job.description.as_deref().filter(|t| !t.trim().is_empty()) {
        out.push_str(text.trim_end());
        out.push_str("\n\n");
    }
    out.push_str(
        "<p><b>This job is generated.</b> Changes made in the web interface will be overwritten.</p>\n",
    );

    let triggers: Vec<String> = report.triggers.iter().map(Trigger::summary).collect();
    let rows = [
        ("Node", assigned_node(job).unwrap_or("any").to_string()),
        ("SCM", job.scm.summary()),
        ("Triggers", list_or_none(triggers.as_slice())),
        ("Upstream", list_or_none(report.upstream)),
        ("Downstream", list_or_none(report.downstream)),
    ];

    out.push_str("<table>\n");
    for (label, value) in rows {
        out.push_str(&format!(
            "<tr><th>{}</th><td>{}</td></tr>\n",
            label,
            partial_escape(value.as_str())
        ));
    }
    out.push_str("</table>");
    out
}

fn list_or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items
            .iter()
            .map(|item| item.as_ref())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// SHA-256 of a rendered document with its leading comment banner removed.
///
/// Two renders of an unchanged job differ only in the banner timestamp, so
/// this digest identifies documents whose content actually changed.
pub fn body_digest(xml: &str) -> String {
    let body = match (xml.find("<!--"), xml.find("-->")) {
        (Some(start), Some(end)) if start < end => {
            let mut body = String::with_capacity(xml.len());
            body.push_str(&xml[..start]);
            body.push_str(&xml[end + 3..]);
            body
        }
        _ => xml.to_string(),
    };
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobSet, MavenSettings, Task, TriggerConfig};
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    fn doc(job: &Job) -> Document {
        let index = JobSet::new(vec![job.clone()]).unwrap().index();
        build_document(job, &index, at()).unwrap()
    }

    fn names(element: &Element) -> Vec<&str> {
        element.elements().map(|e| e.name()).collect()
    }

    #[test]
    fn test_freestyle_section_order() {
        let mut job = Job::new("kotlin");
        job.builders.push(Task::shell("make"));
        let document = doc(&job);
        assert_eq!(document.root.name(), FREESTYLE_ROOT);
        assert_eq!(
            names(&document.root),
            vec![
                "actions",
                "description",
                "keepDependencies",
                "properties",
                "scm",
                "scmCheckoutRetryCount",
                "canRoam",
                "disabled",
                "blockBuildWhenDownstreamBuilding",
                "blockBuildWhenUpstreamBuilding",
                "triggers",
                "concurrentBuild",
                "builders",
                "publishers",
                "buildWrappers",
            ]
        );
    }

    #[test]
    fn test_maven_section_tail() {
        let mut job = Job::new("kotlin-maven");
        job.maven = Some(MavenSettings::new("install"));
        let document = doc(&job);
        assert_eq!(document.root.name(), MAVEN_ROOT);
        let names = names(&document.root);
        assert!(!names.contains(&"builders"));
        assert_eq!(
            &names[names.len() - 5..],
            &[
                "publishers",
                "buildWrappers",
                "prebuilders",
                "postbuilders",
                "runPostStepsIfResult"
            ]
        );
    }

    #[test]
    fn test_log_rotator_only_when_configured() {
        assert!(log_rotator(&LogRotation::default()).is_none());
        let element = log_rotator(&LogRotation {
            artifact_num_to_keep: 3,
            ..LogRotation::default()
        })
        .unwrap();
        assert_eq!(element.elements().count(), 4);
        assert_eq!(element.find("daysToKeep").unwrap().text_content(), "-1");
    }

    #[test]
    fn test_blank_node_roams() {
        let mut job = Job::new("kotlin");
        job.node = Some("  ".to_string());
        let document = doc(&job);
        assert!(document.root.find("assignedNode").is_none());
        assert_eq!(
            document.root.find("canRoam").unwrap().text_content(),
            "true"
        );
        let text = document.root.find("description").unwrap().text_content();
        assert!(text.contains("<tr><th>Node</th><td>any</td></tr>"));
    }

    #[test]
    fn test_invalid_trigger_stops_rendering() {
        let mut job = Job::new("kotlin");
        job.triggers.push(TriggerConfig::gerrit(vec![]));
        let index = JobIndex::new();
        assert!(build_document(&job, &index, at()).is_err());
    }

    #[test]
    fn test_description_report() {
        let mut job = Job::new("kotlin");
        job.description = Some("Builds <b>kotlin</b>".to_string());
        job.node = Some("linux".to_string());
        let document = doc(&job);
        let text = document.root.find("description").unwrap().text_content();
        assert!(text.starts_with("Builds <b>kotlin</b>\n\n<p>"));
        assert!(text.contains("<tr><th>Node</th><td>linux</td></tr>"));
        assert!(text.contains("<tr><th>Upstream</th><td>none</td></tr>"));
    }

    #[test]
    fn test_banner_names_source() {
        let mut job = Job::new("kotlin");
        job.source = Some("jobs/kotlin.json".to_string());
        let banner = banner(&job, at());
        assert!(banner.contains("from jobs/kotlin.json at 2026-10-19T12:00:00Z"));
    }

    #[test]
    fn test_body_digest_ignores_banner() {
        let a = "<?xml version=\"1.0\"?>\n<!--\n  at 1\n-->\n<project/>\n";
        let b = "<?xml version=\"1.0\"?>\n<!--\n  at 2\n-->\n<project/>\n";
        let c = "<?xml version=\"1.0\"?>\n<!--\n  at 2\n-->\n<project></project>\n";
        assert_eq!(body_digest(a), body_digest(b));
        assert_ne!(body_digest(b), body_digest(c));
        assert_eq!(body_digest(a).len(), 64);
    }
}
