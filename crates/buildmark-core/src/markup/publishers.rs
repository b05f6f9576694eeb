//! `publishers` section.

use crate::job::{
    ArchiveSettings, ArtifactorySettings, DownstreamTrigger, Job, MailSettings, Redeploy,
};
use crate::xml::Element;

const PARAMETERIZED: &str = "hudson.plugins.parameterizedtrigger";

/// Marker the parameterized-trigger plugin writes for an empty parameter
/// list. The plugin reads it back as an immutable empty list.
pub const EMPTY_LIST_CLASS: &str = "java.util.Collections$EmptyList";

/// Publishers in fixed order. `downstream_names` are the resolved names of
/// the jobs the downstream trigger starts.
pub(crate) fn publishers(job: &Job, downstream_names: &[&str]) -> Element {
    let maven = job.maven.as_ref();

    let mailer = if maven.is_none() {
        job.mail.as_ref().and_then(mailer)
    } else {
        None
    };
    let test_results = if maven.is_none() {
        job.test_results
            .as_deref()
            .filter(|pattern| !pattern.trim().is_empty())
            .map(junit)
    } else {
        None
    };

    Element::new("publishers")
        .child_opt(job.archive.as_ref().map(archiver))
        .child_opt(test_results)
        .child_opt(mailer)
        .child_opt(maven.and_then(|m| m.redeploy.as_ref()).map(redeploy))
        .child_opt(job.artifactory.as_ref().map(artifactory))
        .child_opt(
            job.downstream
                .as_ref()
                .filter(|_| !downstream_names.is_empty())
                .map(|trigger| downstream(trigger, downstream_names)),
        )
}

fn mailer(mail: &MailSettings) -> Option<Element> {
    let recipients = mail.recipient_list()?;
    Some(
        Element::new("hudson.tasks.Mailer")
            .child(Element::leaf("recipients", recipients))
            .child(Element::flag(
                "dontNotifyEveryUnstableBuild",
                !mail.notify_every_unstable_build,
            ))
            .child(Element::flag("sendToIndividuals", mail.send_to_individuals)),
    )
}

fn archiver(archive: &ArchiveSettings) -> Element {
    Element::new("hudson.tasks.ArtifactArchiver")
        .child(Element::leaf("artifacts", &archive.artifacts))
        .child_opt(
            archive
                .excludes
                .as_deref()
                .map(|excludes| Element::leaf("excludes", excludes)),
        )
        .child(Element::flag("latestOnly", false))
        .child(Element::flag("allowEmptyArchive", archive.allow_empty))
}

fn junit(pattern: &str) -> Element {
    Element::new("hudson.tasks.junit.JUnitResultArchiver")
        .child(Element::leaf("testResults", pattern))
        .child(Element::flag("keepLongStdio", false))
}

fn redeploy(redeploy: &Redeploy) -> Element {
    Element::new("hudson.maven.RedeployPublisher")
        .child(Element::leaf("id", &redeploy.id))
        .child(Element::leaf("url", &redeploy.url))
        .child(Element::flag("uniqueVersion", redeploy.unique_version))
        .child(Element::flag("evenIfUnstable", redeploy.even_if_unstable))
}

fn artifactory(settings: &ArtifactorySettings) -> Element {
    let snapshots = settings
        .snapshot_repository
        .as_deref()
        .unwrap_or(settings.release_repository.as_str());
    Element::new("org.jfrog.hudson.ArtifactoryRedeployPublisher")
        .child(
            Element::new("details")
                .child(Element::leaf("artifactoryName", &settings.server))
                .child(Element::leaf("repositoryKey", &settings.release_repository))
                .child(Element::leaf("snapshotsRepositoryKey", snapshots)),
        )
        .child(Element::flag("deployArtifacts", true))
        .child(Element::flag("evenIfUnstable", settings.even_if_unstable))
        .child(Element::flag("deployBuildInfo", settings.deploy_build_info))
        .child(Element::flag("includeEnvVars", false))
}

fn downstream(trigger: &DownstreamTrigger, names: &[&str]) -> Element {
    Element::new(format!("{PARAMETERIZED}.BuildTrigger")).child(
        Element::new("configs").child(
            Element::new(format!("{PARAMETERIZED}.BuildTriggerConfig"))
                .child(parameter_configs(trigger))
                .child(Element::leaf("projects", names.join(",")))
                .child(Element::leaf("condition", trigger.condition.as_str()))
                .child(Element::flag(
                    "triggerWithNoParameters",
                    trigger.trigger_with_no_parameters,
                )),
        ),
    )
}

/// Parameter providers for a downstream build, or the empty-list marker.
pub(crate) fn parameter_configs(trigger: &DownstreamTrigger) -> Element {
    if trigger.has_no_parameters() {
        return Element::class("configs", EMPTY_LIST_CLASS);
    }

    let mut providers = Vec::new();
    if trigger.current_build_parameters {
        providers.push(Element::new(format!(
            "{PARAMETERIZED}.CurrentBuildParameters"
        )));
    }
    if trigger.scm_revision_parameter {
        providers.push(
            Element::new(format!("{PARAMETERIZED}.SubversionRevisionBuildParameters"))
                .child(Element::flag("includeUpstreamParameters", false)),
        );
    }
    if trigger.git_commit_parameter {
        providers.push(
            Element::new("hudson.plugins.git.GitRevisionBuildParameters")
                .child(Element::flag("combineQueuedCommits", false)),
        );
    }
    if !trigger.predefined_parameters.is_empty() {
        let lines: Vec<String> = trigger
            .predefined_parameters
            .iter()
            .map(|(key, value)| format!("{}={}", key.trim(), value))
            .collect();
        providers.push(
            Element::new(format!("{PARAMETERIZED}.PredefinedBuildParameters"))
                .child(Element::leaf("properties", lines.join("\n"))),
        );
    }
    if let Some(file) = trigger
        .properties_file
        .as_deref()
        .filter(|f| !f.trim().is_empty())
    {
        providers.push(
            Element::new(format!("{PARAMETERIZED}.FileBuildParameters"))
                .child(Element::leaf("propertiesFile", file))
                .child(Element::flag("failTriggerOnMissing", false)),
        );
    }

    Element::new("configs").children(providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{MavenSettings, Redeploy};

    #[test]
    fn test_empty_parameter_list_marker() {
        let element = parameter_configs(&DownstreamTrigger::to_jobs(&["next"]));
        assert_eq!(element.get_attr("class"), Some(EMPTY_LIST_CLASS));
        assert!(element.nodes().is_empty());
    }

    #[test]
    fn test_parameter_sources_in_order() {
        let mut trigger = DownstreamTrigger::to_jobs(&["next"]);
        trigger.current_build_parameters = true;
        trigger.git_commit_parameter = true;
        trigger
            .predefined_parameters
            .insert("B".to_string(), "2".to_string());
        trigger
            .predefined_parameters
            .insert("A".to_string(), "1".to_string());
        trigger.properties_file = Some("build.properties".to_string());

        let element = parameter_configs(&trigger);
        assert!(element.get_attr("class").is_none());
        let names: Vec<&str> = element.elements().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec![
                "hudson.plugins.parameterizedtrigger.CurrentBuildParameters",
                "hudson.plugins.git.GitRevisionBuildParameters",
                "hudson.plugins.parameterizedtrigger.PredefinedBuildParameters",
                "hudson.plugins.parameterizedtrigger.FileBuildParameters",
            ]
        );
        let predefined = element.elements().nth(2).unwrap();
        assert_eq!(
            predefined.find("properties").unwrap().text_content(),
            "A=1\nB=2"
        );
    }

    #[test]
    fn test_mailer_only_for_freestyle() {
        let mut job = Job::new("kotlin");
        job.mail = Some(MailSettings::to(&["dev@example.org"]));
        assert!(publishers(&job, &[]).find("hudson.tasks.Mailer").is_some());

        job.maven = Some(MavenSettings::new("install"));
        assert!(publishers(&job, &[]).find("hudson.tasks.Mailer").is_none());
    }

    #[test]
    fn test_redeploy_for_maven() {
        let mut job = Job::new("kotlin");
        let mut maven = MavenSettings::new("deploy");
        maven.redeploy = Some(Redeploy {
            id: "snapshots".to_string(),
            url: "https://repo.example.org/snapshots".to_string(),
            unique_version: true,
            even_if_unstable: false,
        });
        job.maven = Some(maven);

        let element = publishers(&job, &[]);
        let redeploy = element.find("hudson.maven.RedeployPublisher").unwrap();
        assert_eq!(redeploy.find("id").unwrap().text_content(), "snapshots");
    }

    #[test]
    fn test_artifactory_snapshot_defaults_to_release() {
        let mut job = Job::new("kotlin");
        job.artifactory = Some(ArtifactorySettings {
            server: "repo".to_string(),
            release_repository: "libs-release-local".to_string(),
            ..ArtifactorySettings::default()
        });
        let element = publishers(&job, &[]);
        let details = element
            .find("org.jfrog.hudson.ArtifactoryRedeployPublisher")
            .unwrap()
            .find("details")
            .unwrap();
        assert_eq!(
            details.find("snapshotsRepositoryKey").unwrap().text_content(),
            "libs-release-local"
        );
    }

    #[test]
    fn test_downstream_projects_joined() {
        let mut job = Job::new("build");
        job.downstream = Some(DownstreamTrigger::to_jobs(&["a", "b"]));
        let element = publishers(&job, &["Job A", "Job B"]);
        let config = element
            .find("hudson.plugins.parameterizedtrigger.BuildTrigger")
            .unwrap()
            .find("configs")
            .unwrap()
            .elements()
            .next()
            .unwrap();
        assert_eq!(config.find("projects").unwrap().text_content(), "Job A,Job B");
        assert_eq!(config.find("condition").unwrap().text_content(), "SUCCESS");
    }
}
