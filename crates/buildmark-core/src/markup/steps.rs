//! Build steps and build wrappers.

use crate::job::{BuildWrapper, Task};
use crate::xml::Element;

const DEFAULT_INSTALLATION: &str = "(Default)";

/// A list of steps under `name` (`builders`, `prebuilders`, `postbuilders`).
pub(crate) fn step_list(name: &str, tasks: &[Task]) -> Element {
    Element::new(name).children(tasks.iter().map(task))
}

pub(crate) fn task(task: &Task) -> Element {
    match task {
        Task::Shell { command } => {
            Element::new("hudson.tasks.Shell").child(Element::leaf("command", command))
        }
        Task::Batch { command } => {
            Element::new("hudson.tasks.BatchFile").child(Element::leaf("command", command))
        }
        Task::Ant {
            targets,
            build_file,
            ant_name,
            properties,
            jvm_options,
        } => Element::new("hudson.tasks.Ant")
            .child(Element::leaf("targets", targets))
            .child(Element::leaf(
                "antName",
                ant_name.as_deref().unwrap_or(DEFAULT_INSTALLATION),
            ))
            .child_opt(jvm_options.as_deref().map(|o| Element::leaf("antOpts", o)))
            .child_opt(build_file.as_deref().map(|f| Element::leaf("buildFile", f)))
            .child_opt(properties.as_deref().map(|p| Element::leaf("properties", p))),
        Task::Maven {
            goals,
            maven_name,
            pom,
            properties,
        } => Element::new("hudson.tasks.Maven")
            .child(Element::leaf("targets", goals))
            .child(Element::leaf(
                "mavenName",
                maven_name.as_deref().unwrap_or(DEFAULT_INSTALLATION),
            ))
            .child_opt(pom.as_deref().map(|p| Element::leaf("pom", p)))
            .child_opt(properties.as_deref().map(|p| Element::leaf("properties", p)))
            .child(Element::flag("usePrivateRepository", false)),
    }
}

pub(crate) fn build_wrappers(wrappers: &[BuildWrapper]) -> Element {
    Element::new("buildWrappers").children(wrappers.iter().map(wrapper))
}

fn wrapper(wrapper: &BuildWrapper) -> Element {
    match wrapper {
        BuildWrapper::Timestamper => {
            Element::new("hudson.plugins.timestamper.TimestamperBuildWrapper")
        }
        BuildWrapper::Timeout {
            minutes,
            fail_build,
        } => Element::new("hudson.plugins.build__timeout.BuildTimeoutWrapper")
            .child(Element::leaf("timeoutMinutes", minutes))
            .child(Element::flag("failBuild", *fail_build)),
        BuildWrapper::AnsiColor { color_map } => {
            Element::new("hudson.plugins.ansicolor.AnsiColorBuildWrapper")
                .child(Element::leaf("colorMapName", color_map))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_step() {
        let element = step_list("builders", &[Task::shell("./build.sh")]);
        let shell = element.find("hudson.tasks.Shell").unwrap();
        assert_eq!(shell.find("command").unwrap().text_content(), "./build.sh");
    }

    #[test]
    fn test_ant_defaults_installation() {
        let element = task(&Task::Ant {
            targets: "dist".to_string(),
            build_file: None,
            ant_name: None,
            properties: None,
            jvm_options: Some("-Xmx1g".to_string()),
        });
        assert_eq!(element.find("antName").unwrap().text_content(), "(Default)");
        assert_eq!(element.find("antOpts").unwrap().text_content(), "-Xmx1g");
        assert!(element.find("buildFile").is_none());
    }

    #[test]
    fn test_empty_wrappers() {
        assert!(build_wrappers(&[]).nodes().is_empty());
    }

    #[test]
    fn test_timeout_wrapper() {
        let element = build_wrappers(&[BuildWrapper::Timeout {
            minutes: 45,
            fail_build: true,
        }]);
        let timeout = element.elements().next().unwrap();
        assert_eq!(timeout.find("timeoutMinutes").unwrap().text_content(), "45");
        assert_eq!(timeout.find("failBuild").unwrap().text_content(), "true");
    }
}
