//! `properties` section: build parameters and the project link.

use crate::job::{Job, JobParameter};
use crate::xml::Element;

pub(crate) fn properties(job: &Job) -> Element {
    let project_url = job
        .project_url
        .as_deref()
        .filter(|url| !url.trim().is_empty())
        .map(|url| {
            Element::new("com.coravy.hudson.plugins.github.GithubProjectProperty")
                .child(Element::leaf("projectUrl", url))
        });

    let parameters = (!job.parameters.is_empty()).then(|| {
        Element::new("hudson.model.ParametersDefinitionProperty").child(
            Element::new("parameterDefinitions").children(job.parameters.iter().map(parameter)),
        )
    });

    Element::new("properties")
        .child_opt(project_url)
        .child_opt(parameters)
}

fn parameter(parameter: &JobParameter) -> Element {
    match parameter {
        JobParameter::String {
            name,
            default,
            description,
        } => Element::new("hudson.model.StringParameterDefinition")
            .child(Element::leaf("name", name))
            .child(parameter_description(description.as_deref()))
            .child(Element::leaf("defaultValue", default)),
        JobParameter::Boolean {
            name,
            default,
            description,
        } => Element::new("hudson.model.BooleanParameterDefinition")
            .child(Element::leaf("name", name))
            .child(parameter_description(description.as_deref()))
            .child(Element::flag("defaultValue", *default)),
        JobParameter::Choice {
            name,
            choices,
            description,
        } => Element::new("hudson.model.ChoiceParameterDefinition")
            .child(Element::leaf("name", name))
            .child(parameter_description(description.as_deref()))
            .child(
                Element::class("choices", "java.util.Arrays$ArrayList").child(
                    Element::class("a", "string-array")
                        .children(choices.iter().map(|c| Element::leaf("string", c))),
                ),
            ),
    }
}

/// Free-form text, kept verbatim in CDATA.
fn parameter_description(description: Option<&str>) -> Element {
    match description.filter(|d| !d.is_empty()) {
        Some(text) => Element::new("description").cdata(text),
        None => Element::new("description"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::Node;

    #[test]
    fn test_empty_properties() {
        assert!(properties(&Job::new("kotlin")).nodes().is_empty());
    }

    #[test]
    fn test_parameters_and_project_url() {
        let mut job = Job::new("kotlin");
        job.project_url = Some("https://github.com/JetBrains/kotlin".to_string());
        job.parameters = vec![
            JobParameter::Boolean {
                name: "CLEAN".to_string(),
                default: true,
                description: None,
            },
            JobParameter::Choice {
                name: "TARGET".to_string(),
                choices: vec!["jvm".to_string(), "js".to_string()],
                description: Some("backend".to_string()),
            },
        ];

        let element = properties(&job);
        assert!(element
            .find("com.coravy.hudson.plugins.github.GithubProjectProperty")
            .is_some());
        let definitions = element
            .find("hudson.model.ParametersDefinitionProperty")
            .unwrap()
            .find("parameterDefinitions")
            .unwrap();
        let boolean = definitions.elements().next().unwrap();
        assert_eq!(boolean.find("defaultValue").unwrap().text_content(), "true");
        let choice = definitions.elements().nth(1).unwrap();
        assert!(matches!(
            choice.find("description").unwrap().nodes(),
            [Node::CData(text)] if text == "backend"
        ));
        let strings: Vec<String> = choice
            .find("choices")
            .unwrap()
            .find("a")
            .unwrap()
            .elements()
            .map(|e| e.text_content())
            .collect();
        assert_eq!(strings, vec!["jvm", "js"]);
    }
}
