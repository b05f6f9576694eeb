//! Maven module-set sections: the root POM block before the publishers and
//! the pre/post build steps after the build wrappers.

use crate::job::{MailSettings, MavenSettings};
use crate::markup::steps::step_list;
use crate::xml::Element;

/// `rootPOM` through `reporters`.
pub(crate) fn root_section(maven: &MavenSettings, mail: Option<&MailSettings>) -> Vec<Element> {
    let locator = if maven.private_repository {
        "hudson.maven.local_repo.PerJobLocalRepositoryLocator"
    } else {
        "hudson.maven.local_repo.DefaultLocalRepositoryLocator"
    };

    vec![
        Element::leaf("rootPOM", &maven.root_pom),
        Element::leaf("goals", &maven.goals),
        Element::leaf("mavenName", maven.maven_name.as_deref().unwrap_or_default()),
        Element::leaf("mavenOpts", maven.maven_opts.as_deref().unwrap_or_default()),
        Element::flag("aggregatorStyleBuild", true),
        Element::flag("incrementalBuild", false),
        Element::class("localRepository", locator),
        Element::flag("ignoreUpstremChanges", false),
        Element::flag("archivingDisabled", false),
        reporters(mail),
    ]
}

fn reporters(mail: Option<&MailSettings>) -> Element {
    let mailer = mail.and_then(|mail| {
        mail.recipient_list().map(|recipients| {
            Element::new("hudson.maven.reporters.MavenMailer")
                .child(Element::leaf("recipients", recipients))
                .child(Element::flag(
                    "dontNotifyEveryUnstableBuild",
                    !mail.notify_every_unstable_build,
                ))
                .child(Element::flag("sendToIndividuals", mail.send_to_individuals))
                .child(Element::flag("perModuleEmail", true))
        })
    });
    Element::new("reporters").child_opt(mailer)
}

/// `prebuilders`, `postbuilders` and `runPostStepsIfResult`.
pub(crate) fn trailing_section(maven: &MavenSettings) -> Vec<Element> {
    let result = maven.run_post_steps_if;
    vec![
        step_list("prebuilders", &maven.prebuilders),
        step_list("postbuilders", &maven.postbuilders),
        Element::new("runPostStepsIfResult")
            .child(Element::leaf("name", result.name()))
            .child(Element::leaf("ordinal", result.ordinal()))
            .child(Element::leaf("color", result.color()))
            .child(Element::flag("completeBuild", true)),
    ]
}
