//! `scm` section, one renderer per [`ScmKind`].

use crate::job::{Job, Repository, ScmKind};
use crate::xml::Element;

const DEFAULT_BRANCH: &str = "master";
const DEFAULT_REMOTE: &str = "origin";

pub(crate) fn scm(job: &Job) -> Element {
    match job.scm.kind {
        ScmKind::None => Element::class("scm", "hudson.scm.NullSCM"),
        ScmKind::Git => git(job),
        ScmKind::Subversion => subversion(job),
    }
}

fn git(job: &Job) -> Element {
    let repositories = &job.scm.repositories;
    let build_chooser = if job.has_gerrit_trigger() {
        "com.sonyericsson.hudson.plugins.gerrit.trigger.hudsontrigger.GerritTriggerBuildChooser"
    } else {
        "hudson.plugins.git.util.DefaultBuildChooser"
    };

    // Branch specs are shared across remotes; keep the first occurrence.
    let mut branches: Vec<&str> = Vec::new();
    for repository in repositories {
        let branch = repository.branch.as_deref().unwrap_or(DEFAULT_BRANCH);
        if !branches.contains(&branch) {
            branches.push(branch);
        }
    }

    Element::class("scm", "hudson.plugins.git.GitSCM")
        .child(Element::leaf("configVersion", 2))
        .child(
            Element::new("userRemoteConfigs")
                .children(repositories.iter().map(git_remote)),
        )
        .child(Element::new("branches").children(branches.into_iter().map(|branch| {
            Element::new("hudson.plugins.git.BranchSpec").child(Element::leaf("name", branch))
        })))
        .child(Element::flag("doGenerateSubmoduleConfigurations", false))
        .child(Element::flag("clean", false))
        .child(Element::flag("wipeOutWorkspace", job.scm.wipe_out_workspace))
        .child(Element::flag("pruneBranches", false))
        .child(Element::flag("remotePoll", false))
        .child(Element::class("buildChooser", build_chooser))
        .child(Element::leaf("gitTool", "Default"))
        .child(Element::class("submoduleCfg", "list"))
        .child_opt(
            repositories
                .iter()
                .find_map(|r| r.local_dir.as_deref())
                .map(|dir| Element::leaf("relativeTargetDir", dir)),
        )
        .child(Element::flag("skipTag", true))
}

fn git_remote(repository: &Repository) -> Element {
    Element::new("hudson.plugins.git.UserRemoteConfig")
        .child(Element::leaf(
            "name",
            repository.name.as_deref().unwrap_or(DEFAULT_REMOTE),
        ))
        .child(Element::leaf(
            "refspec",
            repository.refspec.as_deref().unwrap_or_default(),
        ))
        .child(Element::leaf("url", &repository.url))
}

fn subversion(job: &Job) -> Element {
    Element::class("scm", "hudson.scm.SubversionSCM")
        .child(
            Element::new("locations").children(job.scm.repositories.iter().map(|repository| {
                Element::new("hudson.scm.SubversionSCM_-ModuleLocation")
                    .child(Element::leaf("remote", &repository.url))
                    .child(Element::leaf(
                        "local",
                        repository.local_dir.as_deref().unwrap_or("."),
                    ))
                    .child(Element::leaf("depthOption", "infinity"))
                    .child(Element::flag("ignoreExternalsOption", false))
            })),
        )
        .child(Element::new("excludedRegions"))
        .child(Element::new("includedRegions"))
        .child(Element::new("excludedUsers"))
        .child(Element::new("excludedRevprop"))
        .child(Element::new("excludedCommitMessages"))
        .child(workspace_updater(job.scm.wipe_out_workspace))
        .child(Element::flag("ignoreDirPropChanges", false))
        .child(Element::flag("filterChangelog", false))
}

fn workspace_updater(wipe_out: bool) -> Element {
    let class = if wipe_out {
        "hudson.scm.subversion.CheckoutUpdater"
    } else {
        "hudson.scm.subversion.UpdateUpdater"
    };
    Element::class("workspaceUpdater", class)
}
