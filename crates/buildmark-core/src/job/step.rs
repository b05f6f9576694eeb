//! Build steps and build wrappers.

use serde::{Deserialize, Serialize};

/// A build step. Freestyle jobs run these as `builders`; Maven jobs use
/// them as pre- and post-build steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Task {
    /// Run a shell script.
    Shell { command: String },

    /// Run a Windows batch script.
    Batch { command: String },

    /// Invoke Ant targets.
    Ant {
        targets: String,
        #[serde(default)]
        build_file: Option<String>,
        #[serde(default)]
        ant_name: Option<String>,
        #[serde(default)]
        properties: Option<String>,
        #[serde(default)]
        jvm_options: Option<String>,
    },

    /// Invoke top-level Maven goals.
    Maven {
        goals: String,
        #[serde(default)]
        maven_name: Option<String>,
        #[serde(default)]
        pom: Option<String>,
        #[serde(default)]
        properties: Option<String>,
    },
}

impl Task {
    pub fn shell(command: impl Into<String>) -> Self {
        Task::Shell {
            command: command.into(),
        }
    }
}

/// A wrapper around the whole build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuildWrapper {
    /// Prefix console lines with timestamps.
    Timestamper,

    /// Abort (or fail) builds running longer than `minutes`.
    Timeout {
        minutes: u32,
        #[serde(default)]
        fail_build: bool,
    },

    /// Render ANSI colors in the console log.
    AnsiColor {
        #[serde(default = "default_color_map")]
        color_map: String,
    },
}

fn default_color_map() -> String {
    "xterm".to_string()
}
