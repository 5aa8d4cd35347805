use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::registry::{Naming, DEFAULT_CLONE_SUFFIX, DEFAULT_COURSE_NAME};

pub const DEFAULT_EXPORT_FILE: &str = "grades-export.json";
pub const DEFAULT_FLASH_DURATION: &str = "3s";

/// Contents of config.yaml. Every field is optional.
///
/// Example YAML:
/// ```yaml
/// data_dir: ~/grades
/// export_file: my-grades.json
/// default_course_name: Untitled
/// clone_suffix: " (next term)"
/// theme: dark
/// flash_duration: 5s
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the course store lives (default: platform data dir)
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Default filename for exports
    #[serde(default)]
    pub export_file: Option<String>,

    #[serde(default)]
    pub default_course_name: Option<String>,

    /// Appended to a course name when it is cloned
    #[serde(default)]
    pub clone_suffix: Option<String>,

    /// auto, dark or light
    #[serde(default)]
    pub theme: Option<String>,

    /// How long TUI status messages stay visible, e.g. "3s" or "500ms"
    #[serde(default)]
    pub flash_duration: Option<String>,
}

impl Config {
    /// Store directory, expanding a leading `~/`
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => expand_home(dir),
            None => super::get_default_data_dir(),
        }
    }

    pub fn export_file(&self) -> &str {
        self.export_file.as_deref().unwrap_or(DEFAULT_EXPORT_FILE)
    }

    pub fn naming(&self) -> Naming {
        Naming {
            default_course_name: self
                .default_course_name
                .clone()
                .unwrap_or_else(|| DEFAULT_COURSE_NAME.to_string()),
            clone_suffix: self
                .clone_suffix
                .clone()
                .unwrap_or_else(|| DEFAULT_CLONE_SUFFIX.to_string()),
        }
    }

    /// Flash duration, falling back to the default if unset or unparseable.
    /// Startup validation rejects unparseable values before this is used.
    pub fn flash_duration(&self) -> std::time::Duration {
        let raw = self.flash_duration.as_deref().unwrap_or(DEFAULT_FLASH_DURATION);
        humantime::parse_duration(raw).unwrap_or(std::time::Duration::from_secs(3))
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
