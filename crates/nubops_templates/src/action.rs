//! Build modes, lifecycle script kinds and the actions a build performs.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Policy controlling the side effects of a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Preview only: nothing is written and no script runs.
    #[default]
    Show,
    /// Write new files only, fail if a target already exists.
    Write,
    /// Write files, replacing existing targets.
    Overwrite,
}

impl BuildMode {
    pub const ALL: [BuildMode; 3] = [BuildMode::Show, BuildMode::Write, BuildMode::Overwrite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Write => "write",
            Self::Overwrite => "overwrite",
        }
    }

    /// Whether this mode touches the filesystem.
    pub fn writes(&self) -> bool {
        matches!(self, Self::Write | Self::Overwrite)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "build mode is {:?} but must be one of: show, write, overwrite",
                    s
                )
            })
    }
}

/// Lifecycle hook of a template family, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptKind {
    Install,
    Before,
    After,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 3] = [ScriptKind::Install, ScriptKind::Before, ScriptKind::After];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Before => "before",
            Self::After => "after",
        }
    }

    /// Name of the script file inside a family's `commands` folder.
    pub fn sh_name(&self) -> String {
        format!("{}.sh", self.as_str())
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a build writes or runs, as reported to a build sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildAction {
    WriteFile {
        mode: BuildMode,
        target_path: PathBuf,
        content: String,
    },
    RunScript {
        kind: ScriptKind,
        content: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_mode_from_str() {
        assert_eq!("show".parse::<BuildMode>().unwrap(), BuildMode::Show);
        assert_eq!("overwrite".parse::<BuildMode>().unwrap(), BuildMode::Overwrite);
        let error = "preview".parse::<BuildMode>().unwrap_err();
        assert!(error.contains("show, write, overwrite"));
    }

    #[test]
    fn test_build_mode_deserializes_from_lowercase_name() {
        #[derive(Deserialize)]
        struct Settings {
            mode: BuildMode,
        }
        let settings: Settings = toml::from_str("mode = \"overwrite\"").unwrap();
        assert_eq!(settings.mode, BuildMode::Overwrite);
        assert!(toml::from_str::<Settings>("mode = \"Show\"").is_err());
    }

    #[test]
    fn test_only_write_modes_write() {
        assert!(!BuildMode::Show.writes());
        assert!(BuildMode::Write.writes());
        assert!(BuildMode::Overwrite.writes());
    }

    #[test]
    fn test_script_kinds_are_ordered_by_execution() {
        let mut kinds = vec![ScriptKind::After, ScriptKind::Install, ScriptKind::Before];
        kinds.sort();
        assert_eq!(kinds, ScriptKind::ALL.to_vec());
        assert_eq!(ScriptKind::Before.sh_name(), "before.sh");
    }
}
