use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::projects::command::Command;

/// Script name given to the synthesized packages that link projects together
pub const LINK_SCRIPT: &str = "link";

/// One script bound to one project path, with its resolved commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub script_name: String,
    pub project_path: String,
    pub commands: Vec<Command>,
}

impl Package {
    #[must_use]
    pub fn new(
        script_name: impl Into<String>,
        project_path: impl Into<String>,
        commands: Vec<Command>,
    ) -> Self {
        Self {
            script_name: script_name.into(),
            project_path: project_path.into(),
            commands,
        }
    }

    /// Directory the package's commands run in
    #[must_use]
    pub fn working_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.project_path)
    }

    /// Multi-line description used by dry runs:
    ///
    /// ```text
    /// app/web [link]:
    ///  - /work/app/web > yarn link ui
    /// ```
    #[must_use]
    pub fn describe(&self, base_dir: &Path) -> String {
        let cwd = self.working_dir(base_dir);
        let mut out = format!("{} [{}]:", self.project_path, self.script_name);
        for command in &self.commands {
            let _ = write!(out, "\n - {} > {command}", cwd.display());
        }
        out
    }
}

/// Total number of commands across all packages
#[must_use]
pub fn command_count(packages: &[Package]) -> usize {
    packages.iter().map(|p| p.commands.len()).sum()
}
