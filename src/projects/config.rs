use std::collections::HashMap;

use thiserror::Error;

use crate::config_file::Config;
use crate::projects::command::Command;
use crate::projects::project::Project;

/// Separator between the segments of a project path, eg `app/web`
pub const PATH_SEPARATOR: char = '/';

const DEFAULT_LINK_TOOL: &str = "yarn";

/// Errors raised when the configuration is asked for something it does not declare
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("Project not found: {path}")]
    ProjectNotFound { path: String },
}

/// Read-only view over the loaded projects and script registry
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    projects: Vec<Project>,
    scripts: HashMap<String, Vec<Command>>,
    link_tool: Command,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::new(Vec::new(), HashMap::new(), None)
    }
}

impl ProjectConfig {
    /// `link_tool` defaults to `yarn link`
    #[must_use]
    pub fn new(
        projects: Vec<Project>,
        scripts: HashMap<String, Vec<Command>>,
        link_tool: Option<Command>,
    ) -> Self {
        Self {
            projects,
            scripts,
            link_tool: link_tool.unwrap_or_else(|| Command::new(DEFAULT_LINK_TOOL, ["link"])),
        }
    }

    /// Resolves a slash-joined path such as `app/web` to its declaration.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::ProjectNotFound` if any segment of the path is not declared.
    pub fn project(&self, path: &str) -> Result<&Project, LookupError> {
        let not_found = || LookupError::ProjectNotFound {
            path: path.to_string(),
        };
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next().ok_or_else(not_found)?;
        let mut project = self
            .projects
            .iter()
            .find(|project| project.name == first)
            .ok_or_else(not_found)?;
        for segment in segments {
            project = project.child(segment).ok_or_else(not_found)?;
        }
        Ok(project)
    }

    /// Top-level projects in declaration order
    #[must_use]
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Top-level project names in declaration order
    #[must_use]
    pub fn project_names(&self) -> Vec<&str> {
        self.projects.iter().map(|p| p.name.as_str()).collect()
    }

    /// Commands of a named script, `None` if the script is not declared
    #[must_use]
    pub fn script_commands(&self, name: &str) -> Option<&[Command]> {
        self.scripts.get(name).map(Vec::as_slice)
    }

    pub fn scripts(&self) -> impl Iterator<Item = (&str, &[Command])> {
        self.scripts
            .iter()
            .map(|(name, commands)| (name.as_str(), commands.as_slice()))
    }

    #[must_use]
    pub fn link_tool(&self) -> &Command {
        &self.link_tool
    }

    /// The link tool invocation for one linked project, eg `yarn link shared-ui`
    #[must_use]
    pub fn link_command(&self, project: &str) -> Command {
        self.link_tool.with_arg(project)
    }

    #[must_use]
    pub fn link_commands(&self, projects: &[String]) -> Vec<Command> {
        projects.iter().map(|p| self.link_command(p)).collect()
    }
}

impl From<Config> for ProjectConfig {
    fn from(config: Config) -> Self {
        let projects = config
            .projects
            .unwrap_or_default()
            .into_iter()
            .map(|(name, project)| Project::from_config(name, project))
            .collect();
        let scripts = config
            .commands
            .unwrap_or_default()
            .into_iter()
            .map(|(name, commands)| (name, commands.into_iter().map(Command::from).collect()))
            .collect();
        ProjectConfig::new(projects, scripts, config.link.map(Command::from))
    }
}
