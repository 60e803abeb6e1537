//! Core implementation of the Projector workspace runner
//!
//! Projector reads a declarative description of the projects in a monorepo, the
//! links between them and the named scripts they run. It flattens that
//! description into an ordered plan of packages and executes the plan one
//! command at a time, stopping at the first failure.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config_file::{Config, ConfigError};
use crate::projects::config::{PATH_SEPARATOR, ProjectConfig};
use crate::projects::project::Project;

pub mod config_file;
pub mod executor;
pub mod logger;
pub mod plan;
pub mod progress;
pub mod projects;
pub mod runner;

/// Load configuration from a file (or auto-detect), returning the `ProjectConfig` and the config file path.
///
/// # Errors
///
/// Returns `ConfigError` if the config file is not found, cannot be parsed,
/// or contains invalid values.
pub fn load_config(config_file: Option<&Path>) -> Result<(ProjectConfig, PathBuf), ConfigError> {
    let config_path = match config_file {
        Some(file) => {
            if !file.exists() {
                return Err(ConfigError::ConfigNotFound(file.to_path_buf()));
            }
            file.to_path_buf()
        }
        None => Config::find_config()?,
    };
    debug!("Loading config file: {}", config_path.display());
    let config: ProjectConfig = Config::from_file(&config_path)?.into();
    validate_config(&config)?;
    Ok((config, config_path))
}

/// Reject configs the planner cannot execute and warn about parts it will ignore
///
/// # Errors
///
/// Returns `ConfigError::Validation` for empty project names and empty programs.
pub fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    for project in config.projects() {
        check_project_names(project, "")?;
        check_nesting(project);
    }
    check_empty_commands(config)?;
    check_unknown_scripts(config);
    Ok(())
}

fn check_project_names(project: &Project, parent: &str) -> Result<(), ConfigError> {
    if project.name.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "Project under '{parent}' has an empty name"
        )));
    }
    if project.name.contains(PATH_SEPARATOR) {
        return Err(ConfigError::Validation(format!(
            "Project name '{}' must not contain '{PATH_SEPARATOR}'",
            project.name
        )));
    }
    for child in &project.children {
        check_project_names(child, &project.name)?;
    }
    Ok(())
}

fn check_nesting(project: &Project) {
    for child in &project.children {
        if !child.children.is_empty() {
            warn!(
                "Child projects of '{}{PATH_SEPARATOR}{}' are nested too deep and will not run",
                project.name, child.name
            );
        }
    }
}

fn check_empty_commands(config: &ProjectConfig) -> Result<(), ConfigError> {
    for (script, commands) in config.scripts() {
        if commands.iter().any(|c| c.cmd.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Script '{script}' has a command with an empty cmd string"
            )));
        }
    }
    if config.link_tool().cmd.trim().is_empty() {
        return Err(ConfigError::Validation(
            "Link tool has an empty cmd string".to_string(),
        ));
    }
    Ok(())
}

fn check_unknown_scripts(config: &ProjectConfig) {
    fn visit(config: &ProjectConfig, project: &Project, path: &str) {
        for script in &project.run {
            if config.script_commands(script).is_none() {
                warn!("Project '{path}' runs unknown script '{script}', it will be skipped");
            }
        }
        for child in &project.children {
            visit(config, child, &format!("{path}{PATH_SEPARATOR}{}", child.name));
        }
    }
    for project in config.projects() {
        visit(config, project, &project.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> ProjectConfig {
        Config::from_yaml(yaml).unwrap().into()
    }

    #[test]
    fn test_valid_config_passes() {
        let config = parse(
            "projects:\n  app:\n    run: [build, unknown]\n    child_projects:\n      web:\n        linked_projects: [ui]\ncommands:\n  build:\n    - cmd: yarn\n",
        );
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_project_name_rejected() {
        let config = parse("projects:\n  app:\n    child_projects:\n      ' ': {}\n");
        match validate_config(&config) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("empty name"), "got: {msg}"),
            other => panic!("Expected Validation error, got: {other:?}"),
        }
    }

    #[test]
    fn test_separator_in_project_name_rejected() {
        let config = parse("projects:\n  a/b: {}\n");
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_cmd_rejected() {
        let config = parse("commands:\n  build:\n    - cmd: ''\n");
        match validate_config(&config) {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("empty cmd"), "got: {msg}"),
            other => panic!("Expected Validation error, got: {other:?}"),
        }
    }

    #[test]
    fn test_empty_link_tool_rejected() {
        let config = parse("link:\n  cmd: ' '\n");
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
