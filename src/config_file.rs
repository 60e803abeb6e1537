//! Configuration file handling for Projector

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::{debug, info};
use schemars::JsonSchema;
use serde::de::{Error as _, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No config file found in current directory or its parents: {0}")]
    ConfigNotFound(PathBuf),
    #[error("Unknown working directory: {0}")]
    UnknownWorkingDirectory(String),
    #[error("Unable to parse YAML config file {path}: {source}")]
    Yaml {
        source: serde_yaml::Error,
        path: PathBuf,
    },
    #[error("Unable to parse JSON config file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("Invalid config: {0}")]
    Validation(String),
}

/// A string-keyed map that keeps its entries in document order.
///
/// Project declaration order drives the execution plan, so the usual
/// `HashMap` is not an option for `projects` and `child_projects`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<V> IntoIterator for OrderedMap<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = OrderedMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, V)> = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            if entries.iter().any(|(existing, _)| *existing == key) {
                return Err(A::Error::custom(format!("duplicate key `{key}`")));
            }
            entries.push((key, value));
        }
        Ok(OrderedMap(entries))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// A single program invocation
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
pub struct ConfigCommand {
    /// Program to execute, looked up on `PATH`
    pub cmd: String,
    /// Arguments passed to the program, never interpreted by a shell
    pub args: Option<Vec<String>>,
}

/// Configuration for a single project
#[derive(Debug, Deserialize, Serialize, JsonSchema, Default)]
pub struct ConfigProject {
    /// Script names to run for this project, in order
    pub run: Option<Vec<String>>,
    /// Projects to link into this one before any script runs
    #[serde(alias = "linkedProjects")]
    pub linked_projects: Option<Vec<String>>,
    /// Nested projects, resolved relative to this project's directory
    #[serde(alias = "childProjects")]
    #[schemars(with = "Option<std::collections::BTreeMap<String, ConfigProject>>")]
    pub child_projects: Option<OrderedMap<ConfigProject>>,
}

/// Root configuration structure for Projector
#[derive(Debug, Deserialize, Serialize, JsonSchema, Default)]
pub struct Config {
    /// Top-level projects, executed in declaration order
    #[schemars(with = "Option<std::collections::BTreeMap<String, ConfigProject>>")]
    pub projects: Option<OrderedMap<ConfigProject>>,
    /// Named scripts shared by every project
    pub commands: Option<HashMap<String, Vec<ConfigCommand>>>,
    /// Link tool invocation, the linked project name is appended as the last argument
    pub link: Option<ConfigCommand>,
}

/// List of supported configuration file names
const FILENAMES: [&str; 3] = [".projector.json", ".projector.yaml", ".projector.yml"];

impl Config {
    /// Loads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file cannot be read, or
    /// `ConfigError::Yaml`/`ConfigError::Json` if parsing fails.
    pub fn from_file(file: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(file)
            .map_err(|_| ConfigError::ConfigNotFound(file.to_path_buf()))?;
        if file.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&contents).map_err(|e| ConfigError::Json {
                source: e,
                path: file.to_path_buf(),
            })
        } else {
            Self::from_yaml(&contents).map_err(|e| ConfigError::Yaml {
                source: e,
                path: file.to_path_buf(),
            })
        }
    }

    /// # Errors
    ///
    /// Returns the parser error if `contents` is not a valid JSON config.
    pub fn from_json(contents: &str) -> Result<Config, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// # Errors
    ///
    /// Returns the parser error if `contents` is not a valid YAML config.
    pub fn from_yaml(contents: &str) -> Result<Config, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Searches for a configuration file in the current directory and its parents.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownWorkingDirectory` if the cwd cannot be determined,
    /// or `ConfigError::ConfigNotFound` if no config file is found.
    pub fn find_config() -> Result<PathBuf, ConfigError> {
        let cwd = std::env::current_dir()
            .map_err(|e| ConfigError::UnknownWorkingDirectory(e.to_string()))?;
        Self::find_config_from(&cwd)
    }

    /// Same as [`Config::find_config`], starting from `start` instead of the cwd.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if no config file is found.
    pub fn find_config_from(start: &Path) -> Result<PathBuf, ConfigError> {
        let mut path = start.to_path_buf();
        debug!("Searching for config file in {}", start.display());
        loop {
            for file in &FILENAMES {
                let config_path = path.join(file);
                if config_path.exists() {
                    info!("Found config file: {}", config_path.display());
                    return Ok(config_path);
                }
            }
            if !path.pop() {
                return Err(ConfigError::ConfigNotFound(start.to_path_buf()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_file_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".projector.json");
        std::fs::write(
            &path,
            r#"{
                "projects": {"app": {"run": ["build"]}},
                "commands": {"build": [{"cmd": "yarn", "args": ["build"]}]}
            }"#,
        )
        .unwrap();
        let config = Config::from_file(&path).unwrap();
        let projects = config.projects.unwrap();
        assert_eq!(projects.0[0].0, "app");
        assert_eq!(config.commands.unwrap()["build"][0].cmd, "yarn");
    }

    #[test]
    fn test_from_file_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".projector.yaml");
        std::fs::write(
            &path,
            "projects:\n  app:\n    run: [build]\ncommands:\n  build:\n    - cmd: yarn\n",
        )
        .unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.projects.unwrap().0.len(), 1);
    }

    #[test]
    fn test_project_order_is_preserved() {
        let config = Config::from_json(
            r#"{"projects": {"zeta": {}, "alpha": {}, "mid": {"childProjects": {"b": {}, "a": {}}}}}"#,
        )
        .unwrap();
        let projects = config.projects.unwrap();
        let names: Vec<&str> = projects.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        let children = projects.0[2].1.child_projects.as_ref().unwrap();
        let child_names: Vec<&str> = children.iter().map(|(name, _)| name).collect();
        assert_eq!(child_names, vec!["b", "a"]);
    }

    #[test]
    fn test_camel_case_aliases() {
        let config = Config::from_yaml(
            "projects:\n  app:\n    linkedProjects: [lib]\n    childProjects:\n      web: {}\n",
        )
        .unwrap();
        let (_, app) = &config.projects.unwrap().0[0];
        assert_eq!(app.linked_projects.as_deref(), Some(&["lib".to_string()][..]));
        assert!(app.child_projects.is_some());
    }

    #[test]
    fn test_duplicate_project_rejected() {
        let result = Config::from_json(r#"{"projects": {"app": {}, "app": {}}}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate key `app`"), "got: {err}");
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".projector.yaml");
        std::fs::write(&path, "projects: [not, a, map]\n").unwrap();
        match Config::from_file(&path) {
            Err(ConfigError::Yaml { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected ConfigError::Yaml, got: {other:?}"),
        }
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".projector.yml"), "projects: {}\n").unwrap();
        let found = Config::find_config_from(&nested).unwrap();
        assert_eq!(found, dir.path().join(".projector.yml"));
    }
}
