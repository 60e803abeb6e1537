use log::debug;

use crate::plan::package::{LINK_SCRIPT, Package};
use crate::projects::config::{LookupError, PATH_SEPARATOR, ProjectConfig};
use crate::projects::project::Project;

/// Extracts the packages of a single project, without descending into its children
pub type PackageFn = fn(&ProjectConfig, &Project, &str) -> Vec<Package>;

/// Turns the project tree into the ordered list of packages a run executes.
///
/// For each top-level project the plan holds, in order:
/// 1. the link package of the project, then of each child project
/// 2. the script packages of the project, then of each child project
///
/// Children are visited one level deep, in declaration order.
pub struct Planner<'a> {
    config: &'a ProjectConfig,
}

impl<'a> Planner<'a> {
    #[must_use]
    pub fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }

    /// Plan every top-level project in declaration order
    #[must_use]
    pub fn plan(&self) -> Vec<Package> {
        self.config
            .projects()
            .iter()
            .flat_map(|project| self.package_project(project, &project.name))
            .collect()
    }

    /// Plan only the given project paths, in the given order.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::ProjectNotFound` if a root does not resolve to a declared project.
    pub fn plan_projects<S: AsRef<str>>(&self, roots: &[S]) -> Result<Vec<Package>, LookupError> {
        let mut packages = Vec::new();
        for root in roots {
            let path = root.as_ref();
            let project = self.config.project(path)?;
            packages.extend(self.package_project(project, path));
        }
        Ok(packages)
    }

    fn package_project(&self, project: &Project, path: &str) -> Vec<Package> {
        let mut packages = self.package_tree(link_packages, project, path);
        packages.extend(self.package_tree(script_packages, project, path));
        debug!("Planned {} packages for {path}", packages.len());
        packages
    }

    /// Apply `extract` to `project` and then to each of its immediate children
    fn package_tree(&self, extract: PackageFn, project: &Project, path: &str) -> Vec<Package> {
        let mut packages = extract(self.config, project, path);
        for child in &project.children {
            let child_path = format!("{path}{PATH_SEPARATOR}{}", child.name);
            packages.extend(extract(self.config, child, &child_path));
        }
        packages
    }
}

fn link_packages(config: &ProjectConfig, project: &Project, path: &str) -> Vec<Package> {
    if project.linked_projects.is_empty() {
        return Vec::new();
    }
    vec![Package::new(
        LINK_SCRIPT,
        path,
        config.link_commands(&project.linked_projects),
    )]
}

fn script_packages(config: &ProjectConfig, project: &Project, path: &str) -> Vec<Package> {
    project
        .run
        .iter()
        .filter_map(|script| match config.script_commands(script) {
            Some(commands) if !commands.is_empty() => {
                Some(Package::new(script.as_str(), path, commands.to_vec()))
            }
            _ => {
                debug!("Script '{script}' of {path} has no commands, skipping");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::Config;

    fn config(yaml: &str) -> ProjectConfig {
        Config::from_yaml(yaml).unwrap().into()
    }

    fn summary(packages: &[Package]) -> Vec<String> {
        packages
            .iter()
            .map(|p| format!("{}:{}:{}", p.project_path, p.script_name, p.commands.len()))
            .collect()
    }

    #[test]
    fn test_empty_config_yields_empty_plan() {
        let config = ProjectConfig::default();
        assert!(Planner::new(&config).plan().is_empty());
    }

    #[test]
    fn test_single_project_single_script() {
        let config = config(
            "projects:\n  app:\n    run: [build]\ncommands:\n  build:\n    - cmd: tool\n",
        );
        let plan = Planner::new(&config).plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].script_name, "build");
        assert_eq!(plan[0].project_path, "app");
        assert_eq!(plan[0].commands[0].cmd, "tool");
    }

    #[test]
    fn test_links_without_scripts() {
        let config = config("projects:\n  app:\n    linked_projects: [x, y]\n");
        let plan = Planner::new(&config).plan();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].script_name, LINK_SCRIPT);
        let rendered: Vec<String> = plan[0].commands.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["yarn link x", "yarn link y"]);
    }

    #[test]
    fn test_no_link_package_without_linked_projects() {
        let config = config(
            "projects:\n  app:\n    linked_projects: []\n    run: [build]\ncommands:\n  build:\n    - cmd: tool\n",
        );
        let plan = Planner::new(&config).plan();
        assert!(plan.iter().all(|p| p.script_name != LINK_SCRIPT));
    }

    #[test]
    fn test_unknown_and_empty_scripts_are_skipped() {
        let config = config(
            "projects:\n  app:\n    run: [missing, empty, build]\ncommands:\n  empty: []\n  build:\n    - cmd: tool\n",
        );
        let plan = Planner::new(&config).plan();
        assert_eq!(summary(&plan), vec!["app:build:1"]);
    }

    #[test]
    fn test_links_precede_scripts_across_children() {
        let config = config(
            r"
projects:
  project1:
    run: [build]
    linked_projects: [linked-project1]
  project2:
    run: [build, test]
    linked_projects: [linked-project1, linked-project2]
    child_projects:
      child-project1:
        run: [build]
        linked_projects: [linked-project1]
      child-project2:
        linked_projects: [linked-project3]
commands:
  build:
    - cmd: yarn
    - cmd: yarn
      args: [build]
  test:
    - cmd: yarn
      args: [test]
",
        );
        let plan = Planner::new(&config).plan();
        assert_eq!(
            summary(&plan),
            vec![
                "project1:link:1",
                "project1:build:2",
                "project2:link:2",
                "project2/child-project1:link:1",
                "project2/child-project2:link:1",
                "project2:build:2",
                "project2:test:1",
                "project2/child-project1:build:2",
            ]
        );
    }

    #[test]
    fn test_child_scripts_use_nested_path() {
        let config = config(
            "projects:\n  parent:\n    child_projects:\n      child:\n        run: [build]\ncommands:\n  build:\n    - cmd: tool\n",
        );
        let plan = Planner::new(&config).plan();
        assert_eq!(summary(&plan), vec!["parent/child:build:1"]);
    }

    #[test]
    fn test_grandchildren_are_not_planned() {
        let config = config(
            "projects:\n  a:\n    child_projects:\n      b:\n        child_projects:\n          c:\n            linked_projects: [x]\n",
        );
        assert!(Planner::new(&config).plan().is_empty());
    }

    #[test]
    fn test_plan_is_deterministic() {
        let config = config(
            "projects:\n  a:\n    run: [build]\n    linked_projects: [x]\n  b:\n    run: [build]\ncommands:\n  build:\n    - cmd: tool\n",
        );
        let planner = Planner::new(&config);
        assert_eq!(planner.plan(), planner.plan());
    }

    #[test]
    fn test_plan_projects_selects_roots_in_order() {
        let config = config(
            "projects:\n  a:\n    run: [build]\n  b:\n    run: [build]\ncommands:\n  build:\n    - cmd: tool\n",
        );
        let plan = Planner::new(&config).plan_projects(&["b", "a"]).unwrap();
        assert_eq!(summary(&plan), vec!["b:build:1", "a:build:1"]);
    }

    #[test]
    fn test_plan_projects_unknown_root() {
        let config = config("projects:\n  a: {}\n");
        let err = Planner::new(&config).plan_projects(&["nope"]).unwrap_err();
        assert_eq!(
            err,
            LookupError::ProjectNotFound {
                path: "nope".to_string()
            }
        );
    }
}
