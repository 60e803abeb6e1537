use crate::config_file::ConfigProject;

/// A named unit of the workspace with its scripts, links and nested projects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub run: Vec<String>,
    pub linked_projects: Vec<String>,
    pub children: Vec<Project>,
}

impl Project {
    /// Looks up an immediate child project by name
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Project> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Build a project from its config entry, `name` being the map key it was declared under
    #[must_use]
    pub fn from_config(name: String, config: ConfigProject) -> Self {
        let children = config
            .child_projects
            .unwrap_or_default()
            .into_iter()
            .map(|(child_name, child)| Project::from_config(child_name, child))
            .collect();
        Project {
            name,
            run: config.run.unwrap_or_default(),
            linked_projects: config.linked_projects.unwrap_or_default(),
            children,
        }
    }
}
