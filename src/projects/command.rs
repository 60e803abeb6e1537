use std::fmt;

use crate::config_file::ConfigCommand;

/// A program and its arguments, run without a shell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub cmd: String,
    pub args: Vec<String>,
}

impl Command {
    #[must_use]
    pub fn new<I, S>(cmd: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cmd: cmd.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a copy of this command with `arg` appended
    #[must_use]
    pub fn with_arg(&self, arg: impl Into<String>) -> Self {
        let mut command = self.clone();
        command.args.push(arg.into());
        command
    }
}

/// Renders as `program arg1 arg2 ...`
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cmd)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

impl From<ConfigCommand> for Command {
    fn from(config: ConfigCommand) -> Self {
        Command {
            cmd: config.cmd,
            args: config.args.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_without_args() {
        assert_eq!(Command::new("yarn", Vec::<String>::new()).to_string(), "yarn");
    }

    #[test]
    fn test_display_with_args() {
        let command = Command::new("yarn", ["link", "shared-ui"]);
        assert_eq!(command.to_string(), "yarn link shared-ui");
    }

    #[test]
    fn test_with_arg_leaves_original_untouched() {
        let tool = Command::new("yarn", ["link"]);
        let linked = tool.with_arg("core");
        assert_eq!(linked.args, vec!["link", "core"]);
        assert_eq!(tool.args, vec!["link"]);
    }
}
