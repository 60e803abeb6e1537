//! Running single commands, for real or as a dry run

use std::path::Path;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::progress::Progress;
use crate::projects::command::Command;

mod dry;
mod process;

pub use dry::DryRunExecutor;
pub use process::ProcessExecutor;

/// Exit code of a successful command
pub const RETURN_CODE_SUCCESS: i32 = 0;

/// Exit code reported for commands that could not be started, as shells do
pub const RETURN_CODE_LAUNCH_FAILURE: i32 = 127;

/// Exit code reported when a started command could not be awaited
pub const RETURN_CODE_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("Unable to launch `{command}`: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Lost track of `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl ExecutorError {
    /// The exit code the failed command counts as
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutorError::Launch { .. } => RETURN_CODE_LAUNCH_FAILURE,
            ExecutorError::Io { .. } => RETURN_CODE_FAILURE,
        }
    }
}

/// Runs one command in a working directory and resolves to its exit code
pub trait Executor: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExecutorError` if the command could not be started or awaited.
    fn run<'a>(
        &'a self,
        command: &'a Command,
        cwd: &'a Path,
        progress: &'a mut Progress,
    ) -> BoxFuture<'a, Result<i32, ExecutorError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_by_failure_kind() {
        let launch = ExecutorError::Launch {
            command: "tool".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let io = ExecutorError::Io {
            command: "tool".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::BrokenPipe),
        };
        assert_eq!(launch.exit_code(), RETURN_CODE_LAUNCH_FAILURE);
        assert_eq!(io.exit_code(), RETURN_CODE_FAILURE);
    }
}
