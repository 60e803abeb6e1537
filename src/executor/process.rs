use std::path::Path;
use std::process::{ExitStatus, Stdio};

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{Executor, ExecutorError, RETURN_CODE_FAILURE};
use crate::progress::Progress;
use crate::projects::command::Command;

/// Spawns commands as child processes.
///
/// Stdout is forwarded line by line through [`Progress::output`], stderr is
/// inherited so it reaches the terminal untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn run<'a>(
        &'a self,
        command: &'a Command,
        cwd: &'a Path,
        progress: &'a mut Progress,
    ) -> BoxFuture<'a, Result<i32, ExecutorError>> {
        async move {
            progress.suspend(|| info!("Spawning Command: {} > {command}", cwd.display()));
            let code = spawn_and_wait(command, cwd, progress).await?;
            progress.complete_one();
            progress.suspend(|| info!("Done Command: {} > {command} ({code})", cwd.display()));
            Ok(code)
        }
        .boxed()
    }
}

async fn spawn_and_wait(
    command: &Command,
    cwd: &Path,
    progress: &mut Progress,
) -> Result<i32, ExecutorError> {
    let io_error = |source| ExecutorError::Io {
        command: command.to_string(),
        source,
    };

    let mut child = tokio::process::Command::new(&command.cmd)
        .args(&command.args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ExecutorError::Launch {
            command: command.to_string(),
            source,
        })?;
    debug!("Started process {:?} for `{command}`", child.id());

    // Stderr is inherited, so draining stdout to EOF cannot deadlock the child
    if let Some(stdout) = child.stdout.take() {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await.map_err(io_error)? == 0 {
                break;
            }
            let line = String::from_utf8_lossy(&buf);
            progress.output(line.trim_end_matches(['\r', '\n']));
        }
    }

    let status = child.wait().await.map_err(io_error)?;
    Ok(exit_code(status))
}

/// Exit code of a finished process, `128 + signal` for processes killed by a signal
#[must_use]
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    RETURN_CODE_FAILURE
}
