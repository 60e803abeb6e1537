use std::path::Path;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use log::info;

use super::{Executor, ExecutorError, RETURN_CODE_SUCCESS};
use crate::progress::Progress;
use crate::projects::command::Command;

/// Reports what would run and succeeds without spawning anything
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor;

impl Executor for DryRunExecutor {
    fn run<'a>(
        &'a self,
        command: &'a Command,
        cwd: &'a Path,
        _progress: &'a mut Progress,
    ) -> BoxFuture<'a, Result<i32, ExecutorError>> {
        info!("Would run: {} > {command}", cwd.display());
        future::ready(Ok(RETURN_CODE_SUCCESS)).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dry_run_never_spawns() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let command = Command::new("touch", [marker.to_string_lossy().to_string()]);
        let mut progress = Progress::with_output(Box::new(std::io::sink()), false);
        progress.set_total(1);

        let code = DryRunExecutor
            .run(&command, dir.path(), &mut progress)
            .await
            .unwrap();

        assert_eq!(code, RETURN_CODE_SUCCESS);
        assert!(!marker.exists());
        assert_eq!(progress.done(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_ignores_missing_program() {
        let command = Command::new("definitely-not-installed-anywhere", ["--flag"]);
        let mut progress = Progress::with_output(Box::new(std::io::sink()), false);
        let code = DryRunExecutor
            .run(&command, Path::new("/nonexistent"), &mut progress)
            .await
            .unwrap();
        assert_eq!(code, RETURN_CODE_SUCCESS);
    }
}
