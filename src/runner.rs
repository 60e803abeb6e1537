//! Top-level orchestration: plan the configuration, then execute it fail-fast

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, error, info};
use thiserror::Error;

use crate::config_file::ConfigError;
use crate::executor::{DryRunExecutor, Executor, ProcessExecutor, RETURN_CODE_SUCCESS};
use crate::plan::{Package, Planner, command_count};
use crate::progress::Progress;
use crate::projects::config::{LookupError, ProjectConfig};

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every command of every package exited successfully
    Done,
    /// The plan was reported without executing anything
    DryRun,
    /// A command failed, nothing after it ran
    Failed {
        code: i32,
        script_name: String,
        project_path: String,
    },
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: RunStatus,
    pub completed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl RunReport {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Done | RunStatus::DryRun => RETURN_CODE_SUCCESS,
            RunStatus::Failed { code, .. } => code,
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code() == RETURN_CODE_SUCCESS
    }

    /// `Done!` on success, `Exited with code: N` otherwise
    #[must_use]
    pub fn summary(&self) -> String {
        if self.succeeded() {
            "Done!".to_string()
        } else {
            format!("Exited with code: {}", self.exit_code())
        }
    }
}

/// Runs a configuration's plan, one command at a time.
///
/// The first command that exits non-zero (or cannot be launched) stops the
/// run; its code becomes the result of the run.
pub struct ConfigRunner<'a> {
    config: &'a ProjectConfig,
    base_dir: PathBuf,
    dry_run: bool,
    roots: Vec<String>,
    executor: Box<dyn Executor + 'a>,
    progress: Progress,
}

impl<'a> ConfigRunner<'a> {
    #[must_use]
    pub fn new(config: &'a ProjectConfig, base_dir: PathBuf, dry_run: bool) -> Self {
        let executor: Box<dyn Executor + 'a> = if dry_run {
            Box::new(DryRunExecutor)
        } else {
            Box::new(ProcessExecutor)
        };
        // Dry runs never draw the bar
        let progress = if dry_run {
            Progress::hidden()
        } else {
            Progress::new()
        };
        Self {
            config,
            base_dir,
            dry_run,
            roots: Vec::new(),
            executor,
            progress,
        }
    }

    /// Restrict the run to these project paths instead of every top-level project
    #[must_use]
    pub fn with_roots(mut self, roots: Vec<String>) -> Self {
        self.roots = roots;
        self
    }

    #[must_use]
    pub fn with_executor(mut self, executor: Box<dyn Executor + 'a>) -> Self {
        self.executor = executor;
        self
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    /// The packages this runner would execute, in order.
    ///
    /// # Errors
    ///
    /// Returns `LookupError::ProjectNotFound` if a selected root is not declared.
    pub fn plan(&self) -> Result<Vec<Package>, LookupError> {
        let planner = Planner::new(self.config);
        if self.roots.is_empty() {
            Ok(planner.plan())
        } else {
            planner.plan_projects(&self.roots)
        }
    }

    /// Plan and execute the configuration.
    ///
    /// # Errors
    ///
    /// Returns `RunError::Lookup` if the plan cannot be built. Failing commands
    /// are not errors, they are reported through [`RunReport::status`].
    pub async fn run(&mut self) -> Result<RunReport, RunError> {
        let start = Instant::now();
        let packages = self.plan()?;
        let total = command_count(&packages);
        self.progress.set_total(total);
        debug!(
            "Planned {} packages with {total} commands",
            packages.len()
        );

        if self.dry_run {
            self.progress.hide_bar();
            self.report_plan(&packages);
        }

        let mut status = if self.dry_run {
            RunStatus::DryRun
        } else {
            RunStatus::Done
        };
        for package in &packages {
            let code = self.run_package(package).await;
            if code != RETURN_CODE_SUCCESS {
                status = RunStatus::Failed {
                    code,
                    script_name: package.script_name.clone(),
                    project_path: package.project_path.clone(),
                };
                break;
            }
        }
        self.progress.finish();

        Ok(RunReport {
            status,
            completed: self.progress.done(),
            total,
            elapsed: start.elapsed(),
        })
    }

    fn report_plan(&mut self, packages: &[Package]) {
        for package in packages {
            self.progress.print("");
            self.progress.print(&package.describe(&self.base_dir));
        }
        self.progress.print("");
    }

    /// Run a package's commands in order, returning the first non-zero code
    async fn run_package(&mut self, package: &Package) -> i32 {
        self.progress.suspend(|| {
            info!(
                "Running Script: {}[{}]",
                package.script_name, package.project_path
            );
        });
        let cwd = package.working_dir(&self.base_dir);
        for command in &package.commands {
            let code = match self.executor.run(command, &cwd, &mut self.progress).await {
                Ok(code) => code,
                Err(e) => {
                    self.progress.suspend(|| error!("{e}"));
                    e.exit_code()
                }
            };
            if code != RETURN_CODE_SUCCESS {
                return code;
            }
        }
        RETURN_CODE_SUCCESS
    }
}

/// Resolve the base directory projects live under, the current directory by default.
///
/// # Errors
///
/// Returns `ConfigError::UnknownWorkingDirectory` if the current directory cannot be determined.
pub fn resolve_base_dir(base_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let base_dir = match base_dir {
        Some(dir) if !dir.as_os_str().is_empty() && dir != Path::new(".") => dir,
        _ => {
            return std::env::current_dir()
                .map_err(|e| ConfigError::UnknownWorkingDirectory(e.to_string()));
        }
    };
    std::path::absolute(base_dir).map_err(|e| ConfigError::UnknownWorkingDirectory(e.to_string()))
}

#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let tenths = d.subsec_millis() / 100;
    if total_secs < 60 {
        format!("{total_secs}.{tenths}s")
    } else {
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        format!("{mins}m {secs}.{tenths}s")
    }
}
