use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

use crate::{
    backend_platform::TerminationPlan,
    launch_plan::{build_debug_command, LaunchPlan},
    process_control,
    startup_error::StartupError,
};

#[derive(Debug)]
pub(crate) struct BackendProcess {
    pub(crate) executable: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) stdout_log: PathBuf,
    pub(crate) stderr_log: PathBuf,
    child: Child,
}

impl BackendProcess {
    pub(crate) fn pid(&self) -> u32 {
        self.child.id()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TerminationOutcome {
    Signalled,
    ForcedByName,
    AlreadyStopped,
}

/// Owns the single backend child for the lifetime of the shell.
#[derive(Debug, Default)]
pub(crate) struct ProcessSupervisor {
    process: Option<BackendProcess>,
    termination: Option<TerminationPlan>,
    launched: bool,
}

fn is_runnable_file(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

fn open_log_file(path: &Path) -> Result<File, StartupError> {
    let log_setup_error = |source| StartupError::LogSetup {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(log_setup_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(log_setup_error)
}

impl ProcessSupervisor {
    pub(crate) fn is_running(&self) -> bool {
        self.process.is_some()
    }

    pub(crate) fn process(&self) -> Option<&BackendProcess> {
        self.process.as_ref()
    }

    pub(crate) fn launch<F>(&mut self, plan: &LaunchPlan, log: F) -> Result<u32, StartupError>
    where
        F: Fn(&str),
    {
        if self.launched {
            return Err(StartupError::AlreadyLaunched);
        }
        if !is_runnable_file(&plan.executable) {
            return Err(StartupError::ExecutableMissing(plan.executable.clone()));
        }

        let stdout_file = open_log_file(&plan.stdout_log)?;
        let stderr_file = open_log_file(&plan.stderr_log)?;

        let mut command = Command::new(&plan.executable);
        command
            .args(&plan.args)
            .current_dir(&plan.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file))
            .stderr(Stdio::from(stderr_file));
        process_control::detach_from_shell(&mut command);

        let child = command.spawn().map_err(|source| StartupError::Spawn {
            command: build_debug_command(plan),
            source,
        })?;
        let pid = child.id();
        log(&format!(
            "backend spawned pid={pid} command={:?} stdout={} stderr={}",
            build_debug_command(plan),
            plan.stdout_log.display(),
            plan.stderr_log.display()
        ));

        self.launched = true;
        self.termination = Some(plan.platform.termination_plan(&plan.executable_name));
        self.process = Some(BackendProcess {
            executable: plan.executable.clone(),
            args: plan.args.clone(),
            stdout_log: plan.stdout_log.clone(),
            stderr_log: plan.stderr_log.clone(),
            child,
        });
        Ok(pid)
    }

    /// Drops the handle of a backend that exited on its own. No restart.
    pub(crate) fn refresh_liveness<F>(&mut self, log: F) -> bool
    where
        F: Fn(&str),
    {
        let Some(process) = self.process.as_mut() else {
            return false;
        };

        match process.child.try_wait() {
            Ok(Some(status)) => {
                log(&format!(
                    "backend pid={} exited unexpectedly: {status}",
                    process.pid()
                ));
                self.process = None;
                false
            }
            Ok(None) => true,
            Err(error) => {
                log(&format!(
                    "failed to poll backend pid={}: {error}",
                    process.pid()
                ));
                true
            }
        }
    }

    /// Runs the platform's termination plan at most once; later calls are no-ops.
    pub(crate) fn terminate<F>(&mut self, log: F) -> TerminationOutcome
    where
        F: Fn(&str) + Copy,
    {
        let Some(plan) = self.termination.take() else {
            return TerminationOutcome::AlreadyStopped;
        };

        match plan {
            TerminationPlan::SignalHandle => {
                if !self.refresh_liveness(log) {
                    log("backend already stopped; nothing to terminate");
                    return TerminationOutcome::AlreadyStopped;
                }
                match self.process.take() {
                    Some(mut process) => {
                        process_control::kill_child_process(&mut process.child, log);
                        TerminationOutcome::Signalled
                    }
                    None => TerminationOutcome::AlreadyStopped,
                }
            }
            TerminationPlan::ForcedByName { image_names } => {
                process_control::kill_processes_by_name(&image_names, log);
                if let Some(mut process) = self.process.take() {
                    let pid = process.pid();
                    match process.child.try_wait() {
                        Ok(Some(status)) => {
                            log(&format!("backend pid={pid} already exited: {status}"))
                        }
                        Ok(None) => log(&format!(
                            "backend pid={pid} still running; left to forced termination"
                        )),
                        Err(error) => {
                            log(&format!("failed to poll backend pid={pid}: {error}"))
                        }
                    }
                }
                TerminationOutcome::ForcedByName
            }
        }
    }
}
