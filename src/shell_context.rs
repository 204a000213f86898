use std::sync::Mutex;

use crate::{
    backend_readiness::Readiness,
    launch_plan::LaunchPlan,
    process_supervisor::{ProcessSupervisor, TerminationOutcome},
    startup_error::StartupError,
    window_lifecycle::{CloseDecision, WindowCommand, WindowLifecycleController},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuitTrigger {
    UserRequested,
    UpdateInstalled,
    /// The framework is already exiting; only teardown is left to do.
    FrameworkExit,
}

impl QuitTrigger {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::UserRequested => "user requested",
            Self::UpdateInstalled => "update installed",
            Self::FrameworkExit => "framework exit",
        }
    }

    /// The framework call that ends this run once teardown is done.
    pub(crate) fn exit_action(self) -> Option<ExitAction> {
        match self {
            Self::UserRequested => Some(ExitAction::Exit(0)),
            Self::UpdateInstalled => Some(ExitAction::Restart),
            Self::FrameworkExit => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExitAction {
    Exit(i32),
    /// Relaunch into the freshly installed build.
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QuitOutcome {
    pub(crate) termination: TerminationOutcome,
    pub(crate) exit: Option<ExitAction>,
}

/// The single owner of the backend process and the window session.
#[derive(Debug)]
pub(crate) struct ShellContext {
    supervisor: ProcessSupervisor,
    controller: WindowLifecycleController,
}

impl ShellContext {
    pub(crate) fn new(controller: WindowLifecycleController) -> Self {
        Self {
            supervisor: ProcessSupervisor::default(),
            controller,
        }
    }

    pub(crate) fn controller(&self) -> &WindowLifecycleController {
        &self.controller
    }

    pub(crate) fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Launches the backend, then opens the window. A launch failure leaves
    /// the window unopened.
    pub(crate) fn start<F>(
        &mut self,
        plan: &LaunchPlan,
        log: F,
    ) -> Result<Vec<WindowCommand>, StartupError>
    where
        F: Fn(&str) + Copy,
    {
        self.supervisor.launch(plan, log)?;
        if let Some(process) = self.supervisor.process() {
            log(&format!(
                "backend running pid={} executable={} args={:?} stdout_log={} stderr_log={}",
                process.pid(),
                process.executable.display(),
                process.args,
                process.stdout_log.display(),
                process.stderr_log.display()
            ));
        }
        Ok(self.controller.open())
    }

    pub(crate) fn on_retry_elapsed<F>(
        &mut self,
        token_id: u64,
        readiness: Readiness,
        log: F,
    ) -> Vec<WindowCommand>
    where
        F: Fn(&str) + Copy,
    {
        if !self.controller.is_terminated() {
            self.supervisor.refresh_liveness(log);
        }
        self.controller.on_retry_elapsed(token_id, readiness)
    }

    pub(crate) fn on_close_requested(&mut self) -> (CloseDecision, Vec<WindowCommand>) {
        self.controller.on_close_requested()
    }

    pub(crate) fn on_activate(&mut self) -> Vec<WindowCommand> {
        self.controller.on_activate()
    }

    /// Tears down window state and backend exactly once per run.
    pub(crate) fn full_quit<F>(&mut self, trigger: QuitTrigger, log: F) -> Option<QuitOutcome>
    where
        F: Fn(&str) + Copy,
    {
        if !self.controller.begin_quit() {
            log(&format!(
                "quit ({}) ignored: shutdown already in progress",
                trigger.as_str()
            ));
            return None;
        }

        log(&format!("full quit ({}): terminating backend", trigger.as_str()));
        let termination = self.supervisor.terminate(log);
        Some(QuitOutcome {
            termination,
            exit: trigger.exit_action(),
        })
    }
}

/// Tauri managed state wrapper; only the main thread locks it.
#[derive(Debug)]
pub(crate) struct ShellState {
    context: Mutex<ShellContext>,
}

impl ShellState {
    pub(crate) fn new(context: ShellContext) -> Self {
        Self {
            context: Mutex::new(context),
        }
    }

    pub(crate) fn with_context<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut ShellContext) -> R,
    {
        match self.context.lock() {
            Ok(mut guard) => f(&mut *guard),
            Err(error) => {
                crate::append_desktop_log(&format!(
                    "shell context lock poisoned, recovering: {error}"
                ));
                f(&mut *error.into_inner())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::window_lifecycle::{LifecycleSettings, WindowPhase};

    fn context() -> ShellContext {
        ShellContext::new(WindowLifecycleController::new(LifecycleSettings {
            splash_url: Url::parse("file:///opt/pttai/resources/loading.html").unwrap(),
            content_url: Url::parse("http://localhost:9774").unwrap(),
            poll_interval: Duration::from_millis(5_000),
            probe_retries: 0,
            width: 414.0,
            height: 1000.0,
        }))
    }

    fn exit_calls(outcomes: &[Option<QuitOutcome>]) -> usize {
        outcomes
            .iter()
            .flatten()
            .filter(|outcome| outcome.exit.is_some())
            .count()
    }

    #[test]
    fn each_trigger_maps_to_one_exit_action() {
        assert_eq!(
            QuitTrigger::UserRequested.exit_action(),
            Some(ExitAction::Exit(0))
        );
        assert_eq!(
            QuitTrigger::UpdateInstalled.exit_action(),
            Some(ExitAction::Restart)
        );
        assert_eq!(QuitTrigger::FrameworkExit.exit_action(), None);
    }

    #[test]
    fn user_quit_then_update_signal_exits_once() {
        let mut context = context();
        let outcomes = [
            context.full_quit(QuitTrigger::UserRequested, |_| {}),
            context.full_quit(QuitTrigger::UpdateInstalled, |_| {}),
            context.full_quit(QuitTrigger::FrameworkExit, |_| {}),
        ];

        assert_eq!(
            outcomes[0],
            Some(QuitOutcome {
                termination: TerminationOutcome::AlreadyStopped,
                exit: Some(ExitAction::Exit(0)),
            })
        );
        assert_eq!(outcomes.iter().flatten().count(), 1);
        assert_eq!(exit_calls(&outcomes), 1);
        assert_eq!(context.controller().phase(), WindowPhase::Terminated);
    }

    #[test]
    fn installed_update_tears_down_once_then_restarts() {
        let mut context = context();
        let outcome = context
            .full_quit(QuitTrigger::UpdateInstalled, |_| {})
            .unwrap();
        assert_eq!(outcome.exit, Some(ExitAction::Restart));
        assert_eq!(context.controller().phase(), WindowPhase::Terminated);

        let later = [
            context.full_quit(QuitTrigger::UserRequested, |_| {}),
            context.full_quit(QuitTrigger::FrameworkExit, |_| {}),
        ];
        assert_eq!(exit_calls(&later), 0);
    }

    #[test]
    fn framework_exit_tears_down_without_exit_call() {
        let mut context = context();
        let outcome = context.full_quit(QuitTrigger::FrameworkExit, |_| {}).unwrap();
        assert_eq!(outcome.exit, None);
        assert!(context.full_quit(QuitTrigger::UserRequested, |_| {}).is_none());
    }

    #[test]
    fn state_wrapper_gives_mutable_access() {
        let state = ShellState::new(context());
        let phase = state.with_context(|context| {
            context.on_activate();
            context.controller().phase()
        });
        assert_eq!(phase, WindowPhase::Unopened);
    }

    #[cfg(unix)]
    mod with_backend {
        use std::{fs, os::unix::fs::PermissionsExt, path::Path};

        use super::*;
        use crate::{
            backend_platform::PlatformFamily, launch_plan::resolve_launch_plan,
            shell_config::ShellConfig, window_lifecycle::RetryToken,
        };

        fn plan_with_backend(dir: &Path) -> LaunchPlan {
            let name = PlatformFamily::current().unwrap().backend_executable();
            let path = dir.join(name);
            fs::write(&path, "#!/bin/sh\nexec sleep 30\n").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

            let config = ShellConfig::from_lookup(|_| None).unwrap();
            resolve_launch_plan(std::env::consts::OS, dir, &dir.join("logs"), &config).unwrap()
        }

        fn token_of(commands: &[WindowCommand]) -> RetryToken {
            commands
                .iter()
                .find_map(|command| match command {
                    WindowCommand::ScheduleRetry { token, .. } => Some(token.clone()),
                    _ => None,
                })
                .unwrap()
        }

        #[test]
        fn full_lifecycle_spawns_once_and_terminates_once() {
            let dir = tempfile::tempdir().unwrap();
            let plan = plan_with_backend(dir.path());
            let mut context = context();

            let opened = context.start(&plan, |_| {}).unwrap();
            assert!(context.supervisor().is_running());
            let token = token_of(&opened);

            let loaded = context.on_retry_elapsed(token.id(), Readiness::Assumed, |_| {});
            assert_eq!(
                loaded,
                vec![WindowCommand::Load(
                    Url::parse("http://localhost:9774").unwrap()
                )]
            );

            let (decision, _) = context.on_close_requested();
            assert_eq!(decision, CloseDecision::HideInstead);
            assert_eq!(context.on_activate(), vec![WindowCommand::Show]);
            assert!(matches!(
                context.start(&plan, |_| {}),
                Err(StartupError::AlreadyLaunched)
            ));

            let quit = context.full_quit(QuitTrigger::UserRequested, |_| {});
            assert_eq!(
                quit.map(|outcome| outcome.termination),
                Some(TerminationOutcome::Signalled)
            );
            assert!(!context.supervisor().is_running());
            assert!(context.full_quit(QuitTrigger::UserRequested, |_| {}).is_none());
        }

        #[test]
        fn quit_mid_retry_makes_pending_timer_a_no_op() {
            let dir = tempfile::tempdir().unwrap();
            let plan = plan_with_backend(dir.path());
            let mut context = context();

            let token = token_of(&context.start(&plan, |_| {}).unwrap());
            context.full_quit(QuitTrigger::UserRequested, |_| {});

            assert!(token.is_cancelled());
            assert!(context
                .on_retry_elapsed(token.id(), Readiness::Assumed, |_| {})
                .is_empty());
        }
    }
}
