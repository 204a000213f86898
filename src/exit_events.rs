use tauri::{AppHandle, Manager};

use crate::{
    append_shutdown_log,
    shell_context::{ExitAction, QuitOutcome, QuitTrigger, ShellState},
};

/// Single entry point for every quit path: tray, update installer and the
/// framework's own exit events.
pub(crate) fn request_full_quit(app_handle: &AppHandle, trigger: QuitTrigger) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        if let Some(exit) = trigger.exit_action() {
            append_shutdown_log("shell state missing at quit; exiting directly");
            apply_exit_action(app_handle, exit);
        }
        return;
    };

    let outcome = state.with_context(|context| {
        append_shutdown_log(&format!(
            "quit requested ({}): window phase={:?} backend running={}",
            trigger.as_str(),
            context.controller().phase(),
            context.supervisor().is_running()
        ));
        context.full_quit(trigger, append_shutdown_log)
    });

    let Some(QuitOutcome { termination, exit }) = outcome else {
        return;
    };
    append_shutdown_log(&format!("backend termination: {termination:?}"));
    if let Some(exit) = exit {
        apply_exit_action(app_handle, exit);
    }
}

fn apply_exit_action(app_handle: &AppHandle, exit: ExitAction) {
    match exit {
        ExitAction::Exit(code) => app_handle.exit(code),
        ExitAction::Restart => {
            append_shutdown_log("restarting into the installed update");
            app_handle.request_restart();
        }
    }
}

/// `code` is `None` when the exit came from outside the shell, e.g. the
/// platform quit shortcut. Exits and restarts the shell issued itself are
/// already torn down.
pub(crate) fn handle_exit_requested(app_handle: &AppHandle, code: Option<i32>) {
    if code.is_none() {
        request_full_quit(app_handle, QuitTrigger::FrameworkExit);
    }
}

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    request_full_quit(app_handle, QuitTrigger::FrameworkExit);
    append_shutdown_log("desktop process exiting");
}
