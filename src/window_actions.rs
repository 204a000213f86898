use tauri::{AppHandle, Manager};

use crate::{
    main_window,
    shell_context::{ShellContext, ShellState},
    window_lifecycle::{CloseDecision, WindowCommand},
};

fn run_lifecycle_action<A, F>(app_handle: &AppHandle, action_name: &str, action: A, log: F)
where
    A: FnOnce(&mut ShellContext) -> Vec<WindowCommand>,
    F: Fn(&str) + Copy,
{
    let Some(state) = app_handle.try_state::<ShellState>() else {
        log(&format!("{action_name} skipped: shell state is not ready"));
        return;
    };

    let (commands, visible) = state.with_context(|context| {
        let commands = action(context);
        let visible = context
            .controller()
            .session()
            .map(|session| session.is_visible());
        (commands, visible)
    });
    if !commands.is_empty() {
        log(&format!("{action_name}: window visible={visible:?}"));
    }
    main_window::apply_window_commands(app_handle, commands, log);
}

pub fn show_main_window<F>(app_handle: &AppHandle, log: F)
where
    F: Fn(&str) + Copy,
{
    run_lifecycle_action(app_handle, "show_main_window", ShellContext::on_activate, log);
}

/// Returns whether the native close must be prevented.
pub fn handle_close_requested<F>(app_handle: &AppHandle, log: F) -> CloseDecision
where
    F: Fn(&str) + Copy,
{
    let Some(state) = app_handle.try_state::<ShellState>() else {
        return CloseDecision::AllowClose;
    };

    let (decision, commands) = state.with_context(ShellContext::on_close_requested);
    if decision == CloseDecision::HideInstead {
        log("main window close intercepted; hiding instead");
    }
    main_window::apply_window_commands(app_handle, commands, log);
    decision
}
