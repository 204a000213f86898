use std::{thread, time::Duration};

use tauri::{AppHandle, Manager};
use url::Url;

use crate::{
    append_desktop_log,
    backend_readiness::{self, Readiness},
    main_window,
    shell_context::ShellState,
    ui_dispatch,
    window_lifecycle::RetryToken,
};

#[derive(Debug, Clone)]
pub(crate) struct ReadinessProbeSettings {
    pub(crate) backend_url: Url,
    pub(crate) timeout: Duration,
}

/// Sleeps off the readiness interval on a worker thread, then hands the
/// result back to the main thread. A cancelled token ends the task silently.
pub(crate) fn spawn_retry_timer(
    app_handle: AppHandle,
    delay: Duration,
    token: RetryToken,
    probe: bool,
) -> Result<(), String> {
    let probe_settings = if probe {
        app_handle
            .try_state::<ReadinessProbeSettings>()
            .map(|settings| settings.inner().clone())
    } else {
        None
    };

    thread::Builder::new()
        .name(format!("readiness-retry-{}", token.id()))
        .spawn(move || {
            thread::sleep(delay);
            if token.is_cancelled() {
                return;
            }

            let readiness = match &probe_settings {
                Some(settings) => {
                    backend_readiness::probe_readiness(&settings.backend_url, settings.timeout)
                }
                None => Readiness::Assumed,
            };
            if token.is_cancelled() {
                return;
            }

            let token_id = token.id();
            if let Err(error) = ui_dispatch::run_on_main_thread_dispatch(
                &app_handle,
                "readiness retry",
                move |main_app| handle_retry_elapsed(main_app, token_id, readiness),
            ) {
                append_desktop_log(&error);
            }
        })
        .map(|_| ())
        .map_err(|error| format!("Failed to spawn readiness retry timer: {error}"))
}

fn handle_retry_elapsed(app_handle: &AppHandle, token_id: u64, readiness: Readiness) {
    let Some(state) = app_handle.try_state::<ShellState>() else {
        return;
    };

    let (commands, current_url) = state.with_context(|context| {
        let commands = context.on_retry_elapsed(token_id, readiness, append_desktop_log);
        let current_url = context
            .controller()
            .session()
            .and_then(|session| session.current_url())
            .map(Url::to_string);
        (commands, current_url)
    });
    if commands.is_empty() {
        return;
    }

    append_desktop_log(&format!(
        "readiness retry {token_id} elapsed (readiness={readiness:?}); window target={}",
        current_url.as_deref().unwrap_or("none")
    ));
    main_window::apply_window_commands(app_handle, commands, append_desktop_log);
}
