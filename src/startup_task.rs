use std::path::PathBuf;

use tauri::{path::BaseDirectory, AppHandle, Manager};
use url::Url;

use crate::{
    append_desktop_log, append_startup_log,
    launch_plan::{self, build_debug_command},
    main_window,
    retry_timer::ReadinessProbeSettings,
    runtime_paths,
    shell_config::ShellConfig,
    shell_context::{ShellContext, ShellState},
    startup_error::StartupError,
    window_lifecycle::{LifecycleSettings, WindowLifecycleController},
    MAIN_WINDOW_HEIGHT, MAIN_WINDOW_WIDTH, PACKAGED_BACKEND_RESOURCE_DIR, SPLASH_RESOURCE_PATH,
};

fn resolve_resource_path(app_handle: &AppHandle, relative_path: &str) -> Option<PathBuf> {
    app_handle
        .path()
        .resolve(relative_path, BaseDirectory::Resource)
        .ok()
}

fn resolve_splash_url(app_handle: &AppHandle) -> Url {
    let splash = resolve_resource_path(app_handle, SPLASH_RESOURCE_PATH)
        .and_then(|path| Url::from_file_path(&path).ok());
    match splash {
        Some(url) => url,
        None => {
            append_startup_log("splash page could not be resolved; using a blank page");
            Url::parse("about:blank").unwrap_or_else(|_| unreachable!("about:blank is a valid URL"))
        }
    }
}

/// Launches the backend and opens the window, in that order.
pub(crate) fn start_shell(app_handle: &AppHandle, config: &ShellConfig) -> Result<(), StartupError> {
    let packaged_dir = resolve_resource_path(app_handle, PACKAGED_BACKEND_RESOURCE_DIR)
        .unwrap_or_else(|| PathBuf::from(PACKAGED_BACKEND_RESOURCE_DIR));
    let base_dir = launch_plan::resolve_base_dir(
        config,
        runtime_paths::development_backend_dir(),
        packaged_dir,
    );
    let log_dir =
        runtime_paths::backend_log_dir(runtime_paths::default_packaged_root_dir(), &base_dir);
    append_startup_log(&format!(
        "run mode={:?} base dir={} backend log dir={}",
        config.run_mode,
        base_dir.display(),
        log_dir.display()
    ));

    let plan = launch_plan::resolve_launch_plan(std::env::consts::OS, &base_dir, &log_dir, config)?;
    append_startup_log(&format!(
        "backend launch plan: platform={:?} command={:?}",
        plan.platform,
        build_debug_command(&plan)
    ));

    let controller = WindowLifecycleController::new(LifecycleSettings {
        splash_url: resolve_splash_url(app_handle),
        content_url: config.backend_url.clone(),
        poll_interval: config.readiness_poll_interval,
        probe_retries: config.readiness_probe_retries,
        width: MAIN_WINDOW_WIDTH,
        height: MAIN_WINDOW_HEIGHT,
    });
    app_handle.manage(ReadinessProbeSettings {
        backend_url: config.backend_url.clone(),
        timeout: config.readiness_probe_timeout,
    });
    app_handle.manage(ShellState::new(ShellContext::new(controller)));

    let state = app_handle.state::<ShellState>();
    let commands = state.with_context(|context| context.start(&plan, append_startup_log))?;
    main_window::apply_window_commands(app_handle, commands, append_desktop_log);
    Ok(())
}

pub(crate) fn report_startup_failure(error: &StartupError) {
    let message = format!("PTT.ai startup failed: {error}");
    append_startup_log(&message);
    eprintln!("{message}");
}
