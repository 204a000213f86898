use tauri::{Manager, RunEvent, WindowEvent};

use crate::{
    append_desktop_log, append_startup_log, exit_events, logging, runtime_paths,
    shell_config::ShellConfig, startup_task, tray_setup, update_coordinator, window_actions,
    window_lifecycle::CloseDecision, DESKTOP_LOG_FILE, MAIN_WINDOW_LABEL,
};

pub(crate) fn run() {
    append_startup_log("desktop process starting");
    append_startup_log(&format!(
        "desktop log path: {}",
        logging::resolve_desktop_log_path(
            runtime_paths::default_packaged_root_dir(),
            DESKTOP_LOG_FILE,
        )
        .display()
    ));

    let config = match ShellConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            startup_task::report_startup_failure(&error);
            std::process::exit(1);
        }
    };
    let auto_update_check = config.auto_update_check;

    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            append_desktop_log("second instance launched; showing existing window");
            window_actions::show_main_window(app, append_desktop_log);
        }))
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_dialog::init())
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }

            if let WindowEvent::CloseRequested { api, .. } = event {
                let decision =
                    window_actions::handle_close_requested(window.app_handle(), append_desktop_log);
                if decision == CloseDecision::HideInstead {
                    api.prevent_close();
                }
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            if let Err(error) = startup_task::start_shell(&app_handle, &config) {
                startup_task::report_startup_failure(&error);
                app_handle.exit(1);
                return Ok(());
            }

            if let Err(error) = tray_setup::setup_tray(&app_handle) {
                append_startup_log(&format!("failed to initialize tray: {error}"));
            }
            update_coordinator::spawn_startup_update_check(app_handle, auto_update_check);
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application")
        .run(|app_handle, event| match event {
            RunEvent::ExitRequested { code, .. } => {
                exit_events::handle_exit_requested(app_handle, code);
            }
            RunEvent::Exit => {
                exit_events::handle_exit_event(app_handle);
            }
            #[cfg(target_os = "macos")]
            RunEvent::Reopen {
                has_visible_windows: false,
                ..
            } => {
                window_actions::show_main_window(app_handle, append_desktop_log);
            }
            _ => {}
        });
}
