use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};
use url::Url;

use crate::{retry_timer, window_lifecycle::WindowCommand, MAIN_WINDOW_LABEL, MAIN_WINDOW_TITLE};

/// Executes controller commands. Must run without the shell context lock held.
pub(crate) fn apply_window_commands<F>(app_handle: &AppHandle, commands: Vec<WindowCommand>, log: F)
where
    F: Fn(&str) + Copy,
{
    for command in commands {
        let result = match command {
            WindowCommand::Create { width, height } => create_main_window(app_handle, width, height),
            WindowCommand::Load(url) => navigate_main_window(app_handle, url, log),
            WindowCommand::Show => show_main_window(app_handle),
            WindowCommand::Hide => hide_main_window(app_handle),
            WindowCommand::ScheduleRetry {
                delay,
                token,
                probe,
            } => retry_timer::spawn_retry_timer(app_handle.clone(), delay, token, probe),
        };
        if let Err(error) = result {
            log(&error);
        }
    }
}

fn create_main_window(app_handle: &AppHandle, width: f64, height: f64) -> Result<(), String> {
    if app_handle.get_webview_window(MAIN_WINDOW_LABEL).is_some() {
        return Ok(());
    }

    let blank = Url::parse("about:blank").map_err(|error| format!("Invalid blank URL: {error}"))?;
    WebviewWindowBuilder::new(app_handle, MAIN_WINDOW_LABEL, WebviewUrl::External(blank))
        .title(MAIN_WINDOW_TITLE)
        .inner_size(width, height)
        .visible(true)
        .build()
        .map(|_| ())
        .map_err(|error| format!("Failed to create main window: {error}"))
}

fn navigate_main_window<F>(app_handle: &AppHandle, url: Url, log: F) -> Result<(), String>
where
    F: Fn(&str),
{
    let Some(mut window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        return Err(format!("navigate to {url} skipped: main window not found"));
    };

    log(&format!("main window loading {url}"));
    window
        .navigate(url)
        .map_err(|error| format!("Failed to navigate main window: {error}"))
}

fn show_main_window(app_handle: &AppHandle) -> Result<(), String> {
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        return Err("show skipped: main window not found".to_string());
    };

    window
        .show()
        .map_err(|error| format!("Failed to show main window: {error}"))?;
    if let Ok(true) = window.is_minimized() {
        window
            .unminimize()
            .map_err(|error| format!("Failed to unminimize main window: {error}"))?;
    }
    window
        .set_focus()
        .map_err(|error| format!("Failed to focus main window: {error}"))
}

fn hide_main_window(app_handle: &AppHandle) -> Result<(), String> {
    let Some(window) = app_handle.get_webview_window(MAIN_WINDOW_LABEL) else {
        return Err("hide skipped: main window not found".to_string());
    };

    window
        .hide()
        .map_err(|error| format!("Failed to hide main window: {error}"))
}
