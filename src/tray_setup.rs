use tauri::{
    menu::{Menu, MenuItem, PredefinedMenuItem},
    tray::{TrayIconBuilder, TrayIconEvent},
    AppHandle,
};

use crate::{append_desktop_log, tray_actions, tray_menu_handler, window_actions, TRAY_ID};

const TRAY_SHOW_LABEL: &str = "Show PTT.ai";
const TRAY_QUIT_LABEL: &str = "Quit";

pub fn setup_tray(app_handle: &AppHandle) -> Result<(), String> {
    let show_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_SHOW_WINDOW,
        TRAY_SHOW_LABEL,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray show menu item: {error}"))?;
    let quit_item = MenuItem::with_id(
        app_handle,
        tray_actions::TRAY_MENU_QUIT,
        TRAY_QUIT_LABEL,
        true,
        None::<&str>,
    )
    .map_err(|error| format!("Failed to create tray quit menu item: {error}"))?;
    let separator = PredefinedMenuItem::separator(app_handle)
        .map_err(|error| format!("Failed to create tray separator menu item: {error}"))?;

    let menu = Menu::with_items(app_handle, &[&show_item, &separator, &quit_item])
        .map_err(|error| format!("Failed to build tray menu: {error}"))?;

    let mut tray_builder = TrayIconBuilder::with_id(TRAY_ID)
        .menu(&menu)
        .tooltip("PTT.ai")
        .show_menu_on_left_click(false)
        .on_menu_event(|app, event| {
            tray_menu_handler::handle_tray_menu_event(app, event.id().as_ref())
        })
        .on_tray_icon_event(|tray, event| {
            if let TrayIconEvent::Click {
                button,
                button_state,
                ..
            } = event
            {
                if tray_actions::action_from_tray_click(button, button_state).is_some() {
                    window_actions::show_main_window(tray.app_handle(), append_desktop_log);
                }
            }
        });
    if let Some(icon) = app_handle.default_window_icon().cloned() {
        tray_builder = tray_builder.icon(icon);
    }

    #[cfg(target_os = "macos")]
    let tray_builder = tray_builder.icon_as_template(true);

    tray_builder
        .build(app_handle)
        .map(|_| ())
        .map_err(|error| format!("Failed to create tray icon: {error}"))
}
