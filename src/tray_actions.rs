use tauri::tray::{MouseButton, MouseButtonState};

pub const TRAY_MENU_SHOW_WINDOW: &str = "tray_show_window";
pub const TRAY_MENU_QUIT: &str = "tray_quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayMenuAction {
    ShowWindow,
    Quit,
}

pub fn action_from_menu_id(menu_id: &str) -> Option<TrayMenuAction> {
    match menu_id {
        TRAY_MENU_SHOW_WINDOW => Some(TrayMenuAction::ShowWindow),
        TRAY_MENU_QUIT => Some(TrayMenuAction::Quit),
        _ => None,
    }
}

/// A released left click on the icon shows the window; other clicks are left
/// to the platform (right click opens the menu).
pub fn action_from_tray_click(
    button: MouseButton,
    button_state: MouseButtonState,
) -> Option<TrayMenuAction> {
    match (button, button_state) {
        (MouseButton::Left, MouseButtonState::Up) => Some(TrayMenuAction::ShowWindow),
        _ => None,
    }
}
