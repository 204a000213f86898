#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_helpers;
mod app_runtime;
mod backend_platform;
mod backend_readiness;
mod exit_events;
mod launch_plan;
mod logging;
mod main_window;
mod process_control;
mod process_supervisor;
mod retry_timer;
mod runtime_paths;
mod shell_config;
mod shell_context;
mod startup_error;
mod startup_task;
mod tray_actions;
mod tray_menu_handler;
mod tray_setup;
mod ui_dispatch;
mod update_coordinator;
mod window_actions;
mod window_lifecycle;

pub(crate) use app_constants::*;
pub(crate) use app_helpers::{
    append_desktop_log, append_shutdown_log, append_startup_log, append_update_log,
};

fn main() {
    app_runtime::run();
}
