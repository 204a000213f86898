use std::time::Instant;

use semver::Version;
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tauri_plugin_updater::UpdaterExt;

use crate::{append_update_log, exit_events, shell_context::QuitTrigger, ui_dispatch};

/// What the update flow reports back to the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpdateSignal {
    NotAvailable,
    Declined { version: String },
    Installed { version: String },
}

pub(crate) fn quit_trigger_for(signal: &UpdateSignal) -> Option<QuitTrigger> {
    match signal {
        UpdateSignal::Installed { .. } => Some(QuitTrigger::UpdateInstalled),
        UpdateSignal::NotAvailable | UpdateSignal::Declined { .. } => None,
    }
}

/// Pre-releases are only offered to builds that are themselves pre-releases.
pub(crate) fn is_newer_release(current: &Version, candidate: &Version) -> bool {
    if !candidate.pre.is_empty() && current.pre.is_empty() {
        return false;
    }
    candidate > current
}

/// Installs are signature-checked, so an empty key can never produce an
/// installed update.
pub(crate) fn has_updater_pubkey(updater_config: Option<&serde_json::Value>) -> bool {
    updater_config
        .and_then(|config| config.get("pubkey"))
        .and_then(serde_json::Value::as_str)
        .is_some_and(|key| !key.trim().is_empty())
}

fn update_prompt(app_name: &str, version: &str) -> String {
    format!(
        "{app_name} {version} is now available. Install it and relaunch {app_name}?"
    )
}

async fn run_update_check(app_handle: &AppHandle) -> Result<UpdateSignal, String> {
    let current_version = app_handle.package_info().version.to_string();
    let updater = app_handle
        .updater_builder()
        .version_comparator(|current, release| is_newer_release(&current, &release.version))
        .build()
        .map_err(|error| format!("Failed to initialize updater: {error}"))?;

    let check_started = Instant::now();
    let update = updater
        .check()
        .await
        .map_err(|error| format!("Update check failed: {error}"))?;
    let Some(update) = update else {
        append_update_log(&format!(
            "no update available: current_version={current_version} elapsed_ms={}",
            check_started.elapsed().as_millis()
        ));
        return Ok(UpdateSignal::NotAvailable);
    };

    let version = update.version.to_string();
    append_update_log(&format!(
        "update available: current_version={current_version} latest_version={version}"
    ));

    let app_name = app_handle.package_info().name.clone();
    let accepted = app_handle
        .dialog()
        .message(update_prompt(&app_name, &version))
        .title(format!("A new version of {app_name} is available"))
        .kind(MessageDialogKind::Info)
        .buttons(MessageDialogButtons::YesNo)
        .blocking_show();
    if !accepted {
        return Ok(UpdateSignal::Declined { version });
    }

    append_update_log(&format!("downloading update {version}"));
    let bytes = update
        .download(|_, _| {}, || {})
        .await
        .map_err(|error| format!("Failed to download update {version}: {error}"))?;
    update
        .install(&bytes)
        .map_err(|error| format!("Failed to install update {version}: {error}"))?;
    Ok(UpdateSignal::Installed { version })
}

/// Checks once at startup. Failures are logged only.
pub(crate) fn spawn_startup_update_check(app_handle: AppHandle, enabled: bool) {
    if !enabled {
        append_update_log("automatic update check disabled");
        return;
    }
    if !has_updater_pubkey(app_handle.config().plugins.0.get("updater")) {
        append_update_log("automatic update check skipped: updater pubkey is not configured");
        return;
    }

    tauri::async_runtime::spawn(async move {
        let signal = match run_update_check(&app_handle).await {
            Ok(signal) => signal,
            Err(error) => {
                append_update_log(&error);
                return;
            }
        };
        append_update_log(&format!("update flow finished: {signal:?}"));

        let Some(trigger) = quit_trigger_for(&signal) else {
            return;
        };
        if let Err(error) = ui_dispatch::run_on_main_thread_dispatch(
            &app_handle,
            "update restart",
            move |main_app| exit_events::request_full_quit(main_app, trigger),
        ) {
            append_update_log(&error);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(raw: &str) -> Version {
        Version::parse(raw).unwrap()
    }

    #[test]
    fn is_newer_release_compares_stable_versions() {
        assert!(is_newer_release(&version("0.3.1"), &version("0.3.2")));
        assert!(!is_newer_release(&version("0.3.2"), &version("0.3.2")));
        assert!(!is_newer_release(&version("0.4.0"), &version("0.3.9")));
    }

    #[test]
    fn is_newer_release_skips_prereleases_for_stable_builds() {
        assert!(!is_newer_release(&version("0.3.1"), &version("0.4.0-beta.1")));
        assert!(is_newer_release(&version("0.4.0-beta.1"), &version("0.4.0-beta.2")));
        assert!(is_newer_release(&version("0.4.0-beta.2"), &version("0.4.0")));
    }

    #[test]
    fn only_installed_update_triggers_quit() {
        assert_eq!(
            quit_trigger_for(&UpdateSignal::Installed {
                version: "0.4.0".to_string()
            }),
            Some(QuitTrigger::UpdateInstalled)
        );
        assert_eq!(quit_trigger_for(&UpdateSignal::NotAvailable), None);
        assert_eq!(
            quit_trigger_for(&UpdateSignal::Declined {
                version: "0.4.0".to_string()
            }),
            None
        );
    }

    #[test]
    fn update_prompt_names_app_and_version() {
        assert_eq!(
            update_prompt("pttai-desktop", "0.4.0"),
            "pttai-desktop 0.4.0 is now available. Install it and relaunch pttai-desktop?"
        );
    }

    #[test]
    fn update_check_needs_a_non_empty_pubkey() {
        assert!(!has_updater_pubkey(None));
        assert!(!has_updater_pubkey(Some(&serde_json::json!({ "endpoints": [] }))));
        assert!(!has_updater_pubkey(Some(&serde_json::json!({ "pubkey": "  " }))));
        assert!(has_updater_pubkey(Some(&serde_json::json!({
            "pubkey": "dW50cnVzdGVkIGNvbW1lbnQ6IG1pbmlzaWduIHB1YmxpYyBrZXk="
        }))));
    }
}
