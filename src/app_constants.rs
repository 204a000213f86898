pub(crate) const MAIN_WINDOW_LABEL: &str = "main";
pub(crate) const MAIN_WINDOW_TITLE: &str = "PTT.ai";
pub(crate) const MAIN_WINDOW_WIDTH: f64 = 414.0;
pub(crate) const MAIN_WINDOW_HEIGHT: f64 = 1000.0;

pub(crate) const BACKEND_URL: &str = "http://localhost:9774";
pub(crate) const SPLASH_RESOURCE_PATH: &str = "resources/loading.html";
pub(crate) const PACKAGED_BACKEND_RESOURCE_DIR: &str = "resources/backend";
pub(crate) const RUNTIME_MANIFEST_FILE: &str = "runtime-manifest.json";
pub(crate) const DEFAULT_STATIC_DIR: &str = "static";

pub(crate) const BACKEND_LOG_FILE: &str = "backend.log";
pub(crate) const BACKEND_STDOUT_LOG_FILE: &str = "backend.stdout.log";
pub(crate) const BACKEND_STDERR_LOG_FILE: &str = "backend.err.log";
pub(crate) const DESKTOP_LOG_FILE: &str = "desktop.log";
pub(crate) const DESKTOP_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub(crate) const LOG_BACKUP_COUNT: usize = 5;

pub(crate) const RUN_MODE_ENV: &str = "PTTAI_ENV";
pub(crate) const SOURCE_DIR_ENV: &str = "PTTAI_SOURCE_DIR";
pub(crate) const ROOT_DIR_ENV: &str = "PTTAI_ROOT";
pub(crate) const READINESS_POLL_INTERVAL_ENV: &str = "PTTAI_READINESS_POLL_INTERVAL_MS";
pub(crate) const READINESS_PROBE_RETRIES_ENV: &str = "PTTAI_READINESS_PROBE_RETRIES";
pub(crate) const READINESS_PROBE_TIMEOUT_ENV: &str = "PTTAI_READINESS_PROBE_TIMEOUT_MS";
pub(crate) const TEST_P2P_ENV: &str = "PTTAI_TESTP2P";
pub(crate) const BACKEND_EXTRA_ARGS_ENV: &str = "PTTAI_BACKEND_EXTRA_ARGS";
pub(crate) const AUTO_UPDATE_CHECK_ENV: &str = "PTTAI_AUTO_UPDATE_CHECK";

pub(crate) const DEFAULT_READINESS_POLL_INTERVAL_MS: u64 = 8_000;
pub(crate) const READINESS_POLL_INTERVAL_MIN_MS: u64 = 100;
pub(crate) const READINESS_POLL_INTERVAL_MAX_MS: u64 = 120_000;
pub(crate) const DEFAULT_READINESS_PROBE_TIMEOUT_MS: u64 = 800;
pub(crate) const READINESS_PROBE_TIMEOUT_MIN_MS: u64 = 50;
pub(crate) const READINESS_PROBE_TIMEOUT_MAX_MS: u64 = 5_000;
pub(crate) const READINESS_PROBE_RETRIES_MAX: u32 = 20;

pub(crate) const TRAY_ID: &str = "pttai-tray";

#[cfg(target_os = "windows")]
pub(crate) const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(target_os = "windows")]
pub(crate) const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

