use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{
    backend_platform::PlatformFamily,
    shell_config::{RunMode, ShellConfig},
    startup_error::StartupError,
    BACKEND_LOG_FILE, BACKEND_STDERR_LOG_FILE, BACKEND_STDOUT_LOG_FILE, DEFAULT_STATIC_DIR,
    RUNTIME_MANIFEST_FILE,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RuntimeManifest {
    pub(crate) executable: Option<String>,
    pub(crate) http_dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LaunchPlan {
    pub(crate) platform: PlatformFamily,
    pub(crate) executable_name: String,
    pub(crate) executable: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) cwd: PathBuf,
    pub(crate) stdout_log: PathBuf,
    pub(crate) stderr_log: PathBuf,
}

/// Development runs use the source tree, packaged runs the bundled resources.
pub(crate) fn resolve_base_dir(
    config: &ShellConfig,
    development_dir: PathBuf,
    packaged_dir: PathBuf,
) -> PathBuf {
    match config.run_mode {
        RunMode::Development => config
            .source_dir_override
            .clone()
            .unwrap_or(development_dir),
        RunMode::Packaged => packaged_dir,
    }
}

pub(crate) fn read_runtime_manifest(base_dir: &Path) -> Result<RuntimeManifest, StartupError> {
    let manifest_path = base_dir.join(RUNTIME_MANIFEST_FILE);
    let raw = match fs::read_to_string(&manifest_path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Ok(RuntimeManifest::default());
        }
        Err(error) => {
            return Err(StartupError::InvalidManifest {
                path: manifest_path,
                reason: error.to_string(),
            });
        }
    };

    let manifest: RuntimeManifest =
        serde_json::from_str(&raw).map_err(|error| StartupError::InvalidManifest {
            path: manifest_path.clone(),
            reason: error.to_string(),
        })?;

    if let Some(executable) = manifest.executable.as_deref() {
        let is_bare_name = Path::new(executable)
            .file_name()
            .is_some_and(|name| name == executable);
        if !is_bare_name {
            return Err(StartupError::InvalidManifest {
                path: manifest_path,
                reason: format!("executable must be a bare file name, got '{executable}'"),
            });
        }
    }
    Ok(manifest)
}

pub(crate) fn resolve_launch_plan(
    os: &str,
    base_dir: &Path,
    log_dir: &Path,
    config: &ShellConfig,
) -> Result<LaunchPlan, StartupError> {
    // Platform first: an unknown family never reaches the manifest or the spawn.
    let platform = PlatformFamily::from_os(os)?;
    let manifest = read_runtime_manifest(base_dir)?;

    let executable_name = manifest
        .executable
        .unwrap_or_else(|| platform.backend_executable().to_string());
    let http_dir = base_dir.join(manifest.http_dir.as_deref().unwrap_or(DEFAULT_STATIC_DIR));

    let mut args = vec![
        "--httpdir".to_string(),
        http_dir.to_string_lossy().to_string(),
        "--server".to_string(),
    ];
    if config.enable_test_p2p {
        args.push("--testp2p".to_string());
    }
    args.push("--log".to_string());
    args.push(log_dir.join(BACKEND_LOG_FILE).to_string_lossy().to_string());
    args.extend(config.extra_backend_args.iter().cloned());

    Ok(LaunchPlan {
        platform,
        executable: base_dir.join(&executable_name),
        executable_name,
        args,
        cwd: base_dir.to_path_buf(),
        stdout_log: log_dir.join(BACKEND_STDOUT_LOG_FILE),
        stderr_log: log_dir.join(BACKEND_STDERR_LOG_FILE),
    })
}

pub(crate) fn build_debug_command(plan: &LaunchPlan) -> Vec<String> {
    let mut parts = vec![plan.executable.to_string_lossy().to_string()];
    parts.extend(plan.args.clone());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(run_mode: RunMode) -> ShellConfig {
        let mut config = ShellConfig::from_lookup(|_| None).unwrap();
        config.run_mode = run_mode;
        config
    }

    #[test]
    fn development_mode_resolves_source_root_executable() {
        let config = config_for(RunMode::Development);
        let base_dir = resolve_base_dir(
            &config,
            PathBuf::from("/src/pttai"),
            PathBuf::from("/Applications/PTT.ai.app/Contents/Resources/resources/backend"),
        );
        let plan = resolve_launch_plan("macos", &base_dir, Path::new("/logs"), &config).unwrap();

        assert_eq!(plan.executable, PathBuf::from("/src/pttai/gptt"));
        assert_eq!(plan.platform, PlatformFamily::MacOs);
    }

    #[test]
    fn packaged_mode_resolves_resources_root_executable() {
        let config = config_for(RunMode::Packaged);
        let base_dir = resolve_base_dir(
            &config,
            PathBuf::from("/src/pttai"),
            PathBuf::from("/opt/pttai/resources/backend"),
        );
        let plan = resolve_launch_plan("windows", &base_dir, Path::new("/logs"), &config).unwrap();

        assert_eq!(
            plan.executable,
            PathBuf::from("/opt/pttai/resources/backend/gptt.exe")
        );
        assert_eq!(plan.executable_name, "gptt.exe");
    }

    #[test]
    fn source_dir_override_wins_in_development_only() {
        let mut dev = config_for(RunMode::Development);
        dev.source_dir_override = Some(PathBuf::from("/custom"));
        assert_eq!(
            resolve_base_dir(&dev, PathBuf::from("/src"), PathBuf::from("/res")),
            PathBuf::from("/custom")
        );

        let mut packaged = config_for(RunMode::Packaged);
        packaged.source_dir_override = Some(PathBuf::from("/custom"));
        assert_eq!(
            resolve_base_dir(&packaged, PathBuf::from("/src"), PathBuf::from("/res")),
            PathBuf::from("/res")
        );
    }

    #[test]
    fn arguments_follow_backend_template() {
        let config = config_for(RunMode::Packaged);
        let plan =
            resolve_launch_plan("linux", Path::new("/base"), Path::new("/logs"), &config).unwrap();

        assert_eq!(
            plan.args,
            vec![
                "--httpdir",
                "/base/static",
                "--server",
                "--testp2p",
                "--log",
                "/logs/backend.log",
            ]
        );
        assert_eq!(plan.stdout_log, PathBuf::from("/logs/backend.stdout.log"));
        assert_eq!(plan.stderr_log, PathBuf::from("/logs/backend.err.log"));
    }

    #[test]
    fn test_p2p_flag_and_extra_args_are_configurable() {
        let mut config = config_for(RunMode::Packaged);
        config.enable_test_p2p = false;
        config.extra_backend_args = vec!["--verbosity".to_string(), "4".to_string()];
        let plan =
            resolve_launch_plan("linux", Path::new("/base"), Path::new("/logs"), &config).unwrap();

        assert!(!plan.args.iter().any(|arg| arg == "--testp2p"));
        assert_eq!(plan.args[plan.args.len() - 2..], ["--verbosity", "4"]);
    }

    #[test]
    fn unknown_platform_fails_before_reading_manifest() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(RUNTIME_MANIFEST_FILE), "{ not json").unwrap();

        let result = resolve_launch_plan("haiku", dir.path(), dir.path(), &config_for(RunMode::Packaged));
        assert!(matches!(result, Err(StartupError::UnsupportedPlatform(_))));
    }

    #[test]
    fn manifest_overrides_executable_and_http_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(RUNTIME_MANIFEST_FILE),
            r#"{"executable": "gptt-universal", "httpDir": "webui"}"#,
        )
        .unwrap();

        let plan =
            resolve_launch_plan("macos", dir.path(), dir.path(), &config_for(RunMode::Packaged))
                .unwrap();
        assert_eq!(plan.executable, dir.path().join("gptt-universal"));
        assert_eq!(plan.args[1], dir.path().join("webui").to_string_lossy());
    }

    #[test]
    fn manifest_rejects_executable_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(RUNTIME_MANIFEST_FILE),
            r#"{"executable": "../bin/gptt"}"#,
        )
        .unwrap();

        assert!(matches!(
            read_runtime_manifest(dir.path()),
            Err(StartupError::InvalidManifest { .. })
        ));
    }

    #[test]
    fn build_debug_command_prepends_executable() {
        let config = config_for(RunMode::Packaged);
        let plan =
            resolve_launch_plan("linux", Path::new("/base"), Path::new("/logs"), &config).unwrap();
        let command = build_debug_command(&plan);
        assert_eq!(command[0], "/base/gptt-linux");
        assert_eq!(command.len(), plan.args.len() + 1);
    }
}
