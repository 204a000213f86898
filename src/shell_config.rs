use std::{env, path::PathBuf, time::Duration};

use url::Url;

use crate::{
    startup_error::StartupError, AUTO_UPDATE_CHECK_ENV, BACKEND_EXTRA_ARGS_ENV, BACKEND_URL,
    DEFAULT_READINESS_POLL_INTERVAL_MS, DEFAULT_READINESS_PROBE_TIMEOUT_MS,
    READINESS_POLL_INTERVAL_ENV, READINESS_POLL_INTERVAL_MAX_MS, READINESS_POLL_INTERVAL_MIN_MS,
    READINESS_PROBE_RETRIES_ENV, READINESS_PROBE_RETRIES_MAX, READINESS_PROBE_TIMEOUT_ENV,
    READINESS_PROBE_TIMEOUT_MAX_MS, READINESS_PROBE_TIMEOUT_MIN_MS, RUN_MODE_ENV, SOURCE_DIR_ENV,
    TEST_P2P_ENV,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunMode {
    Development,
    Packaged,
}

impl RunMode {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
            Some("dev") | Some("development") => Self::Development,
            _ => Self::Packaged,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ShellConfig {
    pub(crate) run_mode: RunMode,
    pub(crate) source_dir_override: Option<PathBuf>,
    pub(crate) backend_url: Url,
    pub(crate) readiness_poll_interval: Duration,
    pub(crate) readiness_probe_retries: u32,
    pub(crate) readiness_probe_timeout: Duration,
    pub(crate) enable_test_p2p: bool,
    pub(crate) extra_backend_args: Vec<String>,
    pub(crate) auto_update_check: bool,
}

fn parse_clamped_ms(raw: Option<String>, default_ms: u64, min_ms: u64, max_ms: u64) -> Duration {
    let value = raw
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default_ms)
        .clamp(min_ms, max_ms);
    Duration::from_millis(value)
}

fn parse_flag(raw: Option<String>, default: bool) -> bool {
    match raw.map(|value| value.trim().to_ascii_lowercase()).as_deref() {
        Some("0") | Some("false") | Some("off") | Some("no") => false,
        Some("1") | Some("true") | Some("on") | Some("yes") => true,
        _ => default,
    }
}

impl ShellConfig {
    pub(crate) fn from_env() -> Result<Self, StartupError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, StartupError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let extra_backend_args = match lookup(BACKEND_EXTRA_ARGS_ENV) {
            Some(raw) if !raw.trim().is_empty() => {
                shlex::split(&raw).ok_or_else(|| StartupError::InvalidExtraArgs {
                    variable: BACKEND_EXTRA_ARGS_ENV,
                    value: raw.clone(),
                })?
            }
            _ => Vec::new(),
        };

        Ok(Self {
            run_mode: RunMode::parse(lookup(RUN_MODE_ENV).as_deref()),
            source_dir_override: lookup(SOURCE_DIR_ENV)
                .map(|value| PathBuf::from(value.trim()))
                .filter(|path| !path.as_os_str().is_empty()),
            backend_url: backend_url(),
            readiness_poll_interval: parse_clamped_ms(
                lookup(READINESS_POLL_INTERVAL_ENV),
                DEFAULT_READINESS_POLL_INTERVAL_MS,
                READINESS_POLL_INTERVAL_MIN_MS,
                READINESS_POLL_INTERVAL_MAX_MS,
            ),
            readiness_probe_retries: lookup(READINESS_PROBE_RETRIES_ENV)
                .and_then(|value| value.trim().parse::<u32>().ok())
                .unwrap_or(0)
                .min(READINESS_PROBE_RETRIES_MAX),
            readiness_probe_timeout: parse_clamped_ms(
                lookup(READINESS_PROBE_TIMEOUT_ENV),
                DEFAULT_READINESS_PROBE_TIMEOUT_MS,
                READINESS_PROBE_TIMEOUT_MIN_MS,
                READINESS_PROBE_TIMEOUT_MAX_MS,
            ),
            enable_test_p2p: parse_flag(lookup(TEST_P2P_ENV), true),
            extra_backend_args,
            auto_update_check: parse_flag(lookup(AUTO_UPDATE_CHECK_ENV), true),
        })
    }
}

pub(crate) fn backend_url() -> Url {
    // Constant input; parsing cannot fail.
    Url::parse(BACKEND_URL).unwrap_or_else(|_| unreachable!("BACKEND_URL is a valid URL"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ShellConfig, StartupError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ShellConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_match_packaged_blind_retry_behaviour() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.run_mode, RunMode::Packaged);
        assert_eq!(config.readiness_poll_interval, Duration::from_millis(8_000));
        assert_eq!(config.readiness_probe_retries, 0);
        assert!(config.enable_test_p2p);
        assert!(config.auto_update_check);
        assert!(config.extra_backend_args.is_empty());
        assert_eq!(config.backend_url.as_str(), "http://localhost:9774/");
    }

    #[test]
    fn run_mode_accepts_dev_spellings() {
        assert_eq!(
            config_from(&[(RUN_MODE_ENV, "dev")]).unwrap().run_mode,
            RunMode::Development
        );
        assert_eq!(
            config_from(&[(RUN_MODE_ENV, " Development ")]).unwrap().run_mode,
            RunMode::Development
        );
        assert_eq!(
            config_from(&[(RUN_MODE_ENV, "production")]).unwrap().run_mode,
            RunMode::Packaged
        );
    }

    #[test]
    fn poll_interval_is_clamped() {
        let fast = config_from(&[(READINESS_POLL_INTERVAL_ENV, "5")]).unwrap();
        assert_eq!(fast.readiness_poll_interval, Duration::from_millis(100));

        let slow = config_from(&[(READINESS_POLL_INTERVAL_ENV, "999999999")]).unwrap();
        assert_eq!(slow.readiness_poll_interval, Duration::from_millis(120_000));

        let garbage = config_from(&[(READINESS_POLL_INTERVAL_ENV, "soon")]).unwrap();
        assert_eq!(garbage.readiness_poll_interval, Duration::from_millis(8_000));
    }

    #[test]
    fn flags_can_be_disabled() {
        let config =
            config_from(&[(TEST_P2P_ENV, "0"), (AUTO_UPDATE_CHECK_ENV, "off")]).unwrap();
        assert!(!config.enable_test_p2p);
        assert!(!config.auto_update_check);
    }

    #[test]
    fn extra_args_are_shell_split() {
        let config =
            config_from(&[(BACKEND_EXTRA_ARGS_ENV, "--verbosity 4 --datadir '/tmp/my data'")])
                .unwrap();
        assert_eq!(
            config.extra_backend_args,
            vec!["--verbosity", "4", "--datadir", "/tmp/my data"]
        );
    }

    #[test]
    fn unbalanced_extra_args_are_rejected() {
        assert!(matches!(
            config_from(&[(BACKEND_EXTRA_ARGS_ENV, "--datadir 'unterminated")]),
            Err(StartupError::InvalidExtraArgs { .. })
        ));
    }
}
