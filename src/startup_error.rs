use std::{io, path::PathBuf};

/// Conditions that stop the shell before the window is opened.
#[derive(Debug, thiserror::Error)]
pub(crate) enum StartupError {
    #[error("unsupported platform family: {0}")]
    UnsupportedPlatform(String),

    #[error("backend executable is missing or not runnable: {}", .0.display())]
    ExecutableMissing(PathBuf),

    #[error("invalid runtime manifest {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("invalid backend arguments in {variable}: {value}")]
    InvalidExtraArgs { variable: &'static str, value: String },

    #[error("failed to prepare backend log {}: {source}", .path.display())]
    LogSetup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to spawn backend process {command:?}: {source}")]
    Spawn {
        command: Vec<String>,
        #[source]
        source: io::Error,
    },

    #[error("backend process was already launched for this run")]
    AlreadyLaunched,
}
