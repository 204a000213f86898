use crate::startup_error::StartupError;

/// Backend executable name shipped for each supported platform family.
pub(crate) const MACOS_BACKEND_EXECUTABLE: &str = "gptt";
pub(crate) const LINUX_BACKEND_EXECUTABLE: &str = "gptt-linux";
pub(crate) const WINDOWS_BACKEND_EXECUTABLE: &str = "gptt.exe";

/// Executables the Windows backend is known to start on its own.
pub(crate) const WINDOWS_AUXILIARY_EXECUTABLES: &[&str] = &["Pttai.exe"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlatformFamily {
    MacOs,
    Linux,
    Windows,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TerminationPlan {
    /// Kill through the held child handle.
    SignalHandle,
    /// `taskkill /F /T /IM <name>` for every listed image name.
    ForcedByName { image_names: Vec<String> },
}

impl PlatformFamily {
    pub(crate) fn from_os(os: &str) -> Result<Self, StartupError> {
        match os {
            "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            other => Err(StartupError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub(crate) fn current() -> Result<Self, StartupError> {
        Self::from_os(std::env::consts::OS)
    }

    pub(crate) fn backend_executable(self) -> &'static str {
        match self {
            Self::MacOs => MACOS_BACKEND_EXECUTABLE,
            Self::Linux => LINUX_BACKEND_EXECUTABLE,
            Self::Windows => WINDOWS_BACKEND_EXECUTABLE,
        }
    }

    pub(crate) fn termination_plan(self, backend_executable: &str) -> TerminationPlan {
        match self {
            Self::MacOs | Self::Linux => TerminationPlan::SignalHandle,
            Self::Windows => {
                let mut image_names = vec![backend_executable.to_string()];
                image_names.extend(WINDOWS_AUXILIARY_EXECUTABLES.iter().map(|name| name.to_string()));
                TerminationPlan::ForcedByName { image_names }
            }
        }
    }
}
