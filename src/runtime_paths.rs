use std::{env, path::PathBuf};

use crate::ROOT_DIR_ENV;

/// Writable root for the desktop log and backend output.
pub(crate) fn default_packaged_root_dir() -> Option<PathBuf> {
    if let Ok(root) = env::var(ROOT_DIR_ENV) {
        let path = PathBuf::from(root.trim());
        if !path.as_os_str().is_empty() {
            return Some(path);
        }
    }

    home::home_dir().map(|home| home.join(".pttai"))
}

pub(crate) fn backend_log_dir(root_dir: Option<PathBuf>, fallback: &std::path::Path) -> PathBuf {
    root_dir
        .map(|root| root.join("logs"))
        .unwrap_or_else(|| fallback.join("logs"))
}

pub(crate) fn development_backend_dir() -> PathBuf {
    let candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("resources")
        .join("backend");
    candidate.canonicalize().unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn backend_log_dir_uses_root_when_available() {
        assert_eq!(
            backend_log_dir(Some(PathBuf::from("/home/me/.pttai")), Path::new("/opt/app")),
            PathBuf::from("/home/me/.pttai/logs")
        );
        assert_eq!(
            backend_log_dir(None, Path::new("/opt/app")),
            PathBuf::from("/opt/app/logs")
        );
    }

    #[test]
    fn development_backend_dir_points_into_crate_resources() {
        assert!(development_backend_dir().ends_with(Path::new("resources").join("backend")));
    }
}
