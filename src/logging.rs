use std::{
    env,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DesktopLogCategory {
    Startup,
    Runtime,
    Update,
    Shutdown,
}

impl DesktopLogCategory {
    fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::Runtime => "runtime",
            Self::Update => "update",
            Self::Shutdown => "shutdown",
        }
    }
}

pub(crate) fn resolve_desktop_log_path(root_dir: Option<PathBuf>, file_name: &str) -> PathBuf {
    match root_dir {
        Some(root) => root.join("logs").join(file_name),
        None => env::temp_dir().join("pttai-desktop").join(file_name),
    }
}

pub(crate) fn format_log_line(
    category: DesktopLogCategory,
    message: &str,
    timestamp: DateTime<Local>,
) -> String {
    format!(
        "[{}] [{}] {}\n",
        timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        category.as_str(),
        message
    )
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(format!(".{index}"));
    PathBuf::from(raw)
}

/// Shifts `file.log` to `file.log.1`, `file.log.1` to `file.log.2` and so on,
/// dropping the oldest backup once `backup_count` is reached.
pub(crate) fn rotate_log_if_needed(
    path: &Path,
    max_bytes: u64,
    backup_count: usize,
) -> io::Result<bool> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(error) => return Err(error),
    };
    if size < max_bytes {
        return Ok(false);
    }

    if backup_count == 0 {
        fs::remove_file(path)?;
        return Ok(true);
    }

    let oldest = backup_path(path, backup_count);
    if oldest.exists() {
        fs::remove_file(&oldest)?;
    }
    for index in (1..backup_count).rev() {
        let from = backup_path(path, index);
        if from.exists() {
            fs::rename(&from, backup_path(path, index + 1))?;
        }
    }
    fs::rename(path, backup_path(path, 1))?;
    Ok(true)
}

fn write_line(path: &Path, line: &str, max_bytes: u64, backup_count: usize) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    rotate_log_if_needed(path, max_bytes, backup_count)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line.as_bytes())
}

pub(crate) fn append_desktop_log(
    category: DesktopLogCategory,
    message: &str,
    root_dir: Option<PathBuf>,
    file_name: &str,
    max_bytes: u64,
    backup_count: usize,
    write_lock: &OnceLock<Mutex<()>>,
) {
    let line = format_log_line(category, message, Local::now());
    if cfg!(debug_assertions) {
        eprint!("{line}");
    }

    let path = resolve_desktop_log_path(root_dir, file_name);
    let _guard = match write_lock.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        Err(error) => error.into_inner(),
    };
    if let Err(error) = write_line(&path, &line, max_bytes, backup_count) {
        if cfg!(debug_assertions) {
            eprintln!("failed to write desktop log {}: {error}", path.display());
        }
    }
}
