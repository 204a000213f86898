use std::process::{Child, Command, Stdio};

#[cfg(target_os = "windows")]
use crate::{CREATE_NEW_PROCESS_GROUP, CREATE_NO_WINDOW};

/// Detaches the backend from the shell's own signal handling.
pub(crate) fn detach_from_shell(command: &mut Command) {
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        command.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);
    }
}

pub(crate) fn kill_child_process<F>(child: &mut Child, log: F)
where
    F: Fn(&str),
{
    let pid = child.id();
    if let Err(error) = child.kill() {
        // Already exited between the liveness check and the kill.
        log(&format!("kill signal for backend pid={pid} not delivered: {error}"));
    }
    match child.wait() {
        Ok(status) => log(&format!("backend pid={pid} stopped: {status}")),
        Err(error) => log(&format!("failed to reap backend pid={pid}: {error}")),
    }
}

pub(crate) fn build_forced_kill_args(image_name: &str, own_pid: u32) -> Vec<String> {
    vec![
        "/F".to_string(),
        "/T".to_string(),
        "/IM".to_string(),
        image_name.to_string(),
        "/FI".to_string(),
        format!("PID ne {own_pid}"),
    ]
}

/// Fire-and-forget `taskkill` per image name; the result is only logged.
pub(crate) fn kill_processes_by_name<F>(image_names: &[String], log: F)
where
    F: Fn(&str),
{
    let own_pid = std::process::id();
    for image_name in image_names {
        let mut command = Command::new("taskkill");
        command
            .args(build_forced_kill_args(image_name, own_pid))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(target_os = "windows")]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        match command.spawn() {
            Ok(_) => log(&format!("issued forced termination for {image_name}")),
            Err(error) => log(&format!(
                "failed to issue forced termination for {image_name}: {error}"
            )),
        }
    }
}
