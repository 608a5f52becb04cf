use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Command that opens `path` with the desktop's default application.
#[cfg(target_os = "macos")]
pub fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

/// Command that opens `path` with the desktop's default application.
#[cfg(target_os = "windows")]
pub fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    // `start` treats its first quoted argument as a window title.
    command.args(["/C", "start", ""]).arg(path);
    command
}

/// Command that opens `path` with the desktop's default application.
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub fn opener_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}

/// Launches the default opener for `path` without waiting for it.
pub fn open_path(path: &Path) -> io::Result<()> {
    tracing::debug!(path = %path.display(), "opening with default application");
    opener_command(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opener_passes_path_as_last_argument() {
        let command = opener_command(Path::new("/img/soup.png"));
        let last = command.get_args().last().map(|arg| arg.to_os_string());
        assert_eq!(last, Some(std::ffi::OsString::from("/img/soup.png")));
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    #[test]
    fn linux_uses_xdg_open() {
        let command = opener_command(Path::new("menu.png"));
        assert_eq!(command.get_program(), "xdg-open");
    }
}
