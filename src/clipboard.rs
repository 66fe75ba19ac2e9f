use std::time::Duration;

use crate::error::AppError;

/// Hidden subcommand run by the detached process that keeps a copy alive.
pub const HOLD_COMMAND: &str = "hold-clipboard";

/// How long a copy stays on the clipboard after mailsift exits on Linux.
///
/// X11 and Wayland serve a selection from the process that set it, so the
/// text is handed to a detached `hold-clipboard` process. It exits once
/// another application replaces the selection or this much time passes,
/// whichever comes first. A clipboard manager may keep the text longer.
pub const LINUX_HOLD: Duration = Duration::from_secs(10 * 60);

/// The clipboard seam: paste reads from it, auto-copy writes to it.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), AppError>;
    fn read_text(&mut self) -> Result<String, AppError>;
}

/// The desktop clipboard. Opened lazily so headless runs only fail when the
/// clipboard is actually used.
///
/// On Linux, writes re-run the current executable as `hold-clipboard`, so
/// this type is meant to be used from the mailsift binary.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&mut self) -> Result<&mut arboard::Clipboard, AppError> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().map_err(clipboard_error)?);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| AppError::Clipboard("clipboard was not initialised".to_string()))
    }
}

impl Clipboard for SystemClipboard {
    #[cfg(target_os = "linux")]
    fn write_text(&mut self, text: &str) -> Result<(), AppError> {
        // Fails here when no display server is reachable.
        self.open()?;
        let program = std::env::current_exe()?;
        spawn_holder(&program, text, LINUX_HOLD)
    }

    #[cfg(not(target_os = "linux"))]
    fn write_text(&mut self, text: &str) -> Result<(), AppError> {
        self.open()?.set_text(text.to_owned()).map_err(clipboard_error)
    }

    fn read_text(&mut self) -> Result<String, AppError> {
        self.open()?.get_text().map_err(clipboard_error)
    }
}

/// Refuses every copy and paste. Used when the clipboard is switched off.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), AppError> {
        Err(AppError::Clipboard("copying is disabled".to_string()))
    }

    fn read_text(&mut self) -> Result<String, AppError> {
        Err(AppError::Clipboard("pasting is disabled".to_string()))
    }
}

/// Set the clipboard and keep serving it until `hold` elapses or another
/// application takes the selection. Body of the `hold-clipboard` command.
pub fn hold_text(text: &str, hold: Duration) -> Result<(), AppError> {
    let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
    set_and_hold(&mut clipboard, text, hold)
}

#[cfg(target_os = "linux")]
fn set_and_hold(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    hold: Duration,
) -> Result<(), AppError> {
    use arboard::SetExtLinux;

    let deadline = std::time::Instant::now() + hold;
    tracing::debug!(seconds = hold.as_secs(), "Holding clipboard selection");
    clipboard.set().wait_until(deadline).text(text.to_owned()).map_err(clipboard_error)
}

#[cfg(not(target_os = "linux"))]
fn set_and_hold(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    _hold: Duration,
) -> Result<(), AppError> {
    clipboard.set_text(text.to_owned()).map_err(clipboard_error)
}

#[cfg(target_os = "linux")]
fn holder_command(program: &std::path::Path, hold: Duration) -> std::process::Command {
    use std::process::{Command, Stdio};

    let mut command = Command::new(program);
    command
        .arg(HOLD_COMMAND)
        .arg("--seconds")
        .arg(hold.as_secs().to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command
}

// The holder is never waited on; it outlives this process.
#[cfg(target_os = "linux")]
#[allow(clippy::zombie_processes)]
fn spawn_holder(program: &std::path::Path, text: &str, hold: Duration) -> Result<(), AppError> {
    use std::io::Write;

    let mut child = holder_command(program, hold).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    tracing::debug!(pid = child.id(), seconds = hold.as_secs(), "Clipboard holder started");
    Ok(())
}

fn clipboard_error(err: arboard::Error) -> AppError {
    AppError::Clipboard(err.to_string())
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn holder_reruns_the_binary_with_the_hidden_command() {
        let command = holder_command(Path::new("/opt/bin/mailsift"), Duration::from_secs(90));

        assert_eq!(command.get_program(), Path::new("/opt/bin/mailsift").as_os_str());
        let args: Vec<&str> = command.get_args().filter_map(|arg| arg.to_str()).collect();
        assert_eq!(args, [HOLD_COMMAND, "--seconds", "90"]);
    }
}
