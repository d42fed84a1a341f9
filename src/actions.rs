use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};

use crate::error::{Diagnostics, LuminolError};

/// Run the configured wallpaper command, substituting `{wallpaper_path}`.
/// A non-zero exit or spawn failure is fatal: the theme files would not
/// match what is on screen.
pub fn apply_wallpaper(
    command_template: &str,
    image_path: &Path,
    use_shell: bool,
    log_dir: Option<&Path>,
) -> Result<(), LuminolError> {
    let command = command_template.replace("{wallpaper_path}", &image_path.display().to_string());
    tracing::debug!(%command, "setting wallpaper");

    let output = run_command(&command, use_shell)
        .map_err(|e| LuminolError::Wallpaper(format!("'{command}': {e}")))?;
    log_command_output(log_dir, &command, &output);

    if !output.status.success() {
        return Err(LuminolError::Wallpaper(format!(
            "'{command}' exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    tracing::info!("wallpaper applied");
    Ok(())
}

/// Run the reload commands sequentially, in declaration order, waiting for
/// each. Failures are recoverable: the palette files are already on disk.
pub fn run_reload_commands(
    commands: &[String],
    use_shell: bool,
    log_dir: Option<&Path>,
    diags: &mut Diagnostics,
) {
    for command in commands {
        tracing::debug!(%command, "running reload command");
        match run_command(command, use_shell) {
            Ok(output) => {
                log_command_output(log_dir, command, &output);
                if !output.status.success() {
                    diags.warn(format!(
                        "reload command '{command}' exited with {}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    ));
                }
            }
            Err(e) => diags.warn(format!("cannot run reload command '{command}': {e}")),
        }
    }
    tracing::info!("reload commands finished");
}

fn run_command(command: &str, use_shell: bool) -> std::io::Result<Output> {
    if use_shell {
        return Command::new("sh").arg("-c").arg(command).output();
    }
    let args = shlex::split(command).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "unbalanced quotes in command")
    })?;
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"))?;
    Command::new(program).args(rest).output()
}

/// Tee a command's stdout/stderr into `<command>.log` under the run's log
/// directory, when logging is enabled.
fn log_command_output(log_dir: Option<&Path>, command: &str, output: &Output) {
    let Some(dir) = log_dir else {
        return;
    };
    let stem: String = command
        .split_whitespace()
        .next()
        .unwrap_or("command")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let path = dir.join(format!("{stem}.log"));

    let result = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .and_then(|mut file| {
            writeln!(file, "$ {command}")?;
            file.write_all(&output.stdout)?;
            file.write_all(&output.stderr)?;
            Ok(())
        });
    if let Err(e) = result {
        tracing::warn!("cannot write command log {}: {e}", path.display());
    }
}
