// utils.rs - FFmpeg process helpers
use std::process::Command;

use crate::render::RenderError;

/// Execute FFmpeg command, turning a non-zero exit into `RenderError::Failed` with its stderr
pub fn execute_ffmpeg_command(mut command: Command) -> Result<String, RenderError> {
    tracing::debug!("Executing FFmpeg: {:?}", command);
    let program = command.get_program().to_string_lossy().to_string();

    let output = command.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RenderError::NotInstalled(program.clone())
        } else {
            RenderError::Io(e)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RenderError::Failed(stderr.trim().to_string()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Check that FFmpeg can be launched; returns the first line of `-version`
pub fn check_ffmpeg_available(ffmpeg_path: &str) -> Result<String, RenderError> {
    let mut command = Command::new(ffmpeg_path);
    command.arg("-version");

    let stdout = execute_ffmpeg_command(command)?;
    Ok(stdout.lines().next().unwrap_or_default().to_string())
}

/// Escape a value for use as a filter option inside an `-vf` filtergraph.
///
/// Two levels apply: the option parser (`\ ' :`) and then the graph parser
/// (`\ ' [ ] , ;`).
pub fn escape_filter_value(value: &str) -> String {
    fn escape(value: &str, special: &[char]) -> String {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            if special.contains(&c) {
                escaped.push('\\');
            }
            escaped.push(c);
        }
        escaped
    }

    let option_level = escape(value, &['\\', '\'', ':']);
    escape(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}
