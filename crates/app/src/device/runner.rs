//! External command execution

use std::io;
use std::process::{Command, Stdio};

/// Outcome of one external command invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Whether the process exited with code zero
    pub success: bool,
    /// Combined stdout and stderr text
    pub text: String,
}

/// Seam for invoking the external device-management tools.
///
/// `run` returns `Err` only when the process could not be spawned at all
/// (tool not installed, not on PATH); a process that runs and exits non-zero
/// is an `Ok` output with `success` false, since its text may still carry a
/// usable diagnostic.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Runs commands on the host system, merging stderr into the captured text
/// the way the device tools expect to be read.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        // Localized tool output is not guaranteed UTF-8; lossy is the best
        // we can do without codepage conversion
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            success: output.status.success(),
            text,
        })
    }
}
