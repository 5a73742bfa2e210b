// Running av1an and querying tool versions

use std::ffi::OsString;
use std::io;
use std::process::{Command, ExitStatus};

use thiserror::Error;

use super::command::CommandLine;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}. Is it installed and in PATH?")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with status: {status}")]
    Failed { program: String, status: ExitStatus },
}

/// Spawns child processes with an explicit set of environment overrides
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    env: Vec<(OsString, OsString)>,
    new_console: bool,
}

impl Launcher {
    pub fn new(env: Vec<(OsString, OsString)>) -> Self {
        Self {
            env,
            new_console: false,
        }
    }

    /// Open av1an in its own console window (Windows only; ignored elsewhere)
    pub fn with_new_console(mut self, new_console: bool) -> Self {
        self.new_console = new_console;
        self
    }

    fn prepare(&self, cmd: &mut Command) {
        self.prepare_env_only(cmd);

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;
            if self.new_console {
                cmd.creation_flags(CREATE_NEW_CONSOLE);
            }
        }
    }

    /// Run the command to completion
    pub fn run(&self, command_line: &CommandLine) -> Result<(), LaunchError> {
        let mut cmd = command_line.to_command();
        self.prepare(&mut cmd);

        tracing::debug!(program = %command_line.program, new_console = self.new_console, "spawning");
        let status = cmd.status().map_err(|source| LaunchError::Spawn {
            program: command_line.program.clone(),
            source,
        })?;

        if !status.success() {
            return Err(LaunchError::Failed {
                program: command_line.program.clone(),
                status,
            });
        }

        Ok(())
    }

    /// Full trimmed output of `<program> --version`
    pub fn version(&self, program: &str) -> Result<String, LaunchError> {
        let mut cmd = Command::new(program);
        cmd.arg("--version");
        self.prepare_env_only(&mut cmd);

        let output = cmd.output().map_err(|source| LaunchError::Spawn {
            program: program.to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(LaunchError::Failed {
                program: program.to_string(),
                status: output.status,
            });
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if version.is_empty() {
            return Ok("Unknown version".to_string());
        }
        Ok(version)
    }

    fn prepare_env_only(&self, cmd: &mut Command) {
        cmd.envs(self.env.iter().map(|(k, v)| (k, v)));
    }
}
