//! Detached process launching
//!
//! The dispatcher talks to the OS through the `CommandLauncher` trait so tests
//! can substitute a recording fake.

use std::process::Command;
use thiserror::Error;

/// Failure to start a command
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to launch `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Capability to spawn a shell command without waiting for it
pub trait CommandLauncher: Send + Sync {
    /// Start `command` through the platform shell and return immediately.
    ///
    /// The spawned process is not tracked: no output capture, no exit status.
    fn spawn_detached(&self, command: &str) -> Result<(), SpawnError>;
}

/// Real launcher backed by the platform shell
pub struct ShellLauncher;

impl CommandLauncher for ShellLauncher {
    fn spawn_detached(&self, command: &str) -> Result<(), SpawnError> {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(command);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(command);
            c
        };

        // Child handle dropped on purpose: fire-and-forget
        cmd.spawn().map_err(|source| SpawnError::Io {
            command: command.to_string(),
            source,
        })?;

        Ok(())
    }
}
