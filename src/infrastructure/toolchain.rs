/// Toolchain passthrough.
///
/// Runs the real toolchain with the wrapper's arguments untouched. The child
/// inherits stdin/stdout/stderr and is waited on without a timeout.

use crate::ports::{ChildExit, Toolchain};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::process::{Command, Stdio};

pub struct ProcessToolchain {
    program: String,
}

impl ProcessToolchain {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, args: &[OsString]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Toolchain for ProcessToolchain {
    fn run(&self, args: &[OsString]) -> Result<ChildExit> {
        let status = self
            .command(args)
            .status()
            .with_context(|| format!("Failed to execute '{}'", self.program))?;
        Ok(ChildExit {
            success: status.success(),
            code: status.code(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Testable Command Builder (for unit tests)
// ═══════════════════════════════════════════════════════════════════════════

/// Describes the command that would be run for a set of arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainCommandSpec {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ProcessToolchain {
    pub fn command_spec(&self, args: &[OsString]) -> ToolchainCommandSpec {
        let cmd = self.command(args);
        ToolchainCommandSpec {
            program: cmd.get_program().to_string_lossy().into_owned(),
            args: cmd.get_args().map(|a| a.to_os_string()).collect(),
        }
    }
}
