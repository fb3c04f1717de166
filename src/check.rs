//! Validation of generated declarations with an external TypeScript compiler.

use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};

use crate::error::CheckError;

/// Runs the compiler over a set of declaration files without emitting
/// anything.
#[derive(Debug, Clone)]
pub struct CompilerCheck {
    program: String,
    args: Vec<String>,
}

impl CompilerCheck {
    /// Build from a command line such as `"tsc"` or `"npx tsc"`. Returns
    /// `None` when the command is blank.
    pub fn new(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Check `files` together. Every file must type-check under `--strict`.
    pub fn run(&self, files: &[PathBuf]) -> Result<(), CheckError> {
        debug!(program = %self.program, files = files.len(), "running compiler check");
        let output = Command::new(&self.program)
            .args(&self.args)
            .args(["--noEmit", "--strict"])
            .args(files)
            .output()
            .map_err(|source| CheckError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            // tsc reports diagnostics on stdout.
            let mut report = String::from_utf8_lossy(&output.stdout).into_owned();
            report.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(CheckError::Failed {
                status: output.status,
                output: report.trim_end().to_string(),
            });
        }
        info!(files = files.len(), "compiler check passed");
        Ok(())
    }
}
