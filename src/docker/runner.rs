#![allow(clippy::module_name_repetitions)]
//! Process seam between the gateway and the engine binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;

use crate::util::{ExecRequest, ExecService};

/// Captured result of one engine invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl EngineOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// Runs one engine command line (`args` excludes the engine binary itself).
///
/// `Err` means the process could not be started or waited on; a non-zero
/// exit is reported through `EngineOutput::success`.
pub trait CommandRunner: Send + Sync {
    fn run(&self, args: &[String]) -> Result<EngineOutput>;
}

/// The real engine: spawns the docker binary once per call.
#[derive(Debug, Clone)]
pub struct DockerCli {
    runtime: PathBuf,
    exec: ExecService,
}

impl DockerCli {
    pub fn new(runtime: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            runtime: runtime.into(),
            exec: ExecService::new(timeout),
        }
    }

    pub fn runtime(&self) -> &Path {
        &self.runtime
    }
}

impl CommandRunner for DockerCli {
    fn run(&self, args: &[String]) -> Result<EngineOutput> {
        let out = self
            .exec
            .run(ExecRequest::new(&self.runtime).args(args.iter()))?;
        Ok(EngineOutput {
            success: out.status.success(),
            stdout: out.stdout,
            stderr: out.stderr,
        })
    }
}
