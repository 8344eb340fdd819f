//! Process settings from CLI flags and environment.
//!
//! - `DIB_DOCKER`: engine binary (path or name on PATH); default `docker`.
//! - `DIB_ENGINE_TIMEOUT`: seconds per engine call; unset or `0` waits forever.
//! - `DIB_ROUTINE_PATH`: `:`-separated routine directories, searched after
//!   `--routine-path` flags and before the current directory.

use std::env;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crate::docker::{container_runtime_path, DockerCli};
use crate::routine::ROUTINE_PATH_ENV;
use crate::util::split_paths_env;

pub const DOCKER_ENV: &str = "DIB_DOCKER";
pub const ENGINE_TIMEOUT_ENV: &str = "DIB_ENGINE_TIMEOUT";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    pub docker: Option<PathBuf>,
    /// Zero means no timeout.
    pub engine_timeout: Duration,
    pub routine_paths: Vec<PathBuf>,
}

/// Trimmed env getter returning Some when non-empty.
fn env_trim(k: &str) -> Option<String> {
    env::var(k)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl Settings {
    pub fn from_env(cli_routine_paths: &[PathBuf]) -> Self {
        Self::from_lookup(cli_routine_paths, env_trim)
    }

    pub fn from_lookup(
        cli_routine_paths: &[PathBuf],
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let docker = lookup(DOCKER_ENV).map(PathBuf::from);
        let engine_timeout = lookup(ENGINE_TIMEOUT_ENV)
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO);

        let mut routine_paths = cli_routine_paths.to_vec();
        if let Some(v) = lookup(ROUTINE_PATH_ENV) {
            routine_paths.extend(split_paths_env(&v));
        }
        routine_paths.push(env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

        Self {
            docker,
            engine_timeout,
            routine_paths,
        }
    }

    /// Locate the engine binary; NotFound when neither the override nor
    /// `docker` resolves.
    pub fn engine(&self) -> io::Result<DockerCli> {
        let runtime = container_runtime_path(self.docker.as_deref())?;
        Ok(DockerCli::new(runtime, self.engine_timeout))
    }
}
