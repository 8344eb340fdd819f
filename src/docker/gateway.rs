#![allow(clippy::module_name_repetitions)]
//! Typed wrappers over the docker CLI.
//!
//! Every engine failure (spawn error or non-zero exit) is logged here and
//! turned into an empty value: listings become empty vectors, mutating calls
//! report `false`/`None`, `exec` returns an empty string. Callers never see
//! raw process errors.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::color::echo_failed_output;
use crate::docker::runner::{CommandRunner, EngineOutput};
use crate::docker::types::{Container, Image};
use crate::logging::Logger;
use crate::util::shell_join;

/// Keeps a detached staging container alive for later `exec` calls.
pub const KEEPALIVE_COMMAND: &str = "tail -f /dev/null";

const JSON_FORMAT: &str = "--format={{json .}}";

#[derive(Clone)]
pub struct DockerGateway {
    runner: Arc<dyn CommandRunner>,
    log: Logger,
}

/// Why an engine call produced no usable output.
struct EngineFailure {
    stdout: String,
    stderr: String,
}

impl DockerGateway {
    pub fn new(runner: Arc<dyn CommandRunner>, log: &Logger) -> Self {
        Self {
            runner,
            log: log.component("engine"),
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.log
    }

    fn call(&self, args: Vec<String>) -> Result<String, EngineFailure> {
        let preview = shell_join(&args);
        self.log.in_scope(|| debug!(command = %preview, "docker invocation"));
        match self.runner.run(&args) {
            Ok(EngineOutput {
                success: true,
                stdout,
                ..
            }) => Ok(stdout),
            Ok(EngineOutput { stdout, stderr, .. }) => {
                self.log.in_scope(|| {
                    error!(command = %preview, stderr = %stderr.trim(), "docker command failed")
                });
                Err(EngineFailure { stdout, stderr })
            }
            Err(e) => {
                self.log.in_scope(|| {
                    error!(command = %preview, error = %format!("{e:#}"), "docker command could not be run")
                });
                Err(EngineFailure {
                    stdout: String::new(),
                    stderr: format!("{e:#}"),
                })
            }
        }
    }

    fn parse_lines<T: DeserializeOwned>(&self, text: &str, what: &str) -> Vec<T> {
        let mut out = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<T>(line) {
                Ok(v) => out.push(v),
                Err(e) => self.log.in_scope(|| {
                    warn!(kind = what, details = line, error = %e, "skipping malformed docker record")
                }),
            }
        }
        out
    }

    pub fn list_images(&self) -> Vec<Image> {
        match self.call(vec!["images".into(), JSON_FORMAT.into()]) {
            Ok(stdout) => self.parse_lines(&stdout, "image"),
            Err(_) => Vec::new(),
        }
    }

    pub fn list_containers(&self) -> Vec<Container> {
        match self.call(vec!["ps".into(), "-a".into(), JSON_FORMAT.into()]) {
            Ok(stdout) => self.parse_lines(&stdout, "container"),
            Err(_) => Vec::new(),
        }
    }

    /// Current `repository:tag` inventory.
    pub fn image_names(&self) -> Vec<String> {
        self.list_images().iter().map(Image::reference).collect()
    }

    /// All containers whose engine-reported name equals `name` exactly.
    pub fn find_containers(&self, name: &str) -> Vec<Container> {
        self.list_containers()
            .into_iter()
            .filter(|c| c.name == name)
            .collect()
    }

    pub fn container_ids(&self) -> Vec<String> {
        self.list_containers().into_iter().map(|c| c.id).collect()
    }

    /// Start `image` as a detached container running a no-op keepalive.
    pub fn run_detached(&self, image: &str, name: &str, volumes: &[String]) -> Option<String> {
        let mut args = vec!["run".to_string(), "-d".to_string(), format!("--name={name}")];
        for v in volumes {
            args.push("-v".to_string());
            args.push(v.clone());
        }
        args.push(image.to_string());
        args.push("/bin/sh".to_string());
        args.push("-c".to_string());
        args.push(KEEPALIVE_COMMAND.to_string());

        let id = self.call(args).ok()?.trim().to_string();
        if id.is_empty() {
            self.log.in_scope(|| {
                warn!(image, container = name, "docker run returned no container id")
            });
            return None;
        }
        self.log
            .in_scope(|| info!(image, container = name, container_id = %id, "container started"));
        Some(id)
    }

    /// Batch stop. The engine reports one status for the whole set, so a
    /// `false` result does not say which ids failed.
    pub fn stop(&self, ids: &[String]) -> bool {
        self.batch("stop", ids)
    }

    /// Batch remove; same all-or-nothing reporting as `stop`.
    pub fn remove(&self, ids: &[String]) -> bool {
        self.batch("rm", ids)
    }

    fn batch(&self, verb: &str, ids: &[String]) -> bool {
        if ids.is_empty() {
            self.log
                .in_scope(|| info!(action = verb, "no containers to process"));
            return true;
        }
        self.log
            .in_scope(|| info!(action = verb, ids = ?ids, "processing containers"));
        let mut args = vec![verb.to_string()];
        args.extend(ids.iter().cloned());
        self.call(args).is_ok()
    }

    /// Run `args` inside `container` without a shell. On failure the captured
    /// output is echoed to stderr and an empty string is returned, so an empty
    /// result is ambiguous.
    pub fn exec(&self, container: &str, args: &[String]) -> String {
        self.log.in_scope(|| {
            info!(container, command = %shell_join(args), "executing in container")
        });
        let mut full = vec!["exec".to_string(), container.to_string()];
        full.extend(args.iter().cloned());
        match self.call(full) {
            Ok(stdout) => stdout,
            Err(failure) => {
                echo_failed_output(&failure.stdout, &failure.stderr);
                String::new()
            }
        }
    }

    /// `docker cp src dest`; either side may be `container:path`.
    pub fn copy(&self, src: &str, dest: &str) -> bool {
        self.log.in_scope(|| info!(src, dest, "copying"));
        self.call(vec!["cp".into(), src.into(), dest.into()]).is_ok()
    }

    /// `docker inspect [--format=<fmt>] <name>`; an empty format returns the full JSON document.
    pub fn inspect(&self, name: &str, format: &str) -> String {
        let mut args = vec!["inspect".to_string()];
        if !format.is_empty() {
            args.push(format!("--format={format}"));
        }
        args.push(name.to_string());
        self.call(args)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    }

    pub fn commit(&self, container: &str, image: &str) -> Option<String> {
        if container.trim().is_empty() || image.trim().is_empty() {
            self.log.in_scope(|| {
                info!(container, image, "no container or image name for commit")
            });
            return None;
        }
        self.log
            .in_scope(|| info!(container, image, "committing container into image"));
        let id = self
            .call(vec!["commit".into(), container.into(), image.into()])
            .ok()?
            .trim()
            .to_string();
        self.log.in_scope(|| {
            info!(container, image, image_id = %id, "container committed to image")
        });
        Some(id)
    }
}
