#![allow(clippy::module_name_repetitions)]
//! The handle a build routine uses to act on its staging container.

use std::fmt;

use tracing::{error, info, warn};

use crate::docker::DockerGateway;
use crate::errors::PreconditionError;
use crate::facts::{self, FactCategory, FactCommand, Facts};
use crate::logging::Logger;
use crate::util::shell_like_split_args;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CopyDirection {
    /// Host path to container path.
    In,
    /// Container path to host path.
    Out,
}

/// Bound to exactly one container name for its whole lifetime. The binding
/// is checked once at construction; a container removed afterwards shows up
/// as failed (empty) engine calls.
pub struct ExecutionContext<'a> {
    gateway: &'a DockerGateway,
    name: String,
    log: Logger,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(gateway: &'a DockerGateway, name: &str) -> Result<Self, PreconditionError> {
        let log = gateway.logger().component("context");
        if gateway.find_containers(name).is_empty() {
            let available: Vec<String> = gateway
                .list_containers()
                .into_iter()
                .map(|c| c.name)
                .collect();
            log.in_scope(|| {
                error!(container = name, available = ?available, "container does not exist")
            });
            return Err(PreconditionError::ContainerNotFound {
                name: name.to_string(),
            });
        }
        Ok(Self {
            gateway,
            name: name.to_string(),
            log,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tokenize `line` into shell words and exec them directly: pipes,
    /// redirects and globs reach the program as literal arguments.
    pub fn run_command(&self, line: &str) -> String {
        let args = shell_like_split_args(line);
        if args.is_empty() {
            self.log
                .in_scope(|| warn!(container = %self.name, "empty command line ignored"));
            return String::new();
        }
        self.exec_argv(&args)
    }

    /// Run `line` through the container's `/bin/sh -c`.
    pub fn run_shell(&self, line: &str) -> String {
        self.exec_argv(&["/bin/sh".to_string(), "-c".to_string(), line.to_string()])
    }

    fn exec_argv(&self, args: &[String]) -> String {
        self.gateway
            .exec(&self.name, args)
            .trim_end()
            .to_string()
    }

    pub fn copy(&self, src: &str, dest: &str, direction: CopyDirection) -> bool {
        let (from, to) = match direction {
            CopyDirection::In => (src.to_string(), format!("{}:{}", self.name, dest)),
            CopyDirection::Out => (format!("{}:{}", self.name, src), dest.to_string()),
        };
        self.gateway.copy(&from, &to)
    }

    pub fn copy_in(&self, host_path: &str, container_path: &str) -> bool {
        self.copy(host_path, container_path, CopyDirection::In)
    }

    pub fn copy_out(&self, container_path: &str, host_path: &str) -> bool {
        self.copy(container_path, host_path, CopyDirection::Out)
    }

    /// Engine metadata for this container; `format` is a Go template such as
    /// `{{.State.Status}}`, empty for the full JSON document.
    pub fn inspect(&self, format: &str) -> String {
        self.gateway.inspect(&self.name, format)
    }

    pub fn gather_facts(&self, categories: &[FactCategory]) -> Facts {
        self.log.in_scope(|| {
            info!(container = %self.name, categories = ?categories, "gathering facts")
        });
        facts::gather(categories, |cmd| match cmd {
            FactCommand::Argv(argv) => {
                let args: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
                self.exec_argv(&args)
            }
            FactCommand::Shell(line) => self.run_shell(line),
        })
    }
}

impl fmt::Debug for ExecutionContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
