#![allow(clippy::module_name_repetitions)]
//! Container engine gateway: runtime discovery, process seam, record types
//! and the typed docker operations.

pub mod gateway;
pub mod runner;
pub mod runtime;
pub mod types;

pub use gateway::{DockerGateway, KEEPALIVE_COMMAND};
pub use runner::{CommandRunner, DockerCli, EngineOutput};
pub use runtime::container_runtime_path;
pub use types::{Container, Image};
