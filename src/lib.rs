//! Build derived Docker images by running a build routine against a staging
//! container and committing the result.
//!
//! Layout:
//! - [`docker`]: engine gateway over the `docker` CLI
//! - [`context`]: the handle routines use to act on one container
//! - [`facts`]: pure parsers for host introspection output
//! - [`routine`]: the routine trait, built-ins and the Lua script loader
//! - [`vars`]: YAML/JSON variables
//! - [`orchestrator`]: the staging pipeline, `run` and `halt`

pub mod color;
pub mod config;
pub mod context;
pub mod docker;
pub mod errors;
pub mod facts;
pub mod logging;
pub mod orchestrator;
pub mod routine;
pub mod util;
pub mod vars;

pub use color::{color_enabled_stderr, set_color_mode, ColorMode};
pub use config::Settings;
pub use context::{CopyDirection, ExecutionContext};
pub use docker::{CommandRunner, Container, DockerCli, DockerGateway, EngineOutput, Image};
pub use errors::{
    exit_code_for_build_error, exit_code_for_io_error, BuildError, ContractError, LoadError,
    PreconditionError, VarsError,
};
pub use facts::{FactCategory, Facts};
pub use logging::{LogFormat, Logger};
pub use orchestrator::{BuildOutcome, BuildPlan, StagingOrchestrator};
pub use routine::{BuildRoutine, LuaRoutine, RoutineLoader, RoutineRegistry, ShellRoutine};
pub use vars::{DataLoader, Variables};
