//! Error taxonomy and exit-code mapping.
//!
//! - Engine failures never show up here: the gateway logs them and returns
//!   empty values.
//! - `PreconditionError`, `LoadError` and `VarsError` terminate the pipeline
//!   (exit 1; 127 when the engine binary is missing).
//! - `ContractError` is raised by build routines and ends the build before
//!   commit, leaving the staging container in place.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("image does not exist: {image}")]
    ImageNotFound {
        image: String,
        available: Vec<String>,
    },
    #[error("container does not exist: {name}")]
    ContainerNotFound { name: String },
    #[error("staging container {name} could not be created from {image}")]
    ContainerNotCreated { image: String, name: String },
    #[error(transparent)]
    EngineUnavailable(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("build routine {routine} has no `run` entry point")]
    MissingEntryPoint { routine: String },
    #[error("build routine {routine}: `run` must be a function, found {found}")]
    NotCallable { routine: String, found: String },
    #[error("build routine {routine}: variables do not match its signature: {detail}")]
    Signature { routine: String, detail: String },
    #[error("build routine {routine} failed: {detail}")]
    Failed { routine: String, detail: String },
}

impl ContractError {
    pub fn routine(&self) -> &str {
        match self {
            ContractError::MissingEntryPoint { routine }
            | ContractError::NotCallable { routine, .. }
            | ContractError::Signature { routine, .. }
            | ContractError::Failed { routine, .. } => routine,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot resolve build routine `{locator}` (searched: {searched})")]
    NotFound { locator: String, searched: String },
    #[error("cannot read build routine {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot load build routine {}: {detail}", path.display())]
    Script { path: PathBuf, detail: String },
}

#[derive(Debug, Error)]
pub enum VarsError {
    #[error("cannot parse inline variables: {detail}")]
    Inline { detail: String },
    #[error("variables file does not exist: {}", path.display())]
    Missing { path: PathBuf },
    #[error("cannot read variables file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse variables file {}: {detail}", path.display())]
    File { path: PathBuf, detail: String },
}

/// Pipeline-terminating failures.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Vars(#[from] VarsError),
}

pub fn exit_code_for_build_error(e: &BuildError) -> u8 {
    match e {
        BuildError::Precondition(PreconditionError::EngineUnavailable(ioe)) => {
            exit_code_for_io_error(ioe)
        }
        _ => 1,
    }
}
