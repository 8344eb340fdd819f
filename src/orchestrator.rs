#![allow(clippy::module_name_repetitions)]
//! Staging-container build pipeline.
//!
//! `SOURCE_CHECK -> CONTAINER_ACQUIRE -> BUILD_EXEC -> COMMIT -> (CLEANUP)`
//!
//! Precondition and load failures abort with a `BuildError`; the routine is
//! loaded only once a fresh staging container exists, so a load failure
//! leaves that container in place. A failed routine or commit ends in a
//! [`BuildOutcome`] and also keeps the container for inspection or `halt`.

use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::context::ExecutionContext;
use crate::docker::DockerGateway;
use crate::errors::{BuildError, ContractError, PreconditionError};
use crate::logging::Logger;
use crate::routine::{BuildRoutine, RoutineLoader};
use crate::vars::Variables;

/// One `build` invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildPlan {
    pub source_image: String,
    pub container_name: String,
    pub target_image: String,
    /// Routine locator (script path, registry name or dotted module path).
    pub routine: String,
    pub rerun: bool,
    pub remove_staging: bool,
    pub volumes: Vec<String>,
}

#[derive(Debug)]
pub enum BuildOutcome {
    /// A container with the staging name already existed and re-run was off.
    Skipped,
    BuildFailed(ContractError),
    CommitFailed,
    Committed { image_id: String, cleaned_up: bool },
}

impl BuildOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildOutcome::Skipped | BuildOutcome::Committed { .. } => 0,
            BuildOutcome::BuildFailed(_) | BuildOutcome::CommitFailed => 1,
        }
    }
}

pub struct StagingOrchestrator {
    gateway: DockerGateway,
    loader: RoutineLoader,
    log: Logger,
}

impl StagingOrchestrator {
    pub fn new(gateway: DockerGateway, loader: RoutineLoader, log: &Logger) -> Self {
        Self {
            gateway,
            loader,
            log: log.component("orchestrator"),
        }
    }

    pub fn gateway(&self) -> &DockerGateway {
        &self.gateway
    }

    /// The source image must appear verbatim as `repository:tag`.
    pub fn check_source(&self, image: &str) -> Result<(), PreconditionError> {
        let available = self.gateway.image_names();
        if available.iter().any(|n| n == image) {
            self.log.in_scope(|| info!(image, "source image found"));
            return Ok(());
        }
        self.log.in_scope(|| {
            error!(image, available = ?available, "source image does not exist")
        });
        Err(PreconditionError::ImageNotFound {
            image: image.to_string(),
            available,
        })
    }

    /// Make sure a staging container named `name` is running. `Ok(None)`
    /// means one already exists and `rerun` is off, so nothing was touched.
    pub fn acquire_container(
        &self,
        image: &str,
        name: &str,
        rerun: bool,
        volumes: &[String],
    ) -> Result<Option<String>, PreconditionError> {
        let existing: Vec<String> = self
            .gateway
            .find_containers(name)
            .into_iter()
            .map(|c| c.id)
            .collect();

        if !existing.is_empty() {
            if !rerun {
                self.log.in_scope(|| {
                    warn!(container = name, ids = ?existing, "container already exists; not re-running")
                });
                return Ok(None);
            }
            self.log.in_scope(|| {
                info!(container = name, ids = ?existing, "re-running: replacing existing container")
            });
            self.gateway.stop(&existing);
            self.gateway.remove(&existing);
        }

        match self.gateway.run_detached(image, name, volumes) {
            Some(id) => Ok(Some(id)),
            None => Err(PreconditionError::ContainerNotCreated {
                image: image.to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// The `run` operation: source check and container acquisition only.
    pub fn run_container(
        &self,
        image: &str,
        name: &str,
        rerun: bool,
        volumes: &[String],
    ) -> Result<Option<String>, PreconditionError> {
        self.check_source(image)?;
        self.acquire_container(image, name, rerun, volumes)
    }

    pub fn build(&self, plan: &BuildPlan, vars: &Variables) -> Result<BuildOutcome, BuildError> {
        self.check_source(&plan.source_image)?;

        let Some(_) = self.acquire_container(
            &plan.source_image,
            &plan.container_name,
            plan.rerun,
            &plan.volumes,
        )?
        else {
            return Ok(BuildOutcome::Skipped);
        };

        let routine = self.loader.load(&plan.routine)?;
        if let Err(e) = self.execute(routine.as_ref(), &plan.container_name, vars)? {
            self.log.in_scope(|| {
                error!(
                    routine = e.routine(),
                    container = %plan.container_name,
                    error = %e,
                    "build routine failed; staging container left in place"
                )
            });
            return Ok(BuildOutcome::BuildFailed(e));
        }

        let Some(image_id) = self
            .gateway
            .commit(&plan.container_name, &plan.target_image)
        else {
            self.log.in_scope(|| {
                error!(container = %plan.container_name, image = %plan.target_image, "commit failed")
            });
            return Ok(BuildOutcome::CommitFailed);
        };

        let cleaned_up = plan.remove_staging && self.cleanup(&plan.container_name);
        self.log.in_scope(|| {
            info!(
                image = %plan.target_image,
                image_id = %image_id,
                cleaned_up,
                "build finished"
            )
        });
        Ok(BuildOutcome::Committed {
            image_id,
            cleaned_up,
        })
    }

    /// Bind a context to `name` and run the routine. The outer error is a
    /// precondition failure; the inner one is the routine's own outcome.
    fn execute(
        &self,
        routine: &dyn BuildRoutine,
        name: &str,
        vars: &Variables,
    ) -> Result<Result<(), ContractError>, PreconditionError> {
        let ctx = ExecutionContext::new(&self.gateway, name)?;
        let routine_log = self.log.component("routine");
        routine_log.in_scope(|| {
            info!(routine = routine.name(), container = name, variables = vars.len(), "running build routine")
        });
        Ok(routine_log.in_scope(|| routine.run(&ctx, vars)))
    }

    /// Stop and remove every container named exactly `name`.
    pub fn cleanup(&self, name: &str) -> bool {
        let ids: Vec<String> = self
            .gateway
            .find_containers(name)
            .into_iter()
            .map(|c| c.id)
            .collect();
        self.log
            .in_scope(|| info!(container = name, ids = ?ids, "removing staging container"));
        let stopped = self.gateway.stop(&ids);
        let removed = self.gateway.remove(&ids);
        stopped && removed
    }

    /// Stop and remove the given containers (names or ids), or every
    /// container with `all`. Returns the ids still present afterwards.
    pub fn halt(&self, targets: &[String], all: bool) -> Vec<String> {
        let ids: Vec<String> = if all {
            self.gateway.container_ids()
        } else {
            let mut ids = Vec::new();
            let mut seen = HashSet::new();
            for target in targets {
                let matched: Vec<String> = self
                    .gateway
                    .find_containers(target)
                    .into_iter()
                    .map(|c| c.id)
                    .collect();
                let resolved = if matched.is_empty() {
                    vec![target.clone()]
                } else {
                    matched
                };
                for id in resolved {
                    if seen.insert(id.clone()) {
                        ids.push(id);
                    }
                }
            }
            ids
        };

        self.gateway.stop(&ids);
        self.gateway.remove(&ids);

        let remaining = self.gateway.container_ids();
        self.log
            .in_scope(|| info!(remaining = ?remaining, "containers after halt"));
        remaining
    }
}
