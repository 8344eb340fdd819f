#![allow(clippy::module_name_repetitions)]
//! Build routines: the unit of user code run against a staging container.
//!
//! A routine is anything implementing [`BuildRoutine`]. Routines come from
//! two places, both resolved by [`RoutineLoader`]:
//! - the compiled-in [`RoutineRegistry`] (e.g. the `shell` routine),
//! - Lua scripts exposing a `run(ctx, vars)` entry point.

pub mod builtin;
pub mod loader;
pub mod lua;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::errors::ContractError;
use crate::vars::Variables;

pub use builtin::ShellRoutine;
pub use loader::{RoutineLoader, ROUTINE_PATH_ENV};
pub use lua::LuaRoutine;

pub trait BuildRoutine {
    /// Identity used in logs and errors (a registry name or a script path).
    fn name(&self) -> &str;

    /// Mutate the container through `ctx`. Returning `Err` stops the build
    /// before commit.
    fn run(&self, ctx: &ExecutionContext<'_>, vars: &Variables) -> Result<(), ContractError>;
}

/// Routines compiled into the binary, addressed by name.
#[derive(Clone, Default)]
pub struct RoutineRegistry {
    routines: BTreeMap<String, Arc<dyn BuildRoutine>>,
}

impl RoutineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut r = Self::new();
        r.register(Arc::new(ShellRoutine));
        r
    }

    pub fn register(&mut self, routine: Arc<dyn BuildRoutine>) {
        self.routines.insert(routine.name().to_string(), routine);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn BuildRoutine>> {
        self.routines.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.routines.keys().map(String::as_str)
    }
}
