//! Routines shipped with the binary.

use serde_json::Value;
use tracing::info;

use crate::context::ExecutionContext;
use crate::errors::ContractError;
use crate::routine::BuildRoutine;
use crate::vars::Variables;

/// Runs the `commands` variable (a string or a list of strings) line by line
/// through the container shell.
pub struct ShellRoutine;

impl ShellRoutine {
    pub const NAME: &'static str = "shell";

    fn commands(vars: &Variables) -> Result<Vec<String>, ContractError> {
        let mismatch = |detail: &str| ContractError::Signature {
            routine: Self::NAME.to_string(),
            detail: detail.to_string(),
        };
        match vars.get("commands") {
            None => Err(mismatch("missing required variable `commands`")),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|i| match i {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(mismatch("`commands` must contain only strings")),
                })
                .collect(),
            Some(_) => Err(mismatch("`commands` must be a string or a list of strings")),
        }
    }
}

impl BuildRoutine for ShellRoutine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run(&self, ctx: &ExecutionContext<'_>, vars: &Variables) -> Result<(), ContractError> {
        let commands = Self::commands(vars)?;
        for (i, line) in commands.iter().enumerate() {
            let out = ctx.run_shell(line);
            tracing::debug!(step = i + 1, output = %out, "shell step finished");
        }
        info!(routine = Self::NAME, steps = commands.len(), "shell routine finished");
        Ok(())
    }
}
