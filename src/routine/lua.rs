//! Lua build scripts.
//!
//! A script either defines a global `run` function or returns a table with a
//! `run` field:
//!
//! ```lua
//! return {
//!   params = { "packages" },
//!   run = function(ctx, vars)
//!     ctx:run_shell("apk add --no-cache " .. table.concat(vars.packages, " "))
//!   end,
//! }
//! ```
//!
//! `params` (optional) lists variables the entry point requires; a missing
//! one is a signature mismatch and `run` is not called.

use std::fs;
use std::path::{Path, PathBuf};

use mlua::prelude::*;

use crate::context::ExecutionContext;
use crate::errors::{ContractError, LoadError};
use crate::facts::FactCategory;
use crate::routine::BuildRoutine;
use crate::vars::Variables;

pub struct LuaRoutine {
    name: String,
    path: PathBuf,
    source: String,
}

impl LuaRoutine {
    /// Read and compile the script. Only syntax is checked here; the chunk
    /// itself runs when the routine runs.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.display().to_string();
        Lua::new()
            .load(&source)
            .set_name(format!("@{name}"))
            .into_function()
            .map_err(|e| LoadError::Script {
                path: path.to_path_buf(),
                detail: e.to_string(),
            })?;
        Ok(Self {
            name,
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn failed(&self, e: impl std::fmt::Display) -> ContractError {
        ContractError::Failed {
            routine: self.name.clone(),
            detail: e.to_string(),
        }
    }

    /// Evaluate the chunk and locate `run` and the optional `params` list.
    fn entry_point(&self, lua: &Lua) -> Result<(LuaFunction, Vec<String>), ContractError> {
        let returned: LuaValue = lua
            .load(&self.source)
            .set_name(format!("@{}", self.name))
            .eval()
            .map_err(|e| self.failed(e))?;

        let (run, params): (LuaValue, LuaValue) = match &returned {
            LuaValue::Table(t) => (
                t.get("run").map_err(|e| self.failed(e))?,
                t.get("params").map_err(|e| self.failed(e))?,
            ),
            _ => (LuaValue::Nil, LuaValue::Nil),
        };
        let run = match run {
            LuaValue::Nil => lua.globals().get("run").map_err(|e| self.failed(e))?,
            v => v,
        };
        let params = match params {
            LuaValue::Nil => lua.globals().get("params").map_err(|e| self.failed(e))?,
            v => v,
        };

        let func = match run {
            LuaValue::Function(f) => f,
            LuaValue::Nil => {
                return Err(ContractError::MissingEntryPoint {
                    routine: self.name.clone(),
                })
            }
            other => {
                return Err(ContractError::NotCallable {
                    routine: self.name.clone(),
                    found: other.type_name().to_string(),
                })
            }
        };

        let params = match params {
            LuaValue::Nil => Vec::new(),
            LuaValue::Table(t) => t
                .sequence_values::<String>()
                .collect::<LuaResult<Vec<_>>>()
                .map_err(|e| ContractError::Signature {
                    routine: self.name.clone(),
                    detail: format!("`params` must be a list of names: {e}"),
                })?,
            other => {
                return Err(ContractError::Signature {
                    routine: self.name.clone(),
                    detail: format!("`params` must be a list of names, found {}", other.type_name()),
                })
            }
        };
        Ok((func, params))
    }
}

impl BuildRoutine for LuaRoutine {
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: &ExecutionContext<'_>, vars: &Variables) -> Result<(), ContractError> {
        let lua = Lua::new();
        let (func, params) = self.entry_point(&lua)?;

        let missing: Vec<&str> = params
            .iter()
            .map(String::as_str)
            .filter(|p| vars.get(p).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ContractError::Signature {
                routine: self.name.clone(),
                detail: format!("missing variables: {}", missing.join(", ")),
            });
        }

        let vars_value = lua.to_value(vars.as_map()).map_err(|e| self.failed(e))?;
        lua.scope(|scope| {
            let handle = scope.create_userdata(LuaContext { ctx })?;
            func.call::<()>((handle, vars_value))
        })
        .map_err(|e| self.failed(e))
    }
}

/// `ctx` as seen from Lua.
struct LuaContext<'c, 'g> {
    ctx: &'c ExecutionContext<'g>,
}

impl LuaUserData for LuaContext<'_, '_> {
    fn add_fields<F: LuaUserDataFields<Self>>(fields: &mut F) {
        fields.add_field_method_get("name", |_, this| Ok(this.ctx.name().to_string()));
    }

    fn add_methods<M: LuaUserDataMethods<Self>>(methods: &mut M) {
        methods.add_method("run_command", |_, this, line: String| {
            Ok(this.ctx.run_command(&line))
        });
        methods.add_method("run_shell", |_, this, line: String| Ok(this.ctx.run_shell(&line)));
        methods.add_method("copy_in", |_, this, (src, dest): (String, String)| {
            Ok(this.ctx.copy_in(&src, &dest))
        });
        methods.add_method("copy_out", |_, this, (src, dest): (String, String)| {
            Ok(this.ctx.copy_out(&src, &dest))
        });
        methods.add_method("inspect", |_, this, format: Option<String>| {
            Ok(this.ctx.inspect(format.as_deref().unwrap_or("")))
        });
        methods.add_method("gather_facts", |lua, this, names: LuaVariadic<String>| {
            let categories = names
                .iter()
                .map(|n| n.parse::<FactCategory>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(LuaError::external)?;
            lua.to_value(&this.ctx.gather_facts(&categories))
        });
    }
}
