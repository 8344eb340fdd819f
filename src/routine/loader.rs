//! Resolve a routine locator to a runnable [`BuildRoutine`].
//!
//! Resolution order:
//! 1. an existing file path (any extension) is loaded as a Lua script;
//! 2. a locator ending in `.lua` is looked up relative to each search path;
//! 3. a name registered in the [`RoutineRegistry`];
//! 4. a dotted name `a.b.c` becomes `a/b/c.lua` or `a/b/c/init.lua` under
//!    each search path, first match wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::LoadError;
use crate::logging::Logger;
use crate::routine::{BuildRoutine, LuaRoutine, RoutineRegistry};

/// Extra routine search directories, `:`-separated.
pub const ROUTINE_PATH_ENV: &str = "DIB_ROUTINE_PATH";

pub struct RoutineLoader {
    search_paths: Vec<PathBuf>,
    registry: RoutineRegistry,
    log: Logger,
}

impl RoutineLoader {
    pub fn new(search_paths: Vec<PathBuf>, registry: RoutineRegistry, log: &Logger) -> Self {
        Self {
            search_paths,
            registry,
            log: log.component("loader"),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    pub fn registry(&self) -> &RoutineRegistry {
        &self.registry
    }

    /// Find the script a locator refers to. `Ok(None)` means a registry hit.
    pub fn resolve(&self, locator: &str) -> Result<Option<PathBuf>, LoadError> {
        let locator = locator.trim();
        let direct = Path::new(locator);
        if direct.is_file() {
            return Ok(Some(direct.to_path_buf()));
        }

        if locator.ends_with(".lua") {
            if let Some(p) = self.first_existing(|dir| vec![dir.join(locator)]) {
                return Ok(Some(p));
            }
            return Err(self.not_found(locator));
        }

        if self.registry.get(locator).is_some() {
            return Ok(None);
        }

        if let Some(segments) = dotted_segments(locator) {
            let rel: PathBuf = segments.iter().collect();
            let found = self.first_existing(|dir| {
                let base = dir.join(&rel);
                vec![base.with_extension("lua"), base.join("init.lua")]
            });
            if let Some(p) = found {
                return Ok(Some(p));
            }
        }
        Err(self.not_found(locator))
    }

    pub fn load(&self, locator: &str) -> Result<Arc<dyn BuildRoutine>, LoadError> {
        match self.resolve(locator)? {
            None => {
                self.log
                    .in_scope(|| info!(routine = locator.trim(), "using built-in routine"));
                self.registry
                    .get(locator.trim())
                    .ok_or_else(|| self.not_found(locator))
            }
            Some(path) => {
                let routine = LuaRoutine::load(&path)?;
                self.log.in_scope(|| {
                    info!(routine = locator.trim(), path = %path.display(), "routine script loaded")
                });
                Ok(Arc::new(routine))
            }
        }
    }

    fn first_existing(&self, candidates: impl Fn(&Path) -> Vec<PathBuf>) -> Option<PathBuf> {
        for dir in &self.search_paths {
            for c in candidates(dir) {
                self.log
                    .in_scope(|| debug!(candidate = %c.display(), "probing routine path"));
                if c.is_file() {
                    return Some(c);
                }
            }
        }
        None
    }

    fn not_found(&self, locator: &str) -> LoadError {
        let searched = self
            .search_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        LoadError::NotFound {
            locator: locator.trim().to_string(),
            searched,
        }
    }
}

/// Split `a.b.c` into segments; `None` unless every segment is a plain
/// identifier-like name.
fn dotted_segments(locator: &str) -> Option<Vec<&str>> {
    if locator.is_empty() {
        return None;
    }
    let segments: Vec<&str> = locator.split('.').collect();
    let valid = segments.iter().all(|s| {
        !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    });
    valid.then_some(segments)
}
