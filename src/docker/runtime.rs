#![allow(clippy::module_name_repetitions)]
//! Docker runtime discovery.

use std::io;
use std::path::{Path, PathBuf};

use which::which;

/// Resolve the engine binary: an explicit override (absolute path or a name
/// looked up on PATH, e.g. `podman`), else `docker` from PATH.
pub fn container_runtime_path(override_path: Option<&Path>) -> io::Result<PathBuf> {
    if let Some(p) = override_path {
        if p.is_file() {
            return Ok(p.to_path_buf());
        }
        return which(p).map_err(|_| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("container engine {} was not found", p.display()),
            )
        });
    }

    if let Ok(p) = which("docker") {
        return Ok(p);
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "Docker is required but was not found in PATH.",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_override_is_not_found() {
        let err = container_runtime_path(Some(Path::new("/nonexistent/dib-engine"))).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("/nonexistent/dib-engine"));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_file_override_is_used_verbatim() {
        let p = Path::new("/bin/sh");
        assert_eq!(container_runtime_path(Some(p)).unwrap(), PathBuf::from("/bin/sh"));
    }
}
