use std::path::PathBuf;

use clap::{Parser, Subcommand};

use docker_image_builder::{ColorMode, FactCategory, LogFormat};

/// Validate a log level directive for --log-level
fn validate_level(s: &str) -> Result<String, String> {
    match s.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(s.to_ascii_lowercase()),
        _ => Err("must be one of trace, debug, info, warn, error".to_string()),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "docker-image-builder",
    version,
    about = "Build Docker images by running a build routine in a staging container and committing it."
)]
pub(crate) struct Cli {
    /// Log level (overridden by DIB_LOG / RUST_LOG)
    #[arg(long = "log-level", global = true, default_value = "info", value_parser = validate_level)]
    pub(crate) log_level: String,

    /// Log output format
    #[arg(long = "log-format", global = true, value_enum, default_value_t = LogFormat::Text)]
    pub(crate) log_format: LogFormat,

    /// Colorize output: auto|always|never
    #[arg(long = "color", global = true, value_enum)]
    pub(crate) color: Option<ColorMode>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum Command {
    /// Start a staging container from an image and leave it running
    Run {
        /// Source image (repository:tag)
        #[arg(short = 'i', long = "image")]
        image: String,
        /// Staging container name
        #[arg(short = 'c', long = "container")]
        container: String,
        /// Replace a container that already has this name
        #[arg(long = "re-run")]
        rerun: bool,
        /// Volume mount passed to docker run -v (repeatable)
        #[arg(short = 'v', long = "volume")]
        volumes: Vec<String>,
    },

    /// Run a build routine in a staging container and commit the result
    Build {
        /// Source image (repository:tag)
        #[arg(short = 's', long = "source")]
        source: String,
        /// Staging container name
        #[arg(short = 'c', long = "container")]
        container: String,
        /// Target image reference for the commit
        #[arg(short = 't', long = "target")]
        target: String,
        /// Build routine: script path, built-in name or dotted module path
        #[arg(short = 'b', long = "build-routine")]
        routine: String,
        /// Replace a container that already has this name
        #[arg(long = "re-run")]
        rerun: bool,
        /// Stop and remove the staging container after a successful commit
        #[arg(long = "remove-staging")]
        remove_staging: bool,
        /// Variables: a YAML/JSON file or inline text (repeatable, later wins)
        #[arg(short = 'e', long = "extra-vars")]
        extra_vars: Vec<String>,
        /// Volume mount passed to docker run -v (repeatable)
        #[arg(short = 'v', long = "volume")]
        volumes: Vec<String>,
        /// Extra directory searched for routines (repeatable, searched first)
        #[arg(long = "routine-path")]
        routine_paths: Vec<PathBuf>,
    },

    /// Stop and remove containers by name or id
    Halt {
        /// Container name or id (repeatable)
        #[arg(short = 'c', long = "container")]
        containers: Vec<String>,
        /// Halt every container known to the engine
        #[arg(long = "all")]
        all: bool,
    },

    /// Gather facts from a running container and print them as JSON
    Facts {
        /// Container name
        #[arg(short = 'c', long = "container")]
        container: String,
        /// Fact category (repeatable; default all)
        #[arg(long = "category", value_enum)]
        categories: Vec<FactCategory>,
    },
}
