#![allow(clippy::module_name_repetitions)]
//! Structured logging handle.
//!
//! The subscriber is never installed process-wide. `init` builds a `Dispatch`
//! and wraps it in a `Logger`; every component receives a `Logger` at
//! construction and emits its events inside `Logger::in_scope`, which tags
//! them with the component name.

use std::fmt;

use clap::ValueEnum;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive (takes precedence over `RUST_LOG`).
pub const LOG_ENV: &str = "DIB_LOG";

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
    component: &'static str,
}

impl Logger {
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            component: "builder",
        }
    }

    /// A handle that drops every event; used by tests and library callers
    /// that do not want output.
    pub fn disabled() -> Self {
        Self::new(Dispatch::none())
    }

    /// Same sink, different component tag.
    pub fn component(&self, component: &'static str) -> Self {
        Self {
            dispatch: self.dispatch.clone(),
            component,
        }
    }

    pub fn component_name(&self) -> &'static str {
        self.component
    }

    /// Run `f` with this handle's subscriber as the current default.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, || {
            let span = tracing::info_span!("dib", component = self.component);
            let _enter = span.enter();
            f()
        })
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("component", &self.component)
            .finish_non_exhaustive()
    }
}

/// Resolve the filter: `DIB_LOG`, then `RUST_LOG`, then the CLI level.
fn build_filter(level: &str) -> EnvFilter {
    for var in [LOG_ENV, "RUST_LOG"] {
        if let Ok(v) = std::env::var(var) {
            if !v.trim().is_empty() {
                if let Ok(f) = EnvFilter::try_new(v.trim()) {
                    return f;
                }
            }
        }
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Build a stderr logger for the given level directive and output format.
pub fn init(level: &str, format: LogFormat, ansi: bool) -> Logger {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(ansi);
    let dispatch = match format {
        LogFormat::Text => Dispatch::new(builder.finish()),
        LogFormat::Json => Dispatch::new(builder.json().finish()),
    };
    Logger::new(dispatch)
}
