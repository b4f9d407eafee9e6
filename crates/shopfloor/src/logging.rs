//! Two-stream pipeline logging.
//!
//! Progress events go to an info stream and failures to an error stream.
//! Nothing is installed globally: a [`PipelineLogger`] owns its dispatcher
//! and pipeline stages run inside [`PipelineLogger::in_scope`].

use crate::error::{PipelineError, Result};
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;

/// Name of the progress log inside the log directory.
pub const INFO_LOG: &str = "info.log";

/// Name of the failure log inside the log directory.
pub const ERROR_LOG: &str = "error.log";

/// Logger routing INFO and above to one writer and ERROR to another.
#[derive(Debug, Clone)]
pub struct PipelineLogger {
    dispatch: Dispatch,
}

fn append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| PipelineError::Config(format!("cannot open log {}: {e}", path.display())))
}

impl PipelineLogger {
    /// Append to `info.log` and `error.log` in `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the directory or files cannot be
    /// created.
    pub fn to_directory(dir: impl AsRef<Path>) -> Result<Self> {
        Self::open(dir.as_ref(), None)
    }

    /// Like [`to_directory`](Self::to_directory), also echoing events that
    /// pass `console` to standard error.
    pub fn with_console(dir: impl AsRef<Path>, console: EnvFilter) -> Result<Self> {
        Self::open(dir.as_ref(), Some(console))
    }

    fn open(dir: &Path, console: Option<EnvFilter>) -> Result<Self> {
        fs::create_dir_all(dir)
            .map_err(|e| PipelineError::Config(format!("cannot create {}: {e}", dir.display())))?;
        let info = Mutex::new(append(&dir.join(INFO_LOG))?);
        let error = Mutex::new(append(&dir.join(ERROR_LOG))?);
        Ok(Self::build(info, error, console))
    }

    /// Log to arbitrary writers.
    pub fn from_writers<I, E>(info: I, error: E) -> Self
    where
        I: for<'w> MakeWriter<'w> + Send + Sync + 'static,
        E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        Self::build(info, error, None)
    }

    /// Discard every event.
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    fn build<I, E>(info: I, error: E, console: Option<EnvFilter>) -> Self
    where
        I: for<'w> MakeWriter<'w> + Send + Sync + 'static,
        E: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    {
        let console = console.map(|filter| {
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter)
        });
        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(info)
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(LevelFilter::INFO),
            )
            .with(
                fmt::layer()
                    .with_writer(error)
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(LevelFilter::ERROR),
            )
            .with(console);
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// Run `f` with this logger as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Underlying dispatcher.
    pub const fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}
