//! Logging setup for voicememo.
//!
//! Library code logs through `tracing`; the `vmemo` binary installs the
//! subscriber here. Output goes to stderr so `--json` output on stdout stays
//! machine-readable.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose events pass the default filter.
const TARGETS: &[&str] = &["voicememo", "vmemo"];

/// How much the CLI reports on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Warnings and errors.
    #[default]
    Normal,
    /// Store writes, session changes and capture state transitions.
    Verbose,
    /// Everything, including per-key storage access.
    Trace,
}

impl Verbosity {
    /// Most detailed level shown at this verbosity.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directives(&self) -> String {
        let level = self.to_level_filter();
        TARGETS
            .iter()
            .map(|target| format!("{target}={level}"))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` replaces the directives derived from `verbosity` when set.
/// Source locations are only printed at [`Verbosity::Trace`].
///
/// ```no_run
/// use voicememo::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()));
    let detailed = verbosity == Verbosity::Trace;

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(detailed)
        .with_file(detailed)
        .with_line_number(detailed);

    // A subscriber may already be installed (tests, embedding callers)
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}

/// Route log output through the test harness's capture.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("voicememo=debug")
        .with_test_writer()
        .try_init();
}
