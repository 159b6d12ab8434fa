//! Diagnostics for sdlguard.
//!
//! Reports and listings are printed to stdout. Everything emitted through
//! `tracing` goes to stderr, so `validate --json` output can be piped.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How much diagnostic output to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Progress messages.
    #[default]
    Normal,
    /// Per-file and per-pattern details.
    Verbose,
    /// Every match and query.
    Trace,
}

impl Verbosity {
    /// Map `-q` and a `-v` count to a verbosity. `-q` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// The most detailed level this verbosity lets through.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Filter directive used when `RUST_LOG` is unset.
    #[must_use]
    pub fn directive(&self) -> String {
        format!("sdlguard={}", self.to_level_filter())
    }

    fn shows_source(self) -> bool {
        matches!(self, Self::Verbose | Self::Trace)
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity`. Calling this more than
/// once is harmless.
///
/// ```no_run
/// use sdlguard::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    let detailed = verbosity.shows_source();
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(detailed)
        .with_file(detailed)
        .with_line_number(detailed)
        .without_time();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layer)
        .try_init();
}
