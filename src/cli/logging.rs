//! Diagnostic logging to stderr
//!
//! `OBJCTL_LOG` takes an `EnvFilter` directive (e.g. `objctl=trace`) and
//! overrides the `--verbose`/`--quiet` defaults.

use tracing_subscriber::EnvFilter;

use crate::cli::GlobalOpts;

pub const LOG_ENV: &str = "OBJCTL_LOG";

/// Default filter directive for the given flags
pub fn default_directive(global: &GlobalOpts) -> &'static str {
    if global.verbose {
        "objctl=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Install the global subscriber; later calls are no-ops
pub fn init(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(global)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(console::colors_enabled_stderr())
        .try_init();
}
