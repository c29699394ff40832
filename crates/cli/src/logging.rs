//! Diagnostic log output.
//!
//! Console progress lines are printed directly and are not affected by the
//! filter set here.

use std::env;
use std::io;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an EnvFilter directive, e.g. `debug` or
/// `benchcmp_recon=debug`.
pub const LOG_ENV: &str = "BENCHCMP_LOG";

const DEFAULT_LEVEL: &str = "warn";

/// Install a stderr subscriber. `log` records from the engine are bridged
/// into it. Returns false if a subscriber was already installed.
pub fn init_logging() -> bool {
    let level = env::var(LOG_ENV).unwrap_or_else(|_| DEFAULT_LEVEL.to_string());

    let filter = if level.eq_ignore_ascii_case("off") {
        EnvFilter::default().add_directive(LevelFilter::OFF.into())
    } else {
        EnvFilter::try_new(&level).unwrap_or_else(|err| {
            eprintln!("warning: invalid {LOG_ENV} filter '{level}' ({err}), using '{DEFAULT_LEVEL}'");
            EnvFilter::new(DEFAULT_LEVEL)
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
