//! Log subscriber setup.
//!
//! Logs go to stderr so stdout stays reserved for the report. `RUST_LOG`
//! takes precedence over `-v`.

use tracing_subscriber::EnvFilter;

fn default_directives(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,den_blocklists={level},den_blocklists_cli={level}")
}

/// Install the global fmt subscriber.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
