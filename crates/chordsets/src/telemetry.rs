//! Logging setup shared by both binaries.

use tracing_subscriber::EnvFilter;

/// Filter directive for the given verbosity flags.
///
/// `-q` wins over everything; each `-v` raises the configured level one step.
pub fn filter_directive(configured: &str, verbose: u8, quiet: bool) -> String {
    if quiet {
        return "error".to_string();
    }
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install a fmt subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence unless a verbosity flag was given.
pub fn init(configured: &str, verbose: u8, quiet: bool) {
    let directive = filter_directive(configured, verbose, quiet);
    let filter = if verbose == 0 && !quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&directive))
    } else {
        EnvFilter::new(&directive)
    };

    // A second init (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
