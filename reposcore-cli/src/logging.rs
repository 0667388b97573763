use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `reposcore_core=debug`.
pub const LOG_ENV: &str = "REPOSCORE_LOG";

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for `weights --format toml` and the summary.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
