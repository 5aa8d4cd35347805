use tracing_subscriber::EnvFilter;

use crate::stderr_buffer::BufferedStderr;

/// Environment variable that overrides the log filter
pub const LOG_ENV_VAR: &str = "GRADE_CALC_LOG";

/// Install the global tracing subscriber.
///
/// Output goes through [`crate::stderr_buffer`], so records emitted while the
/// TUI is running are held back until the terminal is restored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "grade_calc=debug"
        } else {
            "grade_calc=warn"
        })
    });

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(|| BufferedStderr)
        .try_init();
}
