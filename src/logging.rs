use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV_VAR: &str = "DONEWARD_LOG";

const DEFAULT_LEVEL: &str = "info";

/// Send tracing output to `path`, appending. The terminal belongs to the TUI,
/// so nothing is written to stdout or stderr.
///
/// Subsequent calls are no-ops.
pub fn init(path: &Path) -> std::io::Result<()> {
    use tracing_subscriber::EnvFilter;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .compact();

    let _ = subscriber.try_init();
    Ok(())
}
