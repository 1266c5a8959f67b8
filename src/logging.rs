//! File-based logging bootstrap. The TUI owns the terminal while the app is
//! running, so diagnostics go to rotating files under the application data
//! directory instead of stderr.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

const LOG_FILE_BASENAME: &str = "student-records";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Start the rotating file logger inside `log_dir`. The returned handle must
/// stay alive for the duration of the process; `main` keeps it on the stack.
/// The level defaults per build mode and can be overridden through
/// `RUST_LOG`.
pub fn init_logging(log_dir: &Path) -> Result<LoggerHandle> {
    fs::create_dir_all(log_dir).context("failed to create log directory")?;

    let logger = Logger::try_with_env_or_str(default_log_level())
        .context("invalid log specification")?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .context("failed to start logger")?;

    Ok(logger)
}

/// Default level: verbose while developing, quiet in release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}
