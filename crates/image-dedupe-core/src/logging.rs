use log::{debug, error, info, warn, LevelFilter};
use std::path::{Path, PathBuf};

// For file-based logging with rotation
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::error::{Error, Result};

/// Environment variable overriding the file log level
pub const LOG_ENV_VAR: &str = "DEDUP_LOG";

/// Initialize a rolling file logger with timestamp, log level, and module path.
///
/// Logs are written to `<log_dir>/dedup.log`, rotated at 10MB with 5 archives.
/// Returns the path of the active log file.
pub fn init_logger(log_dir: &Path, level: LevelFilter) -> Result<PathBuf> {
    std::fs::create_dir_all(log_dir)?;

    let log_file_path = log_dir.join("dedup.log");
    let archived_logs_pattern = log_dir.join("dedup.{}.log");

    let file_trigger = SizeTrigger::new(10 * 1024 * 1024); // 10MB

    let file_roller = FixedWindowRoller::builder()
        .build(&archived_logs_pattern.to_string_lossy(), 5)
        .map_err(|e| Error::Configuration(format!("Failed to create log roller: {}", e)))?;

    let compound_policy = CompoundPolicy::new(Box::new(file_trigger), Box::new(file_roller));

    let rolling_file = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] [{M}:{L}] - {m}{n}",
        )))
        .build(&log_file_path, Box::new(compound_policy))?;

    let env_level = std::env::var(LOG_ENV_VAR)
        .ok()
        .and_then(|value| value.parse::<LevelFilter>().ok())
        .unwrap_or(level);

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(rolling_file)))
        .build(Root::builder().appender("file").build(env_level))
        .map_err(|e| Error::Configuration(format!("Failed to build log config: {}", e)))?;

    log4rs::init_config(config)
        .map_err(|e| Error::Configuration(format!("Failed to initialize log4rs: {}", e)))?;

    info!("Image deduplication started");
    info!("Logging to file: {}", log_file_path.display());
    Ok(log_file_path)
}

/// Log file operation that failed
pub fn log_file_error(path: &Path, operation: &str, error: &dyn std::error::Error) {
    error!(
        "File operation failed - Operation: {}, Path: {}, Error: {}",
        operation,
        path.display(),
        error
    );
}

/// Log a file left out of a comparison
pub fn log_skipped_file(path: &Path, error: &Error) {
    match error {
        Error::Decode { .. } => warn!("Skipping undecodable file '{}': {}", path.display(), error),
        _ => warn!("Skipping unreadable file '{}': {}", path.display(), error),
    }
    debug!("Skip detail for '{}': {:?}", path.display(), error);
}

/// Log file system modification
pub fn log_fs_modification(operation: &str, path: &Path, details: Option<&str>) {
    let details_str = details.unwrap_or("");
    info!(
        "FS CHANGE - Operation: {}, Path: {}{}",
        operation,
        path.display(),
        if details_str.is_empty() {
            "".to_string()
        } else {
            format!(", Details: {}", details_str)
        }
    );
}
