//! Logger initialisation for line follower executables
//!
//! All records pass through a single `fern` dispatch which stamps them with
//! the session elapsed time. The session log file receives everything allowed
//! by the file levels, while the terminal can be held to a quieter level so
//! per-tick tracing only lands in the file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use colored::{ColoredString, Colorize};
use fern::FormatCallback;
use log::{info, Level, Record};
use thiserror::Error;

use crate::session::{self, Session};

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Levels used by the logger.
#[derive(Debug, Clone)]
pub struct LogLevels {
    /// Level of records written to the log file
    pub file: LevelFilter,

    /// Level of records echoed to stdout
    pub stdout: LevelFilter,

    /// Per-target overrides of the file level, for example to enable tracing
    /// of a single module
    pub targets: Vec<(&'static str, LevelFilter)>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LogLevels {
    /// The same level everywhere with no overrides.
    pub fn uniform(level: LevelFilter) -> Self {
        Self {
            file: level,
            stdout: level,
            targets: Vec::new()
        }
    }

    /// Add a per-target override.
    pub fn with_target(mut self, target: &'static str, level: LevelFilter) -> Self {
        self.targets.push((target, level));
        self
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// # Notes
///
/// - Neither the file nor the stdout level may be quieter than `INFO`.
///
/// # Safety
///
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(levels: &LogLevels, session: &Session) -> Result<(), LoggerInitError> {
    for level in &[levels.file, levels.stdout] {
        if *level < Level::Info {
            return Err(LoggerInitError::InvalidMinLogLevel(*level))
        }
    }

    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let stdout = fern::Dispatch::new()
        .level(levels.stdout)
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        .format(format_record)
        .level(levels.file);

    for (target, level) in &levels.targets {
        dispatch = dispatch.level_for(*target, *level);
    }

    dispatch
        .chain(stdout)
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    File level: {:?}, stdout level: {:?}", levels.file, levels.stdout);
    for (target, level) in &levels.targets {
        info!("    Level for {}: {:?}", target, level);
    }
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single record, including the target for debug and trace output.
fn format_record(out: FormatCallback, message: &std::fmt::Arguments, record: &Record) {
    let elapsed_s = session::get_elapsed_seconds();
    let level = level_tag(record.level());

    if record.level() > Level::Info {
        out.finish(format_args!(
            "[{:10.6} {}] {}: {}",
            elapsed_s, level, record.target(), message
        ))
    }
    else {
        out.finish(format_args!("[{:10.6} {}] {}", elapsed_s, level, message))
    }
}

/// Coloured three letter tag for a log level
fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info  => "INF".normal(),
        Level::Warn  => "WRN".yellow(),
        Level::Error => "ERR".red().bold()
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_log_levels_builder() {
        let levels = LogLevels::uniform(LevelFilter::Info)
            .with_target("lf_lib::line_follower", LevelFilter::Trace);

        assert_eq!(levels.file, LevelFilter::Info);
        assert_eq!(levels.stdout, LevelFilter::Info);
        assert_eq!(levels.targets, vec![("lf_lib::line_follower", LevelFilter::Trace)]);
    }
}
