//! Log flags and the subscriber configuration derived from them.

use crate::LogFormat;
use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Rotation of the log files.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogRotation {
    /// A new file every minute.
    Minutely,
    /// A new file every hour.
    Hourly,
    /// A new file every day.
    Daily,
    /// A single file (default).
    #[default]
    Never,
}

/// Log flags shared by every Omni binary.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LogArgs {
    /// Verbosity, repeat to raise it: `-v` for debug, `-vv` for trace.
    #[arg(short = 'v', long = "verbosity", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
    /// Only print warnings and errors.
    #[arg(short = 'q', long = "quiet", global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
    /// Disables the stdout logs.
    #[arg(long = "log.stdout.disabled", global = true)]
    pub stdout_disabled: bool,
    /// Format of the stdout logs.
    #[arg(
        long = "log.stdout.format",
        default_value = "full",
        env = "OMNI_LOG_STDOUT_FORMAT",
        global = true
    )]
    pub stdout_format: LogFormat,
    /// Directory of the log files. File logging is disabled when absent.
    #[arg(long = "log.file.directory", env = "OMNI_LOG_FILE_DIRECTORY", global = true)]
    pub file_directory: Option<PathBuf>,
    /// Format of the log files.
    #[arg(long = "log.file.format", default_value = "full", global = true)]
    pub file_format: LogFormat,
    /// Rotation of the log files.
    #[arg(long = "log.file.rotation", default_value = "never", global = true)]
    pub file_rotation: LogRotation,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self {
            verbosity: 0,
            quiet: false,
            stdout_disabled: false,
            stdout_format: LogFormat::Full,
            file_directory: None,
            file_format: LogFormat::Full,
            file_rotation: LogRotation::Never,
        }
    }
}

impl LogArgs {
    /// Returns the global level filter selected by the verbosity flags.
    pub const fn level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::WARN;
        }
        match self.verbosity {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Configuration of the stdout logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdoutLogConfig {
    /// Format of the logs.
    pub format: LogFormat,
}

/// Configuration of the log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogConfig {
    /// Directory the files are written to.
    pub directory_path: PathBuf,
    /// Format of the logs.
    pub format: LogFormat,
    /// Rotation of the files.
    pub rotation: LogRotation,
}

/// Configuration of the tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Level applied on top of the environment filter.
    pub global_level: LevelFilter,
    /// Stdout logs, if enabled.
    pub stdout_logs: Option<StdoutLogConfig>,
    /// File logs, if enabled.
    pub file_logs: Option<FileLogConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(LogArgs::default())
    }
}

impl LogConfig {
    /// Builds the configuration selected by `args`.
    pub fn new(args: LogArgs) -> Self {
        let global_level = args.level();
        let stdout_logs =
            (!args.stdout_disabled).then_some(StdoutLogConfig { format: args.stdout_format });
        let file_logs = args.file_directory.map(|directory_path| FileLogConfig {
            directory_path,
            format: args.file_format,
            rotation: args.file_rotation,
        });

        Self { global_level, stdout_logs, file_logs }
    }
}
