//! Set-up of the program logger.
//!
//! Messages go to the terminal (info and below on stdout, warnings and errors on stderr) and,
//! for commands which produce output, to log files in the output directory. The level can be set
//! with the `SE4ALL_LOG_LEVEL` environment variable or in `settings.toml`.
use anyhow::{Context, Result, anyhow, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// Set once the logger has been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Held while the logger is being installed
static LOGGER_INIT_LOCK: Mutex<()> = Mutex::new(());

/// The environment variable used to set the log level
pub const LOG_LEVEL_ENV_VAR: &str = "SE4ALL_LOG_LEVEL";

/// The log level used if neither the environment nor the settings file specify one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log file for messages about normal operation
const LOG_INFO_FILE_NAME: &str = "se4all_info.log";

/// Log file for warnings and errors
const LOG_ERROR_FILE_NAME: &str = "se4all_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Convert the name of a log level (`off`, `error`, `warn`, `info`, `debug` or `trace`) to a
/// [`LevelFilter`]. Case is ignored.
fn parse_log_level(name: &str) -> Result<LevelFilter> {
    let level = match name.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };

    Ok(level)
}

/// Create (or truncate) a log file in the given directory
fn create_log_file(dir: &Path, file_name: &str) -> Result<File> {
    let file_path = dir.join(file_name);
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&file_path)
        .with_context(|| format!("Could not create log file {}", file_path.display()))
}

/// Initialise the program logger.
///
/// The level given by `SE4ALL_LOG_LEVEL` takes precedence over the one from the settings file.
/// Does nothing if the logger has already been initialised, as happens when several commands
/// are run in one process.
///
/// # Arguments
///
/// * `log_level_from_settings`: The log level specified in `settings.toml`
/// * `log_file_dir`: Where to write log files (if `None`, no log files are written)
pub fn init(log_level_from_settings: &str, log_file_dir: Option<&Path>) -> Result<()> {
    let _guard = LOGGER_INIT_LOCK
        .lock()
        .map_err(|_| anyhow!("Logger initialisation failed on another thread"))?;
    if is_logger_initialised() {
        return Ok(());
    }

    let log_level = match env::var(LOG_LEVEL_ENV_VAR) {
        Ok(level) => parse_log_level(&level)
            .with_context(|| format!("Invalid value for {LOG_LEVEL_ENV_VAR}"))?,
        Err(_) => parse_log_level(log_level_from_settings)?,
    };

    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);
    let use_colour_stdout = std::io::stdout().is_terminal();
    let use_colour_stderr = std::io::stderr().is_terminal();

    let mut dispatch = Dispatch::new()
        .chain(
            Dispatch::new()
                .filter(|metadata| metadata.level() > LevelFilter::Warn)
                .format(move |out, message, record| {
                    write_log_colour(out, message, record, use_colour_stdout, &colours);
                })
                .level(log_level)
                .chain(std::io::stdout()),
        )
        .chain(
            Dispatch::new()
                .format(move |out, message, record| {
                    write_log_colour(out, message, record, use_colour_stderr, &colours);
                })
                .level(log_level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        );

    if let Some(dir) = log_file_dir {
        // Log files always get at least info messages, whatever the terminal level
        dispatch = dispatch
            .chain(
                Dispatch::new()
                    .filter(|metadata| metadata.level() > LevelFilter::Warn)
                    .format(write_log_plain)
                    .level(log_level.max(LevelFilter::Info))
                    .chain(create_log_file(dir, LOG_INFO_FILE_NAME)?),
            )
            .chain(
                Dispatch::new()
                    .format(write_log_plain)
                    .level(LevelFilter::Warn)
                    .chain(create_log_file(dir, LOG_ERROR_FILE_NAME)?),
            );
    }

    dispatch.apply().context("Logger already initialised")?;
    LOGGER_INIT.get_or_init(|| ());

    Ok(())
}

/// Write a log message with a timestamp, level and target
fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

/// Write to the log with no colours
fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    write_log(out, record.level(), record.target(), message);
}

/// Write to the log, colouring the level if `use_colour` is set
fn write_log_colour(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    use_colour: bool,
    colours: &ColoredLevelConfig,
) {
    if use_colour {
        write_log(out, colours.color(record.level()), record.target(), message);
    } else {
        write_log_plain(out, message, record);
    }
}
