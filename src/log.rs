//! Program logger setup, built on `fern`.
use anyhow::{Context, Result, bail, ensure};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback, Output};
use log::{Level, LevelFilter, Metadata};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::File;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// A flag indicating whether the logger has been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the BOQ_PLANNER_LOG_LEVEL
/// environment variable or the settings.toml file.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable which overrides the log level from settings
const LOG_LEVEL_ENV_VAR: &str = "BOQ_PLANNER_LOG_LEVEL";

/// The file name for the log file containing messages about the ordinary operation of the planner
const LOG_INFO_FILE_NAME: &str = "boq_planner_info.log";

/// The file name for the log file containing warnings and error messages
const LOG_ERROR_FILE_NAME: &str = "boq_planner_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Convert a log level string into a [`LevelFilter`]
fn parse_log_level(log_level: &str) -> Result<LevelFilter> {
    let level = match log_level.to_lowercase().as_str() {
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

/// Initialise the program logger.
///
/// Ordinary messages go to stdout and warnings or errors to stderr, coloured when attached to a
/// terminal. Both streams are also written to plain-text log files in `log_dir`.
///
/// The level comes from the `BOQ_PLANNER_LOG_LEVEL` environment variable if it is set, otherwise
/// from `settings.toml` (`info` by default). Accepted values are `off`, `error`, `warn`, `info`,
/// `debug` and `trace`.
pub fn init(log_level_from_settings: &str, log_dir: &Path) -> Result<()> {
    ensure!(!is_logger_initialised(), "Logger already initialised");

    let log_level = match env::var(LOG_LEVEL_ENV_VAR) {
        Ok(level) => parse_log_level(&level)?,
        Err(_) => parse_log_level(log_level_from_settings)?,
    };

    Dispatch::new()
        .chain(console_output(
            std::io::stdout(),
            log_level,
            false,
            std::io::stdout().is_terminal(),
        ))
        .chain(console_output(
            std::io::stderr(),
            log_level.min(LevelFilter::Warn),
            true,
            std::io::stderr().is_terminal(),
        ))
        .chain(file_output(
            &log_dir.join(LOG_INFO_FILE_NAME),
            log_level.max(LevelFilter::Info),
            false,
        )?)
        .chain(file_output(
            &log_dir.join(LOG_ERROR_FILE_NAME),
            LevelFilter::Warn,
            true,
        )?)
        .apply()?;

    LOGGER_INIT.get_or_init(|| ());

    Ok(())
}

/// Whether a record is a warning or an error
fn is_problem(metadata: &Metadata) -> bool {
    metadata.level() <= Level::Warn
}

/// Console output for either ordinary messages or problems
fn console_output(
    output: impl Into<Output>,
    level: LevelFilter,
    problems: bool,
    use_colour: bool,
) -> Dispatch {
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    Dispatch::new()
        .filter(move |metadata| is_problem(metadata) == problems)
        .format(move |out, message, record| {
            if use_colour {
                write_log(out, colours.color(record.level()), record.target(), message);
            } else {
                write_log(out, record.level(), record.target(), message);
            }
        })
        .level(level)
        .chain(output)
}

/// Plain-text log file output, truncating any previous file
fn file_output(path: &Path, level: LevelFilter, problems: bool) -> Result<Dispatch> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    Ok(Dispatch::new()
        .filter(move |metadata| is_problem(metadata) == problems)
        .format(|out, message, record| {
            write_log(out, record.level(), record.target(), message);
        })
        .level(level)
        .chain(file))
}

/// Write a log line as `[time level target] message`
fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("off", LevelFilter::Off)]
    #[case("error", LevelFilter::Error)]
    #[case("WARN", LevelFilter::Warn)]
    #[case("Info", LevelFilter::Info)]
    #[case("debug", LevelFilter::Debug)]
    #[case("trace", LevelFilter::Trace)]
    fn test_parse_log_level(#[case] input: &str, #[case] expected: LevelFilter) {
        assert_eq!(parse_log_level(input).unwrap(), expected);
    }

    #[rstest]
    #[case(Level::Error, true)]
    #[case(Level::Warn, true)]
    #[case(Level::Info, false)]
    #[case(Level::Trace, false)]
    fn test_is_problem(#[case] level: Level, #[case] expected: bool) {
        assert_eq!(is_problem(&Metadata::builder().level(level).build()), expected);
    }

    #[test]
    fn test_file_output_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_INFO_FILE_NAME);
        file_output(&path, LevelFilter::Info, false).unwrap();
        assert!(path.is_file());

        let missing_dir = dir.path().join("missing").join(LOG_ERROR_FILE_NAME);
        assert!(file_output(&missing_dir, LevelFilter::Warn, true).is_err());
    }

    #[test]
    fn test_parse_log_level_unknown() {
        assert_eq!(
            parse_log_level("verbose").unwrap_err().to_string(),
            "Unknown log level: verbose"
        );
    }
}
