use chrono::Local;
use log::info;
use simplelog::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("loglevel must be debug, info, warn, error, off or none, got '{0}'")]
    UnknownLevel(String),
    #[error("cannot create log file {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("logger already initialised: {0}")]
    AlreadySet(String),
}

/// `None` means logging is switched off.
pub fn parse_level(level: &str) -> Result<Option<LevelFilter>, LoggerError> {
    match level.trim().to_lowercase().as_str() {
        "off" | "none" => Ok(None),
        "debug" => Ok(Some(LevelFilter::Debug)),
        "info" => Ok(Some(LevelFilter::Info)),
        "warn" => Ok(Some(LevelFilter::Warn)),
        "error" => Ok(Some(LevelFilter::Error)),
        _ => Err(LoggerError::UnknownLevel(level.to_string())),
    }
}

/// Timestamped log file name, e.g. `log_2024-05-01_12-30-00.txt`.
pub fn default_log_file_name() -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    format!("log_{}.txt", date_and_time)
}

/// Log file setting that stands for a fresh [`default_log_file_name`].
pub const AUTO_LOG_FILE: &str = "auto";

/// Path the file logger writes to; the setting `auto` picks a timestamped name.
pub fn resolve_log_file(setting: Option<&Path>) -> Option<PathBuf> {
    let path = setting?;
    if path.as_os_str().eq_ignore_ascii_case(AUTO_LOG_FILE) {
        Some(PathBuf::from(default_log_file_name()))
    } else {
        Some(path.to_path_buf())
    }
}

/// Terminal logger plus an optional file logger, both at `level`.
pub fn init_logger(level: &str, log_file: Option<&Path>) -> Result<(), LoggerError> {
    let Some(log_option) = parse_level(level)? else {
        return Ok(());
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let log_file = resolve_log_file(log_file);
    if let Some(path) = &log_file {
        let file = File::create(path).map_err(|source| LoggerError::File {
            path: path.clone(),
            source,
        })?;
        loggers.push(WriteLogger::new(log_option, Config::default(), file));
    }
    CombinedLogger::init(loggers).map_err(|e| LoggerError::AlreadySet(e.to_string()))?;
    match log_file {
        Some(path) => info!("logging started with level {}, file {}", log_option, path.display()),
        None => info!("logging started with level {}", log_option),
    }
    Ok(())
}
