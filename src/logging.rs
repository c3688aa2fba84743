use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Env};
use log::LevelFilter;
use yansi::Paint;

use crate::error::Result;

/// Initializes the CLI logging system with the specified log level
///
/// Valid log levels are: error, warn, info, debug, trace
pub fn init(log_level: &str) -> Result<()> {
    let env = Env::default()
        .filter_or("RUST_LOG", log_level)
        .write_style_or("RUST_LOG_STYLE", "always");

    Builder::from_env(env)
        .format(|buf, record| {
            let level = match record.level() {
                log::Level::Error => Paint::red("ERROR").bold(),
                log::Level::Warn => Paint::yellow("WARN ").bold(),
                log::Level::Info => Paint::cyan("INFO ").bold(),
                log::Level::Debug => Paint::blue("DEBUG").bold(),
                log::Level::Trace => Paint::new("TRACE"),
            };
            writeln!(
                buf,
                "[{}] {} {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level,
                record.args()
            )
        })
        .init();

    Ok(())
}

/// Parses a log level string into a `LevelFilter`, defaulting to Info
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}
