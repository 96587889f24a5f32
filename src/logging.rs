//! Logging convenience helpers.
//!
//! This crate depends only on the `log` facade; it never installs a logger.
//! Initializing a concrete logger (or none at all, for a ROM build that has
//! nowhere to send log output) remains the embedding boot stage's decision.

/// Coarse-grained log level, convertible to [`log::LevelFilter`].
///
/// Exists mainly so a caller's configuration value (however it is stored on
/// the platform, e.g. an integer register or a build-time constant) can be
/// converted into something the `log` facade understands without pulling in
/// `log`'s own parsing machinery.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl From<u32> for LogLevel {
    fn from(level: u32) -> Self {
        match level {
            0 => Self::Off,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            5 => Self::Trace,
            _ => Self::Off,
        }
    }
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
