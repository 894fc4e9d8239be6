use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EventHookError, ParseSeverityError};

/// Severity of a log record, least severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    Info,
    #[serde(alias = "warning")]
    Warn,
    Error,
    Fatal,
    Panic,
}

/// The three event types the Windows Event Log understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bucket {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 7] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
        Severity::Panic,
    ];

    /// Every severity that has an event log bucket.
    pub const RECOGNIZED: [Severity; 6] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
        Severity::Panic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
            Severity::Panic => "panic",
        }
    }

    /// Maps a severity onto the event log bucket it is written to.
    pub fn bucket(self) -> Result<Bucket, EventHookError> {
        match self {
            Severity::Debug | Severity::Info => Ok(Bucket::Info),
            Severity::Warn => Ok(Bucket::Warning),
            Severity::Error | Severity::Fatal | Severity::Panic => Ok(Bucket::Error),
            Severity::Trace => Err(EventHookError::UnrecognizedSeverity(self)),
        }
    }

    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Severity::Trace => log::LevelFilter::Trace,
            Severity::Debug => log::LevelFilter::Debug,
            Severity::Info => log::LevelFilter::Info,
            Severity::Warn => log::LevelFilter::Warn,
            Severity::Error | Severity::Fatal | Severity::Panic => log::LevelFilter::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Severity::Trace),
            "debug" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            "panic" => Ok(Severity::Panic),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Severity::Error,
            log::Level::Warn => Severity::Warn,
            log::Level::Info => Severity::Info,
            log::Level::Debug => Severity::Debug,
            log::Level::Trace => Severity::Trace,
        }
    }
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Error, Bucket::Warning, Bucket::Info];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Info => "info",
            Bucket::Warning => "warning",
            Bucket::Error => "error",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_mapping() {
        assert_eq!(Severity::Debug.bucket().unwrap(), Bucket::Info);
        assert_eq!(Severity::Info.bucket().unwrap(), Bucket::Info);
        assert_eq!(Severity::Warn.bucket().unwrap(), Bucket::Warning);
        assert_eq!(Severity::Error.bucket().unwrap(), Bucket::Error);
        assert_eq!(Severity::Fatal.bucket().unwrap(), Bucket::Error);
        assert_eq!(Severity::Panic.bucket().unwrap(), Bucket::Error);
    }

    #[test]
    fn test_trace_has_no_bucket() {
        let err = Severity::Trace.bucket().unwrap_err();
        assert!(matches!(err, EventHookError::UnrecognizedSeverity(Severity::Trace)));
        assert_eq!(err.to_string(), "unrecognized log level trace");
    }

    #[test]
    fn test_recognized_severities_all_map() {
        for severity in Severity::RECOGNIZED {
            assert!(severity.bucket().is_ok(), "{severity} should map to a bucket");
        }
    }

    #[test]
    fn test_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert!(Severity::Fatal < Severity::Panic);
    }

    #[test]
    fn test_parse() {
        for severity in Severity::ALL {
            assert_eq!(severity.to_string().parse::<Severity>().unwrap(), severity);
        }
        assert_eq!("WARNING".parse::<Severity>().unwrap(), Severity::Warn);
        assert_eq!(
            "verbose".parse::<Severity>().unwrap_err(),
            ParseSeverityError("verbose".to_string())
        );
    }

    #[test]
    fn test_from_log_level() {
        assert_eq!(Severity::from(log::Level::Error), Severity::Error);
        assert_eq!(Severity::from(log::Level::Warn), Severity::Warn);
        assert_eq!(Severity::from(log::Level::Trace), Severity::Trace);
        assert_eq!(Severity::Fatal.to_level_filter(), log::LevelFilter::Error);
    }
}
