use std::fmt;
use std::io;

use thiserror::Error;

use crate::level::{Bucket, Severity};

#[derive(Error, Debug)]
pub enum EventHookError {
    #[error("eventlog install failed for source={name}: {source}")]
    RegistrationFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("eventlog open failed for source={name}: {source}")]
    OpenFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("formatting record failed: {0}")]
    FormatFailed(#[from] fmt::Error),

    #[error("handle.{bucket} write failed: {source}")]
    WriteFailed {
        bucket: Bucket,
        #[source]
        source: io::Error,
    },

    #[error("unrecognized log level {0}")]
    UnrecognizedSeverity(Severity),

    #[error("eventlog handle close failed for source={name}: {source}")]
    CloseFailed {
        name: String,
        #[source]
        source: io::Error,
    },

    #[error("eventlog remove failed for source={name}: {source}")]
    DeregistrationFailed {
        name: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not a valid log level: {0:?}")]
pub struct ParseSeverityError(pub String);

pub type Result<T> = std::result::Result<T, EventHookError>;
