use std::error::Error;

use crate::fields::{EventId, FieldValue, Fields, EVENT_ID_FIELD};
use crate::level::Severity;

/// A single log record as handed to hooks.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub level: Severity,
    pub message: String,
    pub fields: Fields,
}

impl Record {
    pub fn new(level: Severity, message: impl Into<String>) -> Self {
        Record {
            level,
            message: message.into(),
            fields: Fields::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key, value);
        self
    }

    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// The `event_id` field if it holds a decimal string that fits in 32 bits,
    /// otherwise the default id.
    pub fn event_id(&self) -> EventId {
        self.fields.get_or_default(EVENT_ID_FIELD)
    }
}

/// Something that wants to see log records of certain severities.
pub trait Hook: Send + Sync {
    /// Severities this hook should be fired for.
    fn levels(&self) -> &[Severity];

    fn fire(&self, record: &Record) -> Result<(), Box<dyn Error + Send + Sync>>;
}
