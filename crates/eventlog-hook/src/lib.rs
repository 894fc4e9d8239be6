//! Windows Event Log hook for the `log` facade.
//!
//! An [`EventHook`] registers an event source, then writes each [`Record`] it
//! is fired with into the event log: the message and fields rendered as one
//! plain-text line, the severity mapped onto the event log's info, warning and
//! error types, and the event id taken from an optional `event_id` field.
//! [`HookLogger`] plugs hooks into the `log` crate.

pub mod backend;
pub mod config;
pub mod error;
pub mod event_hook;
pub mod fields;
pub mod format;
pub mod hook;
pub mod level;
pub mod logger;
pub mod memory;
#[cfg(windows)]
pub mod windows;

pub use backend::{EventLogBackend, EventLogHandle};
pub use config::EventHookConfig;
pub use error::{EventHookError, ParseSeverityError, Result};
pub use event_hook::EventHook;
pub use fields::{EventId, FieldValue, Fields, FromFieldValue, DEFAULT_EVENT_ID, EVENT_ID_FIELD};
pub use hook::{Hook, Record};
pub use level::{Bucket, Severity};
pub use logger::HookLogger;
pub use memory::{FailPoint, LoggedEvent, MemoryEventLog};
