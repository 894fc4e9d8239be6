use std::error::Error;
use std::fmt;
use std::io;

use log::debug;

use crate::backend::{EventLogBackend, EventLogHandle};
use crate::error::{EventHookError, Result};
use crate::format::render;
use crate::hook::{Hook, Record};
use crate::level::{Bucket, Severity};

/// Forwards records to an event log source.
///
/// The source is registered when the hook is created and removed again by
/// [`EventHook::close`]. Writes go straight to the backend without buffering
/// or retries.
pub struct EventHook<B: EventLogBackend> {
    backend: B,
    handle: B::Handle,
    source: String,
    levels: Vec<Severity>,
}

impl<B: EventLogBackend> fmt::Debug for EventHook<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHook")
            .field("source", &self.source)
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

#[cfg(windows)]
impl EventHook<crate::windows::WindowsEventLog> {
    /// Registers `source` with the Windows Event Log and opens it.
    pub fn new(source: &str, levels: Vec<Severity>) -> Result<Self> {
        Self::with_backend(crate::windows::WindowsEventLog, source, levels)
    }
}

impl<B: EventLogBackend> EventHook<B> {
    pub fn with_backend(backend: B, source: &str, levels: Vec<Severity>) -> Result<Self> {
        match backend.install_source(source, &Bucket::ALL) {
            Ok(()) => debug!("Registered event source {}", source),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Event source {} is already registered", source)
            }
            Err(e) => {
                return Err(EventHookError::RegistrationFailed {
                    name: source.to_string(),
                    source: e,
                })
            }
        }

        let handle = backend.open(source).map_err(|e| EventHookError::OpenFailed {
            name: source.to_string(),
            source: e,
        })?;

        Ok(EventHook {
            backend,
            handle,
            source: source.to_string(),
            levels,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn levels(&self) -> &[Severity] {
        &self.levels
    }

    /// Writes one record to the event log.
    pub fn fire(&self, record: &Record) -> Result<()> {
        let message = render(record)?;
        let event_id = record.event_id().0;

        let bucket = record.level.bucket()?;
        let written = match bucket {
            Bucket::Info => self.handle.info(event_id, &message),
            Bucket::Warning => self.handle.warning(event_id, &message),
            Bucket::Error => self.handle.error(event_id, &message),
        };
        written.map_err(|e| EventHookError::WriteFailed { bucket, source: e })
    }

    /// Closes the handle, then removes the source registration. If the handle
    /// fails to close the source is left registered.
    pub fn close(self) -> Result<()> {
        let EventHook {
            backend,
            handle,
            source,
            ..
        } = self;

        handle.close().map_err(|e| EventHookError::CloseFailed {
            name: source.clone(),
            source: e,
        })?;

        backend
            .remove_source(&source)
            .map_err(|e| EventHookError::DeregistrationFailed {
                name: source.clone(),
                source: e,
            })?;

        debug!("Removed event source {}", source);
        Ok(())
    }
}

impl<B> Hook for EventHook<B>
where
    B: EventLogBackend + Send + Sync,
{
    fn levels(&self) -> &[Severity] {
        EventHook::levels(self)
    }

    fn fire(&self, record: &Record) -> std::result::Result<(), Box<dyn Error + Send + Sync>> {
        EventHook::fire(self, record).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailPoint, LoggedEvent, MemoryEventLog};

    const SRC: &str = "mylog";
    const MSG: &str = "Errors happened!";

    fn hook(log: &MemoryEventLog, levels: Vec<Severity>) -> EventHook<MemoryEventLog> {
        EventHook::with_backend(log.clone(), SRC, levels).unwrap()
    }

    fn error_record() -> Record {
        Record::new(Severity::Error, MSG)
            .with_field("func", "DoSomething")
            .with_field("server", "localhost")
            .with_field("tag", "development")
    }

    #[test]
    fn test_event_hook() {
        let log = MemoryEventLog::new();
        let hook = hook(&log, vec![Severity::Error]);
        assert!(log.is_registered(SRC));
        assert_eq!(log.supported_buckets(SRC), Some(Bucket::ALL.to_vec()));

        hook.fire(&error_record()).unwrap();

        let events = log.events();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.source, SRC);
        assert_eq!(event.bucket, Bucket::Error);
        assert_eq!(event.event_id, 1);
        assert!(event.message.starts_with("msg="));
        for text in [MSG, "DoSomething", "localhost", "development"] {
            assert!(event.message.contains(text), "{:?} missing {:?}", event.message, text);
        }
        assert!(!event.message.contains("level="));
        assert!(!event.message.contains("time="));

        hook.close().unwrap();
        assert!(!log.is_registered(SRC));
        assert_eq!(log.open_handles(), 0);
    }

    #[test]
    fn test_event_ids() {
        let log = MemoryEventLog::new();
        let hook = hook(&log, vec![Severity::Error]);

        hook.fire(&error_record().with_field("event_id", "321")).unwrap();
        hook.fire(&error_record().with_field("event_id", "50b432ff-2be4-46c3-bfc3-df63ba299670"))
            .unwrap();
        hook.fire(&error_record().with_field("event_id", 432)).unwrap();

        let ids: Vec<u32> = log.events().iter().map(|e| e.event_id).collect();
        assert_eq!(ids, vec![321, 1, 1]);
    }

    #[test]
    fn test_severity_buckets() {
        let log = MemoryEventLog::new();
        let hook = hook(&log, Severity::RECOGNIZED.to_vec());

        for severity in Severity::RECOGNIZED {
            hook.fire(&Record::new(severity, severity.to_string())).unwrap();
        }

        let buckets: Vec<Bucket> = log.events().iter().map(|e| e.bucket).collect();
        assert_eq!(
            buckets,
            vec![
                Bucket::Info,
                Bucket::Info,
                Bucket::Warning,
                Bucket::Error,
                Bucket::Error,
                Bucket::Error,
            ]
        );
    }

    #[test]
    fn test_unrecognized_severity_writes_nothing() {
        let log = MemoryEventLog::new();
        let hook = hook(&log, vec![Severity::Trace]);

        let err = hook.fire(&Record::new(Severity::Trace, "noise")).unwrap_err();
        assert!(matches!(err, EventHookError::UnrecognizedSeverity(Severity::Trace)));
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_second_hook_same_source() {
        let log = MemoryEventLog::new();
        let first = hook(&log, vec![Severity::Error]);
        let second = EventHook::with_backend(log.clone(), SRC, vec![Severity::Error]);
        assert!(second.is_ok());
        assert_eq!(log.open_handles(), 2);
        drop(first);
    }

    #[test]
    fn test_levels_unchanged() {
        let log = MemoryEventLog::new();
        let levels = vec![Severity::Warn, Severity::Error, Severity::Panic];
        let hook = hook(&log, levels.clone());
        assert_eq!(hook.levels(), levels.as_slice());
        assert_eq!(Hook::levels(&hook), levels.as_slice());
    }

    #[test]
    fn test_registration_failure() {
        let log = MemoryEventLog::new();
        log.fail_on(FailPoint::Install);

        let err = EventHook::with_backend(log.clone(), SRC, vec![]).unwrap_err();
        assert!(matches!(err, EventHookError::RegistrationFailed { ref name, .. } if name == SRC));
        assert!(err.to_string().contains("source=mylog"));
        assert_eq!(log.open_handles(), 0);
    }

    #[test]
    fn test_open_failure() {
        let log = MemoryEventLog::new();
        log.fail_on(FailPoint::Open);

        let err = EventHook::with_backend(log.clone(), SRC, vec![]).unwrap_err();
        assert!(matches!(err, EventHookError::OpenFailed { .. }));
    }

    #[test]
    fn test_write_failure_names_bucket() {
        let log = MemoryEventLog::new();
        let hook = hook(&log, vec![Severity::Warn]);
        log.fail_on(FailPoint::Write);

        let err = hook.fire(&Record::new(Severity::Warn, "disk low")).unwrap_err();
        assert!(matches!(err, EventHookError::WriteFailed { bucket: Bucket::Warning, .. }));
        assert!(err.to_string().starts_with("handle.warning"));
    }

    #[test]
    fn test_close_deregistration_failure() {
        let log = MemoryEventLog::new();
        let hook = hook(&log, vec![Severity::Error]);
        log.fail_on(FailPoint::Remove);

        let err = hook.close().unwrap_err();
        assert!(matches!(err, EventHookError::DeregistrationFailed { .. }));
        assert_eq!(log.open_handles(), 0);
        assert!(log.is_registered(SRC));
    }

    #[test]
    fn test_close_handle_failure_skips_deregistration() {
        let log = MemoryEventLog::new();
        let hook = hook(&log, vec![Severity::Error]);
        log.fail_on(FailPoint::Close);

        let err = hook.close().unwrap_err();
        assert!(matches!(err, EventHookError::CloseFailed { .. }));
        assert!(log.is_registered(SRC));
    }

    #[test]
    fn test_fire_through_trait_object() {
        let log = MemoryEventLog::new();
        let hook: Box<dyn Hook> = Box::new(hook(&log, vec![Severity::Info]));

        hook.fire(&Record::new(Severity::Info, "hello")).unwrap();
        assert_eq!(
            log.events(),
            vec![LoggedEvent {
                source: SRC.to_string(),
                bucket: Bucket::Info,
                event_id: 1,
                message: "msg=hello".to_string(),
            }]
        );
    }
}
