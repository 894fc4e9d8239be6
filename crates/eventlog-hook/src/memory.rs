use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::backend::{EventLogBackend, EventLogHandle};
use crate::level::Bucket;

/// An event as it landed in a [`MemoryEventLog`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggedEvent {
    pub source: String,
    pub bucket: Bucket,
    pub event_id: u32,
    pub message: String,
}

/// Backend operations that can be made to fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailPoint {
    Install,
    Open,
    Write,
    Close,
    Remove,
}

#[derive(Debug, Default)]
struct MemoryState {
    sources: BTreeMap<String, Vec<Bucket>>,
    open_handles: usize,
    events: Vec<LoggedEvent>,
    failures: BTreeSet<FailPoint>,
}

/// In-process event log. Clones share the same state.
#[derive(Clone, Debug, Default)]
pub struct MemoryEventLog {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check(&self, point: FailPoint) -> io::Result<()> {
        if self.state().failures.contains(&point) {
            return Err(io::Error::other(format!("injected {:?} failure", point)));
        }
        Ok(())
    }

    /// Make every following call of the given kind fail.
    pub fn fail_on(&self, point: FailPoint) {
        self.state().failures.insert(point);
    }

    pub fn clear_failure(&self, point: FailPoint) {
        self.state().failures.remove(&point);
    }

    pub fn events(&self) -> Vec<LoggedEvent> {
        self.state().events.clone()
    }

    pub fn is_registered(&self, source: &str) -> bool {
        self.state().sources.contains_key(source)
    }

    pub fn supported_buckets(&self, source: &str) -> Option<Vec<Bucket>> {
        self.state().sources.get(source).cloned()
    }

    pub fn open_handles(&self) -> usize {
        self.state().open_handles
    }
}

impl EventLogBackend for MemoryEventLog {
    type Handle = MemoryHandle;

    fn install_source(&self, source: &str, supported: &[Bucket]) -> io::Result<()> {
        self.check(FailPoint::Install)?;
        let mut state = self.state();
        if state.sources.contains_key(source) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} registry key already exists", source),
            ));
        }
        state.sources.insert(source.to_string(), supported.to_vec());
        Ok(())
    }

    fn open(&self, source: &str) -> io::Result<MemoryHandle> {
        self.check(FailPoint::Open)?;
        self.state().open_handles += 1;
        Ok(MemoryHandle {
            log: self.clone(),
            source: source.to_string(),
        })
    }

    fn remove_source(&self, source: &str) -> io::Result<()> {
        self.check(FailPoint::Remove)?;
        match self.state().sources.remove(source) {
            Some(_) => Ok(()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("event source {} is not registered", source),
            )),
        }
    }
}

#[derive(Debug)]
pub struct MemoryHandle {
    log: MemoryEventLog,
    source: String,
}

impl MemoryHandle {
    fn write(&self, bucket: Bucket, event_id: u32, message: &str) -> io::Result<()> {
        self.log.check(FailPoint::Write)?;
        self.log.state().events.push(LoggedEvent {
            source: self.source.clone(),
            bucket,
            event_id,
            message: message.to_string(),
        });
        Ok(())
    }
}

impl EventLogHandle for MemoryHandle {
    fn info(&self, event_id: u32, message: &str) -> io::Result<()> {
        self.write(Bucket::Info, event_id, message)
    }

    fn warning(&self, event_id: u32, message: &str) -> io::Result<()> {
        self.write(Bucket::Warning, event_id, message)
    }

    fn error(&self, event_id: u32, message: &str) -> io::Result<()> {
        self.write(Bucket::Error, event_id, message)
    }

    /// The handle is consumed and counted as closed even when a failure is injected.
    fn close(self) -> io::Result<()> {
        {
            let mut state = self.log.state();
            state.open_handles = state.open_handles.saturating_sub(1);
        }
        self.log.check(FailPoint::Close)
    }
}
