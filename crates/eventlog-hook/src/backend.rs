use std::io;

use crate::level::Bucket;

/// Registry side of an event log: source registration and opening handles.
pub trait EventLogBackend {
    type Handle: EventLogHandle;

    /// Register `source` as able to write events of the given types. Fails with
    /// [`io::ErrorKind::AlreadyExists`] when the source is already registered.
    fn install_source(&self, source: &str, supported: &[Bucket]) -> io::Result<()>;

    fn open(&self, source: &str) -> io::Result<Self::Handle>;

    fn remove_source(&self, source: &str) -> io::Result<()>;
}

/// An open handle to a registered event source.
pub trait EventLogHandle: Send + Sync {
    fn info(&self, event_id: u32, message: &str) -> io::Result<()>;

    fn warning(&self, event_id: u32, message: &str) -> io::Result<()>;

    fn error(&self, event_id: u32, message: &str) -> io::Result<()>;

    fn close(self) -> io::Result<()>;
}
