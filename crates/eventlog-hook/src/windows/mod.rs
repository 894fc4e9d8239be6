mod eventlog;

pub use eventlog::{WindowsEventLog, WindowsEventLogHandle};
