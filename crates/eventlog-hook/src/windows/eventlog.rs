use std::ffi::OsStr;
use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;

use windows::core::PCWSTR;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::Security::PSID;
use windows::Win32::System::EventLog::{
    DeregisterEventSource, RegisterEventSourceW, ReportEventW,
    EVENTLOG_ERROR_TYPE, EVENTLOG_INFORMATION_TYPE, EVENTLOG_WARNING_TYPE, REPORT_EVENT_TYPE,
};
use windows::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegDeleteKeyW, RegSetValueExW, HKEY, HKEY_LOCAL_MACHINE,
    KEY_SET_VALUE, REG_CREATE_KEY_DISPOSITION, REG_DWORD, REG_EXPAND_SZ, REG_OPENED_EXISTING_KEY,
    REG_OPTION_NON_VOLATILE,
};

use crate::backend::{EventLogBackend, EventLogHandle};
use crate::level::Bucket;

const APPLICATION_LOG_KEY: &str = r"SYSTEM\CurrentControlSet\Services\EventLog\Application";

// Generic message file shipped with Windows: renders the first insertion
// string as the event text.
const EVENT_MESSAGE_FILE: &str = r"%SystemRoot%\System32\EventCreate.exe";

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}

fn source_key(source: &str) -> String {
    format!(r"{}\{}", APPLICATION_LOG_KEY, source)
}

fn event_type(bucket: Bucket) -> REPORT_EVENT_TYPE {
    match bucket {
        Bucket::Info => EVENTLOG_INFORMATION_TYPE,
        Bucket::Warning => EVENTLOG_WARNING_TYPE,
        Bucket::Error => EVENTLOG_ERROR_TYPE,
    }
}

/// Closes the registry key on drop.
struct RegKey(HKEY);

impl Drop for RegKey {
    fn drop(&mut self) {
        // SAFETY: the key was opened by RegCreateKeyExW and is closed only here.
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

impl RegKey {
    fn set_dword(&self, name: &str, value: u32) -> io::Result<()> {
        let name = to_wide(name);
        // SAFETY: `name` is NUL terminated and outlives the call.
        unsafe {
            RegSetValueExW(
                self.0,
                PCWSTR(name.as_ptr()),
                0,
                REG_DWORD,
                Some(&value.to_le_bytes()[..]),
            )
            .ok()
            .map_err(io::Error::from)
        }
    }

    fn set_expand_string(&self, name: &str, value: &str) -> io::Result<()> {
        let name = to_wide(name);
        let bytes: Vec<u8> = to_wide(value).iter().flat_map(|c| c.to_le_bytes()).collect();
        // SAFETY: `name` is NUL terminated, `bytes` includes the terminating NUL.
        unsafe {
            RegSetValueExW(self.0, PCWSTR(name.as_ptr()), 0, REG_EXPAND_SZ, Some(bytes.as_slice()))
                .ok()
                .map_err(io::Error::from)
        }
    }
}

/// The Windows Event Log, "Application" channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowsEventLog;

impl EventLogBackend for WindowsEventLog {
    type Handle = WindowsEventLogHandle;

    fn install_source(&self, source: &str, supported: &[Bucket]) -> io::Result<()> {
        let path = source_key(source);
        let wide_path = to_wide(&path);
        let mut key = HKEY::default();
        let mut disposition = REG_CREATE_KEY_DISPOSITION::default();

        // SAFETY: all pointers refer to locals that outlive the call.
        unsafe {
            RegCreateKeyExW(
                HKEY_LOCAL_MACHINE,
                PCWSTR(wide_path.as_ptr()),
                0,
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_SET_VALUE,
                None,
                &mut key,
                Some(&mut disposition),
            )
            .ok()
            .map_err(io::Error::from)?;
        }
        let key = RegKey(key);

        if disposition == REG_OPENED_EXISTING_KEY {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} registry key already exists", path),
            ));
        }

        let types = supported
            .iter()
            .fold(0u32, |mask, bucket| mask | event_type(*bucket).0 as u32);

        key.set_dword("CustomSource", 1)?;
        key.set_expand_string("EventMessageFile", EVENT_MESSAGE_FILE)?;
        key.set_dword("TypesSupported", types)?;
        Ok(())
    }

    fn open(&self, source: &str) -> io::Result<WindowsEventLogHandle> {
        let source = to_wide(source);
        // SAFETY: `source` is NUL terminated and outlives the call.
        let handle = unsafe { RegisterEventSourceW(PCWSTR::null(), PCWSTR(source.as_ptr())) }
            .map_err(io::Error::from)?;
        Ok(WindowsEventLogHandle {
            handle: Some(handle),
        })
    }

    fn remove_source(&self, source: &str) -> io::Result<()> {
        let path = to_wide(&source_key(source));
        // SAFETY: `path` is NUL terminated and outlives the call.
        unsafe {
            RegDeleteKeyW(HKEY_LOCAL_MACHINE, PCWSTR(path.as_ptr()))
                .ok()
                .map_err(io::Error::from)
        }
    }
}

/// Open event source handle. Deregistered on drop if not closed explicitly.
#[derive(Debug)]
pub struct WindowsEventLogHandle {
    handle: Option<HANDLE>,
}

// SAFETY: an event source handle is a process-wide token; ReportEventW and
// DeregisterEventSource may be called on it from any thread.
unsafe impl Send for WindowsEventLogHandle {}
unsafe impl Sync for WindowsEventLogHandle {}

impl WindowsEventLogHandle {
    fn report(&self, bucket: Bucket, event_id: u32, message: &str) -> io::Result<()> {
        let Some(handle) = self.handle else {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "event source is closed"));
        };
        let message = to_wide(message);
        let strings = [PCWSTR(message.as_ptr())];
        // SAFETY: the handle is open and `message` outlives the call.
        unsafe {
            ReportEventW(
                handle,
                event_type(bucket),
                0,
                event_id,
                PSID::default(),
                0,
                Some(&strings[..]),
                None,
            )
        }
        .map_err(io::Error::from)
    }
}

impl EventLogHandle for WindowsEventLogHandle {
    fn info(&self, event_id: u32, message: &str) -> io::Result<()> {
        self.report(Bucket::Info, event_id, message)
    }

    fn warning(&self, event_id: u32, message: &str) -> io::Result<()> {
        self.report(Bucket::Warning, event_id, message)
    }

    fn error(&self, event_id: u32, message: &str) -> io::Result<()> {
        self.report(Bucket::Error, event_id, message)
    }

    fn close(mut self) -> io::Result<()> {
        match self.handle.take() {
            // SAFETY: the handle came from RegisterEventSourceW and is released once.
            Some(handle) => unsafe { DeregisterEventSource(handle) }.map_err(io::Error::from),
            None => Ok(()),
        }
    }
}

impl Drop for WindowsEventLogHandle {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // SAFETY: see `close`.
            unsafe {
                let _ = DeregisterEventSource(handle);
            }
        }
    }
}
