pub mod args;

use serde::{Deserialize, Serialize};

use crate::backend::EventLogBackend;
use crate::error::Result;
use crate::event_hook::EventHook;
use crate::level::Severity;

pub use args::{Args, Commands, SourceArgs, WriteArgs};

/// Event hook settings as they appear in a host application's config file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub struct EventHookConfig {
    pub source: String,
    #[serde(default = "default_levels")]
    pub levels: Vec<Severity>,
}

fn default_levels() -> Vec<Severity> {
    Severity::RECOGNIZED.to_vec()
}

impl EventHookConfig {
    pub fn new(source: impl Into<String>) -> Self {
        EventHookConfig {
            source: source.into(),
            levels: default_levels(),
        }
    }

    pub fn build_with<B: EventLogBackend>(&self, backend: B) -> Result<EventHook<B>> {
        EventHook::with_backend(backend, &self.source, self.levels.clone())
    }

    #[cfg(windows)]
    pub fn build(&self) -> Result<EventHook<crate::windows::WindowsEventLog>> {
        EventHook::new(&self.source, self.levels.clone())
    }
}
