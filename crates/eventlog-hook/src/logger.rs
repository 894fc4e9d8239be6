use log::{LevelFilter, Log, Metadata, SetLoggerError};

use crate::fields::Fields;
use crate::hook::{Hook, Record};
use crate::level::Severity;

/// A `log` implementation that hands every record to the hooks subscribed to
/// its level.
#[derive(Default)]
pub struct HookLogger {
    hooks: Vec<Box<dyn Hook>>,
}

impl HookLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(mut self, hook: impl Hook + 'static) -> Self {
        self.add_hook(hook);
        self
    }

    pub fn add_hook(&mut self, hook: impl Hook + 'static) {
        self.hooks.push(Box::new(hook));
    }

    /// The most verbose level any hook subscribes to.
    pub fn max_level(&self) -> LevelFilter {
        self.hooks
            .iter()
            .flat_map(|hook| hook.levels().iter())
            .map(|level| level.to_level_filter())
            .max()
            .unwrap_or(LevelFilter::Off)
    }

    /// Installs this logger as the global `log` logger.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }

    fn subscribed(&self, level: Severity) -> impl Iterator<Item = &Box<dyn Hook>> + '_ {
        self.hooks
            .iter()
            .filter(move |hook| hook.levels().contains(&level))
    }
}

impl Log for HookLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.subscribed(metadata.level().into()).next().is_some()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let record = Record::new(record.level().into(), record.args().to_string())
            .with_fields(Fields::from_kv(record.key_values()));

        for hook in self.subscribed(record.level) {
            if let Err(e) = hook.fire(&record) {
                eprintln!("Failed to fire hook: {}", e);
            }
        }
    }

    fn flush(&self) {
        // Hooks write through immediately
    }
}
