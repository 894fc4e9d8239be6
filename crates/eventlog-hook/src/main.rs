use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use eventlog_hook::config::{Args, Commands, SourceArgs, WriteArgs};
use eventlog_hook::{EventHook, EventLogBackend, MemoryEventLog, Record};

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or("EVHOOK_LOG", args.log_filter()),
    )
    .init();

    match args.command {
        Commands::Install(args) => install(&args),
        Commands::Remove(args) => remove(&args),
        Commands::Write(args) => write(&args),
    }
}

#[cfg(windows)]
fn install(args: &SourceArgs) -> Result<()> {
    use eventlog_hook::{windows::WindowsEventLog, Bucket};

    WindowsEventLog
        .install_source(&args.source, &Bucket::ALL)
        .with_context(|| format!("Failed to register event source {}", args.source))?;
    println!("Event source '{}' installed", args.source);
    Ok(())
}

#[cfg(windows)]
fn remove(args: &SourceArgs) -> Result<()> {
    use eventlog_hook::windows::WindowsEventLog;

    WindowsEventLog
        .remove_source(&args.source)
        .with_context(|| format!("Failed to remove event source {}", args.source))?;
    println!("Event source '{}' removed", args.source);
    Ok(())
}

#[cfg(windows)]
fn write_native(args: &WriteArgs, record: &Record) -> Result<()> {
    fire(eventlog_hook::windows::WindowsEventLog, args, record)
}

#[cfg(not(windows))]
fn install(_args: &SourceArgs) -> Result<()> {
    anyhow::bail!("The Windows Event Log is not available on this platform")
}

#[cfg(not(windows))]
fn remove(_args: &SourceArgs) -> Result<()> {
    anyhow::bail!("The Windows Event Log is not available on this platform")
}

#[cfg(not(windows))]
fn write_native(_args: &WriteArgs, _record: &Record) -> Result<()> {
    anyhow::bail!("The Windows Event Log is not available on this platform, use --dry-run")
}

fn write(args: &WriteArgs) -> Result<()> {
    let mut record = Record::new(args.level, args.message.as_str());
    for (key, value) in &args.fields {
        record.fields.insert(key.as_str(), value.as_str());
    }
    if let Some(event_id) = &args.event_id {
        record.fields.insert(eventlog_hook::EVENT_ID_FIELD, event_id.as_str());
    }

    if !args.dry_run {
        return write_native(args, &record);
    }

    let memory = MemoryEventLog::new();
    fire(memory.clone(), args, &record)?;
    for event in memory.events() {
        println!(
            "{} [{}] id={} {}",
            event.source, event.bucket, event.event_id, event.message
        );
    }
    Ok(())
}

fn fire<B: EventLogBackend>(backend: B, args: &WriteArgs, record: &Record) -> Result<()> {
    let hook = EventHook::with_backend(backend, &args.source, vec![record.level])
        .context("Failed to create event hook")?;
    hook.fire(record).context("Failed to write event")?;

    if args.keep_source {
        info!("Leaving event source {} registered", args.source);
        return Ok(());
    }
    hook.close().context("Failed to close event hook")
}
